//! # dirtsim-engine::telemetry
//!
//! The observability subsystem: collects structured log lines and metric
//! counters behind a shared context the tracing layer can reach into, and
//! periodically emits a `Snapshot` for the dashboard/broadcast path.

use crate::telemetry::snapshot::{EvolutionSnap, LogSnap, MetricsSnapshot, Snapshot};
use crate::world::RenderSnapshot;
use crossbeam_channel::Sender;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub mod snapshot;
pub mod tracing_layer;

/// A central bus for telemetry data: a channel to external consumers (the
/// CLI dashboard, broadcast fan-out) and shared state the tracing layer
/// reads current tick/training-session context from.
#[derive(Clone)]
pub struct TelemetryBus {
    snapshot_tx: Sender<Snapshot>,
    context: Arc<Mutex<TracingContext>>,
}

#[derive(Default)]
struct TracingContext {
    tick: u64,
    training_session_id: Option<String>,
    recent_events: VecDeque<LogSnap>,
    metrics: MetricsSnapshot,
}

const RECENT_EVENTS_CAPACITY: usize = 100;

impl TelemetryBus {
    pub fn new(snapshot_tx: Sender<Snapshot>) -> Self {
        Self {
            snapshot_tx,
            context: Arc::new(Mutex::new(TracingContext::default())),
        }
    }

    pub fn send_snapshot(&self, snap: Snapshot) {
        let _ = self.snapshot_tx.try_send(snap);
    }

    pub fn set_current_tick(&self, tick: u64) {
        self.context.lock().unwrap().tick = tick;
    }

    pub fn set_training_session(&self, training_session_id: Option<String>) {
        self.context.lock().unwrap().training_session_id = training_session_id;
    }

    pub(crate) fn context(&self) -> Arc<Mutex<TracingContext>> {
        self.context.clone()
    }

    pub fn log_event(&self, event_type: impl Into<String>, details: impl Into<String>) {
        let mut ctx = self.context.lock().unwrap();
        let log_snap = LogSnap {
            tick: ctx.tick,
            event_type: event_type.into(),
            details: details.into(),
            training_session_id: ctx.training_session_id.clone(),
            custom: Default::default(),
        };
        if ctx.recent_events.len() >= RECENT_EVENTS_CAPACITY {
            ctx.recent_events.pop_front();
        }
        ctx.recent_events.push_back(log_snap);
    }

    /// Increments both the bus's running snapshot counter and the
    /// process-wide `metrics` counter, keyed the same way.
    pub fn increment_metric(&self, metric_name: &'static str) {
        let mut ctx = self.context.lock().unwrap();
        match metric_name {
            dirtsim_types::metrics::MET_CMD_DISPATCHED => ctx.metrics.commands_dispatched += 1,
            dirtsim_types::metrics::MET_CMD_REJECTED_STATE_MISMATCH => ctx.metrics.commands_rejected += 1,
            dirtsim_types::metrics::MET_BROADCAST_SENT => ctx.metrics.broadcasts_sent += 1,
            dirtsim_types::metrics::MET_EVOLUTION_EVAL_COMPLETED => ctx.metrics.evaluations_completed += 1,
            _ => {}
        }
        drop(ctx);
        ::metrics::counter!(metric_name).increment(1);
    }

    pub fn set_evolution_gauge(&self, metric_name: &'static str, value: f64) {
        ::metrics::gauge!(metric_name).set(value);
    }

    /// Builds a point-in-time `Snapshot`, combining the world's own render
    /// snapshot (when one exists) with whatever the trainer reports and
    /// the running log/metrics context.
    pub fn build_snapshot(&self, world: Option<RenderSnapshot>, evolution: Option<EvolutionSnap>) -> Snapshot {
        let ctx = self.context.lock().unwrap();
        Snapshot {
            tick: ctx.tick,
            world,
            evolution,
            recent_events: ctx.recent_events.iter().cloned().collect(),
            metrics: ctx.metrics.clone(),
        }
    }
}
