//! # dirtsim-engine::telemetry::snapshot
//!
//! The stable `Snapshot` struct broadcast to UI/CLI subscribers and
//! rendered by the teacher-descended dashboard: the world's render
//! snapshot, the trainer's progress (while in `Evolution`), and recent
//! structured log lines for a scrollback view.

use crate::world::RenderSnapshot;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tick: u64,
    pub world: Option<RenderSnapshot>,
    pub evolution: Option<EvolutionSnap>,
    pub recent_events: Vec<LogSnap>,
    pub metrics: MetricsSnapshot,
}

/// Mirror of `trainer::EvolutionProgress`, kept separate so telemetry
/// doesn't need to depend on the trainer module's internals.
#[derive(Clone, Debug)]
pub struct EvolutionSnap {
    pub generation: u32,
    pub max_generations: u32,
    pub current_eval: u32,
    pub population_size: u32,
    pub best_fitness_this_gen: f64,
    pub best_fitness_all_time: f64,
    pub average_fitness: f64,
}

#[derive(Clone, Debug)]
pub struct LogSnap {
    pub tick: u64,
    pub event_type: String,
    pub details: String,
    pub training_session_id: Option<String>,
    pub custom: IndexMap<String, Value>,
}

#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub commands_dispatched: u64,
    pub commands_rejected: u64,
    pub broadcasts_sent: u64,
    pub evaluations_completed: u64,
}
