//! # dirtsim-engine::telemetry::tracing_layer
//!
//! A custom `tracing::Layer` that tags log records with the
//! `training_session_id` of whichever span produced them, so the
//! dashboard's scrollback can filter by training run.

use super::{TelemetryBus, TracingContext};
use std::sync::{Arc, Mutex};
use tracing::{field::Field, span, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

pub struct SimContextLayer {
    context: Arc<Mutex<TracingContext>>,
}

impl SimContextLayer {
    pub fn new(bus: &TelemetryBus) -> Self {
        Self { context: bus.context() }
    }
}

impl<S> Layer<S> for SimContextLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let span = ctx.span(id).unwrap();
        let mut extensions = span.extensions_mut();

        let mut visitor = TrainingSessionIdVisitor::default();
        attrs.record(&mut visitor);
        if let Some(training_session_id) = visitor.training_session_id {
            extensions.insert(TrainingSessionIdExtension(training_session_id));
        }
    }

    fn on_event(&self, _event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let training_session_id = ctx.current_span().id().and_then(|id| {
            ctx.span_scope(id).and_then(|scope| {
                scope
                    .from_root()
                    .find_map(|span| span.extensions().get::<TrainingSessionIdExtension>().map(|ext| ext.0.clone()))
            })
        });
        self.context.lock().unwrap().training_session_id = training_session_id;
    }
}

#[derive(Default)]
struct TrainingSessionIdVisitor {
    training_session_id: Option<String>,
}

impl tracing::field::Visit for TrainingSessionIdVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "training_session_id" {
            self.training_session_id = Some(value.to_string());
        }
    }
    fn record_u64(&mut self, _field: &Field, _value: u64) {}
    fn record_i64(&mut self, _field: &Field, _value: i64) {}
    fn record_bool(&mut self, _field: &Field, _value: bool) {}
    fn record_error(&mut self, _field: &Field, _value: &(dyn std::error::Error + 'static)) {}
    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

struct TrainingSessionIdExtension(String);
