//! # dirtsim-ui::app
//!
//! Defines the `App` struct, which holds the state for the dashboard.
//! Keypresses translate directly into `CommandInvocation`s pushed onto
//! the same `EventSender` the UI's own WebSocket listener feeds --
//! connection id 0 is reserved for this locally-originated traffic, and
//! its response is only ever logged, never awaited.

use crate::dispatcher::UiStatusSnapshot;
use dirtsim_engine::events::{CommandInvocation, Event, EventSender};
use dirtsim_types::id::ConnectionId;

const LOCAL_CONNECTION_ID: ConnectionId = 0;

/// Represents the state of the dashboard.
pub struct App {
    /// The most recently received snapshot of the UI's own state.
    pub status: Option<UiStatusSnapshot>,
    /// Whether the help screen is visible.
    pub show_help: bool,
    /// Current focused panel index.
    pub focused_panel: usize,
    event_sender: EventSender,
    insert_seq: u64,
}

impl App {
    pub fn new(event_sender: EventSender) -> Self {
        Self { status: None, show_help: false, focused_panel: 0, event_sender, insert_seq: 0 }
    }

    /// Called on every UI tick.
    pub fn on_tick(&mut self) {}

    /// Updates the app's state with a new snapshot from the dispatcher.
    pub fn update_status(&mut self, status: UiStatusSnapshot) {
        self.status = Some(status);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn cycle_focus(&mut self) {
        self.focused_panel = (self.focused_panel + 1) % 4;
    }

    fn send(&mut self, name: &'static str, request_json: serde_json::Value) {
        let seq = self.insert_seq;
        self.insert_seq = self.insert_seq.wrapping_add(1);
        let invocation = CommandInvocation {
            connection_id: LOCAL_CONNECTION_ID,
            name,
            request_json,
            respond: Box::new(move |result| {
                if let Err(err) = result {
                    eprintln!("{name} failed: {err}");
                }
            }),
        };
        self.event_sender.push(seq, Event::Command(invocation));
    }

    pub fn sim_run(&mut self) {
        self.send("SimRun", serde_json::json!({}));
    }

    pub fn sim_pause(&mut self) {
        self.send("SimPause", serde_json::json!({}));
    }

    pub fn sim_stop(&mut self) {
        self.send("SimStop", serde_json::json!({}));
    }

    /// Starts training with a representative population; a real form
    /// panel would collect these fields instead of hardcoding them.
    pub fn training_start(&mut self) {
        self.send(
            "TrainingStart",
            serde_json::json!({
                "scenario_id": "DuckPond",
                "organism_type": "Duck",
                "population_size": 16,
                "tournament_size": 3,
                "max_generations": 20,
                "max_simulation_time": 30.0,
                "mutation_rate": 0.1,
                "mutation_sigma": 0.1,
                "mutation_reset_rate": 0.01,
                "brain_kind": "feedforward",
                "brain_variant": null,
                "warm_start": false,
            }),
        );
    }

    pub fn result_save(&mut self) {
        self.send("ResultSave", serde_json::json!({ "genome_ids": [], "restart": false }));
    }

    pub fn result_discard(&mut self) {
        self.send("ResultDiscard", serde_json::json!({}));
    }

    pub fn genome_browser_open(&mut self) {
        self.send("GenomeBrowserOpen", serde_json::json!({}));
    }

    pub fn exit(&mut self) {
        self.send("Exit", serde_json::json!({}));
    }
}
