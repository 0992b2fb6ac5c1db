//! # dirtsim-ui::dispatcher
//!
//! The UI's event loop: folds `Event`s drawn from its own `EventQueue`
//! into `UiState`, the same way `dirtsim_engine::dispatcher::Dispatcher`
//! folds events into `ServerState`. Local LVGL-equivalent input (the
//! ratatui dashboard's keypresses) and commands arriving over the UI's
//! own WebSocket listener both become `Event::Command`s on this one
//! queue; `Event::ServerBroadcast` is the third source, fed by the
//! outbound connection to the Server.

use crate::commands::*;
use crate::state::{TrainingUiState, UiState};
use dirtsim_engine::events::{Broadcast, CommandInvocation, Event, EventQueue, EventSender};
use dirtsim_engine::telemetry::TelemetryBus;
use dirtsim_engine::transport::outbound::OutboundClient;
use dirtsim_engine::transport::AccessControl;
use dirtsim_proto::api::Command;
use dirtsim_proto::ctx_ext::{Cwc, ResponseSink};
use dirtsim_types::errors::{ApiError, ApiErrorKind};
use dirtsim_types::genome::GenomeRecord;
use dirtsim_types::id::GenomeId;
use dirtsim_types::training::TrainingResult;
use std::sync::Arc;
use std::time::Duration;

/// A snapshot of what the dashboard needs to render, pushed by the
/// dispatcher whenever something worth redrawing changes -- the same
/// lossy, try-send shape the teacher's engine uses for its own `Snapshot`
/// stream.
#[derive(Debug, Clone)]
pub struct UiStatusSnapshot {
    pub ui_state: String,
    pub connected_to_server: bool,
    pub last_error: Option<String>,
    pub generation: Option<u32>,
    pub max_generations: Option<u32>,
    pub best_fitness: Option<f64>,
    pub genomes: Vec<GenomeRecord>,
    pub recent_events: Vec<String>,
}

const RECENT_EVENTS_CAPACITY: usize = 50;

pub struct UiDispatcher {
    state: UiState,
    telemetry: TelemetryBus,
    queue: EventQueue,
    broadcast_tx: crossbeam_channel::Sender<Broadcast>,
    status_tx: crossbeam_channel::Sender<UiStatusSnapshot>,
    access_control: Arc<AccessControl>,
    default_timeout: Duration,
    /// `None` until the outbound connection to the Server succeeds;
    /// re-set to `None` if that connection drops, which puts the UI back
    /// in `Disconnected` on its next command attempt.
    outbound: Option<Arc<OutboundClient>>,
    pending_result: Option<TrainingResult>,
    genomes: Vec<GenomeRecord>,
    selected_genome: Option<GenomeId>,
    generation: Option<u32>,
    max_generations: Option<u32>,
    best_fitness: Option<f64>,
    recent_events: Vec<String>,
}

impl UiDispatcher {
    pub fn new(
        telemetry: TelemetryBus,
        queue: EventQueue,
        broadcast_tx: crossbeam_channel::Sender<Broadcast>,
        status_tx: crossbeam_channel::Sender<UiStatusSnapshot>,
        access_control: Arc<AccessControl>,
        default_timeout: Duration,
        outbound: Option<Arc<OutboundClient>>,
    ) -> Self {
        Self {
            state: if outbound.is_some() { UiState::StartMenu } else { UiState::Disconnected },
            telemetry,
            queue,
            broadcast_tx,
            status_tx,
            access_control,
            default_timeout,
            outbound,
            pending_result: None,
            genomes: Vec::new(),
            selected_genome: None,
            generation: None,
            max_generations: None,
            best_fitness: None,
            recent_events: Vec::new(),
        }
    }

    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    /// Blocks on the queue until every `EventSender` has dropped.
    pub fn run(&mut self) {
        self.publish_status();
        while let Some(queued) = self.queue.recv() {
            self.apply_event(queued.event);
            if matches!(self.state, UiState::Shutdown) {
                break;
            }
        }
    }

    fn broadcast(&self, message_type: &'static str, json: serde_json::Value) {
        let _ = self.broadcast_tx.send(Broadcast { message_type, json });
    }

    fn log_event(&mut self, event_type: &str, details: impl Into<String>) {
        let details = details.into();
        self.telemetry.log_event(event_type.to_string(), details.clone());
        if self.recent_events.len() >= RECENT_EVENTS_CAPACITY {
            self.recent_events.remove(0);
        }
        self.recent_events.push(format!("{event_type}: {details}"));
    }

    fn publish_status(&self) {
        let snapshot = UiStatusSnapshot {
            ui_state: self.state.name().to_string(),
            connected_to_server: self.outbound.is_some(),
            last_error: None,
            generation: self.generation,
            max_generations: self.max_generations,
            best_fitness: self.best_fitness,
            genomes: self.genomes.clone(),
            recent_events: self.recent_events.clone(),
        };
        let _ = self.status_tx.try_send(snapshot);
    }

    fn apply_event(&mut self, event: Event) {
        match event {
            Event::Command(invocation) => self.dispatch_command(invocation),
            Event::ConnectionClosed { connection_id } => {
                self.log_event("CONNECTION_CLOSED", format!("connection {connection_id} closed"));
            }
            Event::Tick { .. } => {}
            Event::ServerBroadcast { message_type, json } => self.handle_server_broadcast(message_type, json),
        }
        self.publish_status();
    }

    /// Reacts to an unsolicited message from the Server (spec §4.9: "for
    /// example, `TrainingResult` broadcasts flip the UI into the
    /// results-browser state").
    fn handle_server_broadcast(&mut self, message_type: String, json: serde_json::Value) {
        match message_type.as_str() {
            "TrainingResultAvailable" => {
                if let Ok(result) = serde_json::from_value::<TrainingResult>(json.clone()) {
                    self.best_fitness = Some(result.summary.best_fitness);
                    self.generation = Some(result.summary.completed_generations);
                    self.max_generations = Some(result.summary.max_generations);
                    self.pending_result = Some(result);
                }
                self.state = UiState::Training(TrainingUiState::UnsavedResult);
                self.log_event("TRAINING_RESULT_AVAILABLE", "a completed training run is ready to review");
                self.broadcast("TrainingResultAvailable", json);
            }
            "EvolutionProgress" => {
                if let Some(generation) = json.get("generation").and_then(|v| v.as_u64()) {
                    self.generation = Some(generation as u32);
                }
                if let Some(max_generations) = json.get("maxGenerations").and_then(|v| v.as_u64()) {
                    self.max_generations = Some(max_generations as u32);
                } else if let Some(max_generations) = json.get("max_generations").and_then(|v| v.as_u64()) {
                    self.max_generations = Some(max_generations as u32);
                }
                if let Some(best) = json.get("bestFitnessAllTime").and_then(|v| v.as_f64()) {
                    self.best_fitness = Some(best);
                } else if let Some(best) = json.get("best_fitness_all_time").and_then(|v| v.as_f64()) {
                    self.best_fitness = Some(best);
                }
                self.broadcast("EvolutionProgress", json);
            }
            "UserSettingsUpdated" => self.broadcast("UserSettingsUpdated", json),
            other => self.log_event("UNHANDLED_BROADCAST", other.to_string()),
        }
    }

    fn dispatch_command(&mut self, invocation: CommandInvocation) {
        let name = invocation.name;
        if !self.state.accepts(name) {
            let current_state = self.state.name();
            (invocation.respond)(Err(ApiError::state_mismatch(current_state, name)));
            return;
        }

        match name {
            "MouseDown" => self.run_command::<MouseDown, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "MouseMove" => self.run_command::<MouseMove, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "MouseUp" => self.run_command::<MouseUp, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "IconSelect" => self.run_command::<IconSelect, _>(invocation, Self::handle_icon_select),
            "IconRailExpand" => self.run_command::<IconRailExpand, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "ShowIcons" => self.run_command::<ShowIcons, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "SimRun" => self.run_command::<SimRun, _>(invocation, Self::handle_sim_run),
            "SimPause" => self.run_command::<SimPause, _>(invocation, Self::handle_sim_pause),
            "SimStop" => self.run_command::<SimStop, _>(invocation, Self::handle_sim_stop),
            "TrainingStart" => self.run_command::<TrainingStart, _>(invocation, Self::handle_training_start),
            "ResultSave" => self.run_command::<ResultSave, _>(invocation, Self::handle_result_save),
            "ResultDiscard" => self.run_command::<ResultDiscard, _>(invocation, Self::handle_result_discard),
            "TrainingConfigShowEvolution" => self.run_command::<TrainingConfigShowEvolution, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "GenomeBrowserOpen" => self.run_command::<GenomeBrowserOpen, _>(invocation, Self::handle_genome_browser_open),
            "GenomeDetailOpen" => self.run_command::<GenomeDetailOpen, _>(invocation, Self::handle_genome_detail_open),
            "GenomeDetailLoad" => self.run_command::<GenomeDetailLoad, _>(invocation, Self::handle_genome_detail_load),
            "SynthKeyEvent" => self.run_command::<SynthKeyEvent, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "ScreenGrab" => self.run_command::<ScreenGrab, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "StreamStart" => self.run_command::<StreamStart, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "WebRtcAnswer" => self.run_command::<WebRtcAnswer, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "WebRtcCandidate" => self.run_command::<WebRtcCandidate, _>(invocation, |_, c| c.respond(Ok(Empty))),
            "WebSocketAccessSet" => self.run_command::<WebSocketAccessSet, _>(invocation, Self::handle_websocket_access_set),
            "StatusGet" => self.run_command::<StatusGet, _>(invocation, Self::handle_status_get),
            "StateGet" => self.run_command::<StateGet, _>(invocation, Self::handle_state_get),
            "Exit" => self.run_command::<Exit, _>(invocation, Self::handle_exit),
            _ => {
                (invocation.respond)(Err(ApiError::new(ApiErrorKind::Schema, format!("command '{name}' is not registered"))));
            }
        }
    }

    fn run_command<C, F>(&mut self, invocation: CommandInvocation, handler: F)
    where
        C: Command,
        F: FnOnce(&mut Self, Cwc<C>),
    {
        let request: C::Request = match serde_json::from_value(invocation.request_json) {
            Ok(request) => request,
            Err(err) => {
                (invocation.respond)(Err(ApiError::new(ApiErrorKind::Schema, err.to_string())));
                return;
            }
        };
        let (tx, rx) = crossbeam_channel::bounded(1);
        let cwc = Cwc::new(request, ResponseSink::new(tx));
        handler(self, cwc);
        let result = rx.try_recv().unwrap_or_else(|_| Err(ApiError::internal("command handler returned without responding")));
        let json_result = result.and_then(|okay| serde_json::to_value(&okay).map_err(|err| ApiError::internal(format!("encoding response: {err}"))));
        (invocation.respond)(json_result);
    }

    fn handle_sim_run(&mut self, cwc: Cwc<SimRun>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        let request = dirtsim_engine::commands::SimRunRequest {
            timestep: 1.0 / 60.0,
            max_steps: -1,
            scenario_id: None,
            start_paused: false,
            container_size: None,
        };
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::SimRun>(request, Some(self.default_timeout)) {
            Ok(_) => {
                self.state = UiState::SimRunning;
                self.log_event("SIM_RUN", "forwarded to the Server");
                cwc.respond(Ok(Empty));
            }
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_sim_pause(&mut self, cwc: Cwc<SimPause>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::SimPause>(dirtsim_engine::commands::Empty, Some(self.default_timeout)) {
            Ok(_) => cwc.respond(Ok(Empty)),
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_sim_stop(&mut self, cwc: Cwc<SimStop>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::SimStop>(dirtsim_engine::commands::Empty, Some(self.default_timeout)) {
            Ok(_) => {
                self.state = UiState::StartMenu;
                self.log_event("SIM_STOP", "forwarded to the Server");
                cwc.respond(Ok(Empty));
            }
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_icon_select(&mut self, cwc: Cwc<IconSelect>) {
        let icon = cwc.request.icon.clone();
        self.log_event("ICON_SELECT", &icon);
        match icon.as_str() {
            "sim" => self.state = UiState::StartMenu,
            "training" => self.state = UiState::Training(TrainingUiState::Idle),
            _ => {}
        }
        cwc.respond(Ok(Empty));
    }

    fn handle_training_start(&mut self, cwc: Cwc<TrainingStart>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        let request = cwc.request.clone();
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::EvolutionStart>(request, Some(self.default_timeout)) {
            Ok(okay) => {
                self.state = UiState::Training(TrainingUiState::Active);
                self.generation = Some(0);
                self.log_event("TRAINING_START", format!("training session {} started", okay.training_session_id));
                cwc.respond(Ok(okay));
            }
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_result_save(&mut self, cwc: Cwc<ResultSave>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        let request = cwc.request.clone();
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::TrainingResultSave>(request, Some(self.default_timeout)) {
            Ok(okay) => {
                self.pending_result = None;
                self.state = UiState::Training(TrainingUiState::Idle);
                self.log_event("RESULT_SAVE", format!("{} saved, {} discarded", okay.saved_count, okay.discarded_count));
                cwc.respond(Ok(okay));
            }
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_result_discard(&mut self, cwc: Cwc<ResultDiscard>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::TrainingResultDiscard>(dirtsim_engine::commands::Empty, Some(self.default_timeout)) {
            Ok(_) => {
                self.pending_result = None;
                self.state = UiState::Training(TrainingUiState::Idle);
                self.log_event("RESULT_DISCARD", "unsaved training result discarded");
                cwc.respond(Ok(Empty));
            }
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_genome_browser_open(&mut self, cwc: Cwc<GenomeBrowserOpen>) {
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        match outbound.send_command_and_get_response::<dirtsim_engine::commands::GenomeList>(dirtsim_engine::commands::Empty, Some(self.default_timeout)) {
            Ok(okay) => {
                self.genomes = okay.records.clone();
                cwc.respond(Ok(okay));
            }
            Err(err) => cwc.respond(Err(err)),
        }
    }

    fn handle_genome_detail_open(&mut self, cwc: Cwc<GenomeDetailOpen>) {
        let id = cwc.request.id;
        self.selected_genome = Some(id);
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        let request = dirtsim_engine::commands::GenomeGetRequest { id };
        cwc.respond(outbound.send_command_and_get_response::<dirtsim_engine::commands::GenomeGet>(request, Some(self.default_timeout)));
    }

    fn handle_genome_detail_load(&mut self, cwc: Cwc<GenomeDetailLoad>) {
        let id = cwc.request.id;
        self.selected_genome = Some(id);
        let Some(outbound) = self.outbound.clone() else {
            cwc.respond(Err(ApiError::new(ApiErrorKind::Transport, "not connected to the Server")));
            return;
        };
        let request = dirtsim_engine::commands::GenomeGetRequest { id };
        cwc.respond(outbound.send_command_and_get_response::<dirtsim_engine::commands::GenomeGet>(request, Some(self.default_timeout)));
    }

    fn handle_websocket_access_set(&mut self, cwc: Cwc<WebSocketAccessSet>) {
        self.access_control.set(cwc.request.enabled, cwc.request.token.clone());
        self.log_event("WEBSOCKET_ACCESS_SET", format!("enabled={}", cwc.request.enabled));
        cwc.respond(Ok(Empty));
    }

    fn handle_status_get(&mut self, cwc: Cwc<StatusGet>) {
        cwc.respond(Ok(StatusOkay { ui_state: self.state.name().to_string(), connected_to_server: self.outbound.is_some() }));
    }

    fn handle_state_get(&mut self, cwc: Cwc<StateGet>) {
        cwc.respond(Ok(StateOkay { ui_state: self.state.name().to_string() }));
    }

    fn handle_exit(&mut self, cwc: Cwc<Exit>) {
        self.log_event("EXIT", "shutdown requested");
        self.state = UiState::Shutdown;
        cwc.respond(Ok(Empty));
    }
}
