//! # dirtsim-engine::dispatcher
//!
//! The Server's event loop: folds `Event`s drawn from an `EventQueue` into
//! `ServerState`, one at a time, in arrival order. Command handling keeps
//! the registry's type erasure at the edge -- each handler below decodes
//! its own concrete `Request`, does its work through a `Cwc`, and the
//! dispatcher re-erases the `Okay`/`ApiError` back to JSON before handing
//! it to the transport's `respond` closure.

use crate::brain::BrainRegistry;
use crate::commands::*;
use crate::genome_repo::GenomeRepository;
use crate::ids::IdGen;
use crate::scenario::scenario_for_id;
use crate::settings::SettingsStore;
use crate::state::{ActiveSim, ServerState, SimRunConfig};
use crate::telemetry::TelemetryBus;
use crate::trainer::mutation::MutationConfig as TrainerMutationConfig;
use crate::trainer::{EvolutionConfig, PopulationSpec, TickOutcome, Trainer, TrainingResumePolicy, TrainingSpec};
use crate::training_repo::TrainingResultRepository;
use crate::transport::{AccessControl, ConnectionRegistry};
use crate::world::DemoWorld;
use dirtsim_proto::api::Command;
use dirtsim_proto::ctx_ext::{Cwc, ResponseSink};
use dirtsim_types::errors::{ApiError, ApiErrorKind};
use dirtsim_types::genome::{Genome, GenomeMetadata, GenomeRecord};
use dirtsim_types::id::{GenomeId, TrainingSessionId};
use dirtsim_types::metrics::{
    MET_BROADCAST_SENT, MET_CMD_DISPATCHED, MET_CMD_REJECTED_STATE_MISMATCH, MET_EVOLUTION_BEST_FITNESS_GAUGE,
    MET_EVOLUTION_GENERATION_GAUGE,
};
use dirtsim_types::scenario::ScenarioId;
use dirtsim_types::training::TrainingResultRecord;
use std::collections::HashMap;
use std::sync::Arc;

use super::events::{Broadcast, CommandInvocation, Event, EventQueue, EventSender};

/// Owns everything a command or tick might touch: the state machine, the
/// two repositories, the brain registry, and the telemetry bus. One per
/// running Server process.
pub struct Dispatcher {
    state: ServerState,
    genome_repo: GenomeRepository,
    training_repo: Box<dyn TrainingResultRepository>,
    settings: Box<dyn SettingsStore>,
    brain_registry: BrainRegistry,
    telemetry: TelemetryBus,
    queue: EventQueue,
    ids: IdGen,
    broadcast_tx: crossbeam_channel::Sender<Broadcast>,
    /// Scenario `SimRun`/`EvolutionStart` fall back to when the request
    /// doesn't name one explicitly. Changed by `ScenarioSwitch`.
    selected_scenario: ScenarioId,
    /// Genomes from the most recently finished training run, keyed by the
    /// candidate id `TrainingResultSave` will be asked to persist. Cleared
    /// on save or discard.
    pending_genomes: HashMap<GenomeId, Option<Genome>>,
    /// The request that started the training run `pending_genomes`/the
    /// current `UnsavedTrainingResult` came from, kept around so
    /// `TrainingResultSave{restart: true}` can start a fresh `Evolution`
    /// with the same shape population rather than needing the caller to
    /// resend it.
    last_evolution_request: Option<EvolutionStartRequest>,
    /// Shared with the transport listener so `WebSocketAccessSet` can
    /// re-arm access control and force-disconnect non-loopback peers
    /// without tearing down the listener.
    access_control: Arc<AccessControl>,
    connections: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(
        training_repo: Box<dyn TrainingResultRepository>,
        settings: Box<dyn SettingsStore>,
        telemetry: TelemetryBus,
        queue: EventQueue,
        broadcast_tx: crossbeam_channel::Sender<Broadcast>,
        access_control: Arc<AccessControl>,
        connections: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            state: ServerState::PreStartup,
            genome_repo: GenomeRepository::new(),
            training_repo,
            settings,
            brain_registry: BrainRegistry::with_demo_brains(),
            telemetry,
            queue,
            ids: IdGen::new(),
            broadcast_tx,
            selected_scenario: ScenarioId::Sandbox,
            pending_genomes: HashMap::new(),
            last_evolution_request: None,
            access_control,
            connections,
        }
    }

    fn broadcast(&self, message_type: &'static str, json: serde_json::Value) {
        self.telemetry.increment_metric(MET_BROADCAST_SENT);
        let _ = self.broadcast_tx.send(Broadcast { message_type, json });
    }

    pub fn sender(&self) -> EventSender {
        self.queue.sender()
    }

    pub fn ids_mut(&mut self) -> &mut IdGen {
        &mut self.ids
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    /// Moves `PreStartup` to `Idle`. Must run once, before the first event
    /// is applied.
    pub fn start(&mut self) {
        self.state = ServerState::Startup;
        self.telemetry.log_event("STARTUP", "engine ready, state -> Idle");
        self.state = ServerState::Idle;
    }

    /// Blocks on the queue until every `EventSender` has dropped.
    pub fn run(&mut self) {
        while let Some(queued) = self.queue.recv() {
            self.apply_event(queued.event);
            if matches!(self.state, ServerState::Shutdown) {
                break;
            }
        }
    }

    /// Drains whatever is immediately available without blocking. Used by
    /// a host loop (transport runtime, tests) that drives its own ticking.
    pub fn drain_and_apply(&mut self) {
        for queued in self.queue.drain_available() {
            self.apply_event(queued.event);
        }
    }

    fn apply_event(&mut self, event: Event) {
        match event {
            Event::Command(invocation) => self.dispatch_command(invocation),
            Event::ConnectionClosed { connection_id } => {
                self.telemetry.log_event("CONNECTION_CLOSED", format!("connection {connection_id} closed"));
            }
            Event::Tick { dt_seconds } => self.advance(dt_seconds),
            // The Server has no outbound connection to another peer, so
            // this never arrives here; the UI is the only process that
            // produces it.
            Event::ServerBroadcast { .. } => {}
        }
    }

    /// Advances whichever world-mutating state is current by one fixed
    /// step. A no-op in every other state (spec invariant: only
    /// `SimRunning`/`SimPaused`/`Evolution` mutate the world).
    fn advance(&mut self, dt_seconds: f64) {
        let mut sim_finished = false;
        if let ServerState::SimRunning(active) = &mut self.state {
            active.world.advance_time(dt_seconds);
            active.steps_taken += 1;
            sim_finished = active.config.max_steps >= 0 && active.steps_taken >= active.config.max_steps as u64;
        }
        if sim_finished {
            self.telemetry.log_event("SIM_FINISHED", "max_steps reached, state -> Idle");
            self.state = ServerState::Idle;
        }

        let mut tick_outcome = None;
        if let ServerState::Evolution(trainer) = &mut self.state {
            tick_outcome = Some(trainer.tick(&self.brain_registry));
        }
        let Some(outcome) = tick_outcome else { return };
        match outcome {
            Ok(TickOutcome::Continue) => {}
            Ok(TickOutcome::GenerationAdvanced { generation }) => {
                if let ServerState::Evolution(trainer) = &self.state {
                    let progress = trainer.progress();
                    self.telemetry.set_evolution_gauge(MET_EVOLUTION_GENERATION_GAUGE, generation as f64);
                    self.telemetry.set_evolution_gauge(MET_EVOLUTION_BEST_FITNESS_GAUGE, progress.best_fitness_all_time);
                    if let Ok(payload) = serde_json::to_value(&progress) {
                        self.broadcast("EvolutionProgress", payload);
                    }
                }
                self.telemetry.log_event("EVOLUTION_GENERATION", format!("generation {generation} started"));
            }
            Ok(TickOutcome::Finished(result, genomes)) => {
                self.telemetry.log_event(
                    "EVOLUTION_FINISHED",
                    format!(
                        "training {} finished after {} generations, best fitness {:.3}",
                        result.summary.training_session_id, result.summary.completed_generations, result.summary.best_fitness
                    ),
                );
                if let Ok(payload) = serde_json::to_value(&result) {
                    self.broadcast("TrainingResultAvailable", payload);
                }
                self.pending_genomes = genomes.into_iter().collect();
                self.state = ServerState::UnsavedTrainingResult(result);
            }
            Err(err) => {
                self.telemetry.log_event("EVOLUTION_ERROR", err.to_string());
                self.state = ServerState::Error(err.to_string());
            }
        }
    }

    /// Routes a decoded command by name. Rejects outright (without ever
    /// touching a handler) when the current state doesn't accept it.
    fn dispatch_command(&mut self, invocation: CommandInvocation) {
        let name = invocation.name;
        if !self.state.accepts(name) {
            self.telemetry.increment_metric(MET_CMD_REJECTED_STATE_MISMATCH);
            let current_state = self.state.name();
            (invocation.respond)(Err(ApiError::state_mismatch(current_state, name)));
            return;
        }

        match name {
            "SimRun" => self.run_command::<SimRun, _>(invocation, Self::handle_sim_run),
            "SimStop" => self.run_command::<SimStop, _>(invocation, Self::handle_sim_stop),
            "SimPause" => self.run_command::<SimPause, _>(invocation, Self::handle_sim_pause),
            "SimResume" => self.run_command::<SimResume, _>(invocation, Self::handle_sim_resume),
            "Reset" => self.run_command::<Reset, _>(invocation, Self::handle_reset),
            "WorldResize" => self.run_command::<WorldResize, _>(invocation, Self::handle_world_resize),
            "StatusGet" => self.run_command::<StatusGet, _>(invocation, Self::handle_status_get),
            "StateGet" => self.run_command::<StateGet, _>(invocation, Self::handle_state_get),
            "EventSubscribe" => self.run_command::<EventSubscribe, _>(invocation, Self::handle_event_subscribe),
            "EvolutionStart" => self.run_command::<EvolutionStart, _>(invocation, Self::handle_evolution_start),
            "EvolutionStop" => self.run_command::<EvolutionStop, _>(invocation, Self::handle_evolution_stop),
            "TrainingResultSave" => self.run_command::<TrainingResultSave, _>(invocation, Self::handle_training_result_save),
            "TrainingResultDiscard" => {
                self.run_command::<TrainingResultDiscard, _>(invocation, Self::handle_training_result_discard)
            }
            "TrainingResultList" => self.run_command::<TrainingResultList, _>(invocation, Self::handle_training_result_list),
            "TrainingResultGet" => self.run_command::<TrainingResultGet, _>(invocation, Self::handle_training_result_get),
            "GenomeList" => self.run_command::<GenomeList, _>(invocation, Self::handle_genome_list),
            "GenomeGet" => self.run_command::<GenomeGet, _>(invocation, Self::handle_genome_get),
            "GenomeGetBest" => self.run_command::<GenomeGetBest, _>(invocation, Self::handle_genome_get_best),
            "FingerDown" => self.run_command::<FingerDown, _>(invocation, |d, c| d.handle_pointer_event("FingerDown", c)),
            "FingerMove" => self.run_command::<FingerMove, _>(invocation, |d, c| d.handle_pointer_event("FingerMove", c)),
            "FingerUp" => self.run_command::<FingerUp, _>(invocation, |d, c| d.handle_pointer_event("FingerUp", c)),
            "SeedAdd" => self.run_command::<SeedAdd, _>(invocation, |d, c| d.handle_seed_event("SeedAdd", c)),
            "SpawnDirtBall" => self.run_command::<SpawnDirtBall, _>(invocation, |d, c| d.handle_seed_event("SpawnDirtBall", c)),
            "PeersGet" => self.run_command::<PeersGet, _>(invocation, Self::handle_peers_get),
            "PerfStatsGet" => self.run_command::<PerfStatsGet, _>(invocation, Self::handle_perf_stats_get),
            "TimerStatsGet" => self.run_command::<TimerStatsGet, _>(invocation, Self::handle_timer_stats_get),
            "ScenarioListGet" => self.run_command::<ScenarioListGet, _>(invocation, Self::handle_scenario_list_get),
            "ScenarioSwitch" => self.run_command::<ScenarioSwitch, _>(invocation, Self::handle_scenario_switch),
            "TrainingResultDelete" => self.run_command::<TrainingResultDelete, _>(invocation, Self::handle_training_result_delete),
            "UserSettingsSet" => self.run_command::<UserSettingsSet, _>(invocation, Self::handle_user_settings_set),
            "WebSocketAccessSet" => self.run_command::<WebSocketAccessSet, _>(invocation, Self::handle_websocket_access_set),
            "Exit" => self.run_command::<Exit, _>(invocation, Self::handle_exit),
            _ => {
                (invocation.respond)(Err(ApiError::new(ApiErrorKind::Schema, format!("command '{name}' is not registered"))));
            }
        }
    }

    /// Decodes `invocation`'s JSON body into `C::Request`, builds a CWC
    /// over a one-shot bounded channel, runs `handler` to completion (every
    /// representative command here finishes synchronously), and re-erases
    /// the result back to JSON for the transport.
    fn run_command<C, F>(&mut self, invocation: CommandInvocation, handler: F)
    where
        C: Command,
        F: FnOnce(&mut Self, Cwc<C>),
    {
        self.telemetry.increment_metric(MET_CMD_DISPATCHED);
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
        let result = rx
            .try_recv()
            .unwrap_or_else(|_| Err(ApiError::internal("command handler returned without responding")));
        let json_result = result.and_then(|okay| {
            serde_json::to_value(&okay).map_err(|err| ApiError::internal(format!("encoding response: {err}")))
        });
        (invocation.respond)(json_result);
    }

    fn handle_sim_run(&mut self, cwc: Cwc<SimRun>) {
        let request = cwc.request.clone();
        let scenario_id = request.scenario_id.unwrap_or(self.selected_scenario);
        let Some(scenario) = scenario_for_id(scenario_id) else {
            cwc.respond(Err(ApiError::validation(format!("scenario '{scenario_id}' has no installable implementation"))));
            return;
        };
        if let Err(message) = scenario.validate() {
            cwc.respond(Err(ApiError::validation(format!("scenario '{scenario_id}' failed validation: {message}"))));
            return;
        }
        let (width, height) = request.container_size.unwrap_or_else(|| scenario.world_size());
        let mut world = DemoWorld::new(width, height);
        scenario.install(&mut world);

        let active = ActiveSim {
            world: Box::new(world),
            scenario,
            config: SimRunConfig {
                timestep: request.timestep,
                max_steps: request.max_steps,
                max_frame_ms: None,
            },
            steps_taken: 0,
        };
        self.telemetry.log_event("SIM_RUN", format!("scenario {scenario_id} started ({width}x{height})"));
        self.state = if request.start_paused { ServerState::SimPaused(active) } else { ServerState::SimRunning(active) };
        cwc.respond(Ok(Empty));
    }

    fn handle_sim_stop(&mut self, cwc: Cwc<SimStop>) {
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::SimRunning(_) | ServerState::SimPaused(_) => {
                self.telemetry.log_event("SIM_STOP", "simulation stopped, state -> Idle");
                cwc.respond(Ok(Empty));
            }
            other => {
                let name = other.name();
                self.state = other;
                cwc.reject_state_mismatch(name);
            }
        }
    }

    fn handle_sim_pause(&mut self, cwc: Cwc<SimPause>) {
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::SimRunning(active) => {
                self.state = ServerState::SimPaused(active);
                cwc.respond(Ok(Empty));
            }
            other => {
                let name = other.name();
                self.state = other;
                cwc.reject_state_mismatch(name);
            }
        }
    }

    fn handle_sim_resume(&mut self, cwc: Cwc<SimResume>) {
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::SimPaused(active) => {
                self.state = ServerState::SimRunning(active);
                cwc.respond(Ok(Empty));
            }
            other => {
                let name = other.name();
                self.state = other;
                cwc.reject_state_mismatch(name);
            }
        }
    }

    fn handle_reset(&mut self, cwc: Cwc<Reset>) {
        self.pending_genomes.clear();
        self.telemetry.log_event("RESET", format!("state '{}' -> Idle", self.state.name()));
        self.state = ServerState::Idle;
        cwc.respond(Ok(Empty));
    }

    fn handle_world_resize(&mut self, cwc: Cwc<WorldResize>) {
        let (width, height) = (cwc.request.width, cwc.request.height);
        let resized = match &mut self.state {
            ServerState::SimRunning(active) | ServerState::SimPaused(active) => {
                active.world.resize(width, height);
                true
            }
            _ => false,
        };
        if resized {
            cwc.respond(Ok(Empty));
        } else {
            let name = self.state.name();
            cwc.reject_state_mismatch(name);
        }
    }

    fn handle_status_get(&mut self, cwc: Cwc<StatusGet>) {
        let tick = match &mut self.state {
            ServerState::SimRunning(active) | ServerState::SimPaused(active) => active.world.snapshot().tick,
            _ => 0,
        };
        cwc.respond(Ok(StatusOkay { state: self.state.name().to_string(), tick }));
    }

    fn handle_state_get(&mut self, cwc: Cwc<StateGet>) {
        cwc.respond(Ok(StateOkay { state: self.state.name().to_string() }));
    }

    fn handle_event_subscribe(&mut self, cwc: Cwc<EventSubscribe>) {
        cwc.respond(Ok(Empty));
    }

    fn handle_evolution_start(&mut self, cwc: Cwc<EvolutionStart>) {
        let request = cwc.request.clone();
        let resume_policy = if request.warm_start { TrainingResumePolicy::WarmFromBest } else { TrainingResumePolicy::Fresh };
        let random_count = if request.warm_start { (request.population_size / 4).max(1) } else { request.population_size };
        let training_spec = TrainingSpec {
            scenario_id: request.scenario_id,
            organism_type: request.organism_type,
            population: vec![PopulationSpec {
                brain_kind: request.brain_kind.clone(),
                brain_variant: request.brain_variant.clone(),
                count: request.population_size,
                random_count,
            }],
        };
        let config = EvolutionConfig {
            population_size: request.population_size,
            tournament_size: request.tournament_size,
            max_generations: request.max_generations,
            max_simulation_time: request.max_simulation_time,
            energy_reference: 1.0,
            water_reference: 1.0,
        };
        let mutation = TrainerMutationConfig {
            rate: request.mutation_rate,
            sigma: request.mutation_sigma,
            reset_rate: request.mutation_reset_rate,
        };
        let seed = self.ids.next_insertion_seq();
        match Trainer::new(config, mutation, training_spec, resume_policy, &self.brain_registry, &self.genome_repo, seed) {
            Ok(trainer) => {
                let training_session_id = trainer.training_session_id();
                self.telemetry.log_event("EVOLUTION_START", format!("training {training_session_id} started"));
                self.last_evolution_request = Some(request);
                self.state = ServerState::Evolution(Box::new(trainer));
                cwc.respond(Ok(EvolutionStartOkay { training_session_id }));
            }
            Err(err) => cwc.respond(Err(ApiError::validation(err.to_string()))),
        }
    }

    /// Builds a fresh `Trainer` from `last_evolution_request`, the same
    /// path `EvolutionStart` itself uses, for `TrainingResultSave{restart:
    /// true}` (spec §4.5 `UnsavedTrainingResult` transition, §8 seed test
    /// scenario 3's "freshly initialized population").
    fn restart_evolution(&mut self) -> Result<TrainingSessionId, crate::errors::EngineError> {
        let request = self.last_evolution_request.clone().ok_or_else(|| {
            crate::errors::EngineError::ScenarioValidation("restart".to_string(), "no prior EvolutionStart to restart from".to_string())
        })?;
        let resume_policy = if request.warm_start { TrainingResumePolicy::WarmFromBest } else { TrainingResumePolicy::Fresh };
        let random_count = if request.warm_start { (request.population_size / 4).max(1) } else { request.population_size };
        let training_spec = TrainingSpec {
            scenario_id: request.scenario_id,
            organism_type: request.organism_type,
            population: vec![PopulationSpec {
                brain_kind: request.brain_kind.clone(),
                brain_variant: request.brain_variant.clone(),
                count: request.population_size,
                random_count,
            }],
        };
        let config = EvolutionConfig {
            population_size: request.population_size,
            tournament_size: request.tournament_size,
            max_generations: request.max_generations,
            max_simulation_time: request.max_simulation_time,
            energy_reference: 1.0,
            water_reference: 1.0,
        };
        let mutation = TrainerMutationConfig {
            rate: request.mutation_rate,
            sigma: request.mutation_sigma,
            reset_rate: request.mutation_reset_rate,
        };
        let seed = self.ids.next_insertion_seq();
        let trainer = Trainer::new(config, mutation, training_spec, resume_policy, &self.brain_registry, &self.genome_repo, seed)?;
        let training_session_id = trainer.training_session_id();
        self.state = ServerState::Evolution(Box::new(trainer));
        Ok(training_session_id)
    }

    fn handle_evolution_stop(&mut self, cwc: Cwc<EvolutionStop>) {
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::Evolution(_) => {
                self.pending_genomes.clear();
                self.telemetry.log_event("EVOLUTION_STOP", "training stopped before completion, state -> Idle");
                cwc.respond(Ok(Empty));
            }
            other => {
                let name = other.name();
                self.state = other;
                cwc.reject_state_mismatch(name);
            }
        }
    }

    fn handle_training_result_save(&mut self, cwc: Cwc<TrainingResultSave>) {
        let current_name = self.state.name();
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::UnsavedTrainingResult(result) => {
                let total_candidates = result.candidates.len();
                let mut best: Option<(GenomeId, f64)> = None;
                let mut saved_count: u32 = 0;
                for genome_id in &cwc.request.genome_ids {
                    let Some(candidate) = result.candidates.iter().find(|c| c.id == *genome_id) else {
                        continue;
                    };
                    let Some(genome) = self.pending_genomes.remove(genome_id).flatten() else {
                        continue;
                    };
                    let metadata = GenomeMetadata {
                        display_name: format!("{:?}-gen{}", result.summary.organism_type, candidate.generation),
                        fitness: candidate.fitness,
                        robust_eval_count: 1,
                        generation: candidate.generation,
                        scenario_id: result.summary.scenario_id,
                        organism_type: result.summary.organism_type,
                        brain_kind: candidate.brain_kind.clone(),
                        brain_variant: candidate.brain_variant.clone(),
                        created_at: chrono::Utc::now(),
                        training_session_id: result.summary.training_session_id,
                        notes: None,
                    };
                    self.genome_repo.store(*genome_id, genome, metadata);
                    saved_count += 1;
                    if best.map(|(_, fitness)| candidate.fitness > fitness).unwrap_or(true) {
                        best = Some((*genome_id, candidate.fitness));
                    }
                }
                if let Some((best_id, _)) = best {
                    self.genome_repo.mark_as_best(best_id);
                }
                self.pending_genomes.clear();
                let discarded_count = (total_candidates as u32).saturating_sub(saved_count);

                let record = TrainingResultRecord { result, created_at: chrono::Utc::now() };
                if let Err(err) = self.training_repo.save(record) {
                    cwc.respond(Err(ApiError::internal(err)));
                    return;
                }

                if cwc.request.restart {
                    match self.restart_evolution() {
                        Ok(training_session_id) => {
                            self.telemetry.log_event(
                                "TRAINING_RESULT_SAVED",
                                format!("{saved_count} saved, {discarded_count} discarded, restarted as {training_session_id}"),
                            );
                        }
                        Err(err) => {
                            self.telemetry.log_event("TRAINING_RESULT_SAVED", format!("{saved_count} saved, {discarded_count} discarded"));
                            cwc.respond(Err(ApiError::validation(err.to_string())));
                            return;
                        }
                    }
                } else {
                    self.telemetry.log_event("TRAINING_RESULT_SAVED", format!("{saved_count} saved, {discarded_count} discarded"));
                }
                cwc.respond(Ok(TrainingResultSaveOkay { saved_count, discarded_count }));
            }
            other => {
                self.state = other;
                cwc.reject_state_mismatch(current_name);
            }
        }
    }

    fn handle_training_result_discard(&mut self, cwc: Cwc<TrainingResultDiscard>) {
        let current_name = self.state.name();
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::UnsavedTrainingResult(_) => {
                self.pending_genomes.clear();
                self.telemetry.log_event("TRAINING_RESULT_DISCARDED", "unsaved training result discarded");
                cwc.respond(Ok(Empty));
            }
            other => {
                self.state = other;
                cwc.reject_state_mismatch(current_name);
            }
        }
    }

    fn handle_training_result_list(&mut self, cwc: Cwc<TrainingResultList>) {
        match self.training_repo.list() {
            Ok(records) => cwc.respond(Ok(TrainingResultListOkay { records })),
            Err(err) => cwc.respond(Err(ApiError::internal(err))),
        }
    }

    fn handle_training_result_get(&mut self, cwc: Cwc<TrainingResultGet>) {
        let training_session_id = cwc.request.training_session_id;
        match self.training_repo.get(training_session_id) {
            Ok(record) => cwc.respond(Ok(TrainingResultGetOkay { record })),
            Err(err) => cwc.respond(Err(ApiError::internal(err))),
        }
    }

    fn handle_genome_list(&mut self, cwc: Cwc<GenomeList>) {
        cwc.respond(Ok(GenomeListOkay { records: self.genome_repo.list() }));
    }

    fn handle_genome_get(&mut self, cwc: Cwc<GenomeGet>) {
        let id = cwc.request.id;
        let record = self
            .genome_repo
            .get(id)
            .map(|genome| GenomeRecord { id, genome: genome.clone(), metadata: self.genome_repo.get_metadata(id).cloned().unwrap() });
        cwc.respond(Ok(GenomeGetOkay { record }));
    }

    fn handle_genome_get_best(&mut self, cwc: Cwc<GenomeGetBest>) {
        let record = self.genome_repo.get_best_id().map(|id| GenomeRecord {
            id,
            genome: self.genome_repo.get(id).cloned().unwrap(),
            metadata: self.genome_repo.get_metadata(id).cloned().unwrap(),
        });
        cwc.respond(Ok(GenomeGetOkay { record }));
    }

    /// `FingerDown`/`Move`/`Up` are accepted while a sim is running but
    /// have no real effect: the demo world carries no pointer-driven
    /// terrain manipulation, unlike the real cellular-physics world this
    /// stands in for.
    fn handle_pointer_event<C: Command<Request = FingerRequest, Okay = Empty>>(&mut self, name: &'static str, cwc: Cwc<C>) {
        self.telemetry.log_event(name, format!("({}, {})", cwc.request.x, cwc.request.y));
        cwc.respond(Ok(Empty));
    }

    fn handle_seed_event<C: Command<Request = SeedAddRequest, Okay = Empty>>(&mut self, name: &'static str, cwc: Cwc<C>) {
        self.telemetry.log_event(name, format!("({}, {})", cwc.request.x, cwc.request.y));
        cwc.respond(Ok(Empty));
    }

    fn handle_peers_get(&mut self, cwc: Cwc<PeersGet>) {
        cwc.respond(Ok(Empty));
    }

    fn handle_perf_stats_get(&mut self, cwc: Cwc<PerfStatsGet>) {
        let snapshot = self.telemetry.build_snapshot(None, None);
        cwc.respond(Ok(PerfStatsOkay {
            tick_count: snapshot.tick,
            commands_dispatched: snapshot.metrics.commands_dispatched,
        }));
    }

    fn handle_timer_stats_get(&mut self, cwc: Cwc<TimerStatsGet>) {
        cwc.respond(Ok(Empty));
    }

    fn handle_scenario_list_get(&mut self, cwc: Cwc<ScenarioListGet>) {
        let scenarios = [ScenarioId::Sandbox, ScenarioId::TreeGermination, ScenarioId::DuckPond, ScenarioId::GoosePond, ScenarioId::NesAdapter]
            .into_iter()
            .map(|id| match scenario_for_id(id) {
                Some(scenario) => {
                    let (world_width, world_height) = scenario.world_size();
                    ScenarioDescriptor { scenario_id: id, organism_type: scenario.organism_type(), world_width, world_height, installable: true }
                }
                None => ScenarioDescriptor {
                    scenario_id: id,
                    organism_type: dirtsim_types::scenario::OrganismType::Duck,
                    world_width: 0,
                    world_height: 0,
                    installable: false,
                },
            })
            .collect();
        cwc.respond(Ok(ScenarioListOkay { scenarios }));
    }

    fn handle_scenario_switch(&mut self, cwc: Cwc<ScenarioSwitch>) {
        self.selected_scenario = cwc.request.scenario_id;
        self.telemetry.log_event("SCENARIO_SWITCH", format!("selected scenario -> {}", cwc.request.scenario_id));
        cwc.respond(Ok(Empty));
    }

    fn handle_training_result_delete(&mut self, cwc: Cwc<TrainingResultDelete>) {
        match self.training_repo.delete(cwc.request.training_session_id) {
            Ok(deleted) => {
                if deleted {
                    self.telemetry.log_event("TRAINING_RESULT_DELETED", cwc.request.training_session_id.to_string());
                }
                cwc.respond(Ok(Empty));
            }
            Err(err) => cwc.respond(Err(ApiError::internal(err))),
        }
    }

    fn handle_user_settings_set(&mut self, cwc: Cwc<UserSettingsSet>) {
        let value = cwc.request.value.clone();
        match self.settings.set(value.clone()) {
            Ok(()) => {
                self.broadcast("UserSettingsUpdated", value);
                cwc.respond(Ok(Empty));
            }
            Err(err) => cwc.respond(Err(ApiError::internal(err))),
        }
    }

    fn handle_websocket_access_set(&mut self, cwc: Cwc<WebSocketAccessSet>) {
        let enabled = cwc.request.enabled;
        self.access_control.set(enabled, cwc.request.token.clone());
        if !enabled {
            self.connections.close_non_loopback();
        }
        self.telemetry.log_event("WEBSOCKET_ACCESS_SET", format!("enabled={enabled}"));
        cwc.respond(Ok(Empty));
    }

    fn handle_exit(&mut self, cwc: Cwc<Exit>) {
        self.telemetry.log_event("EXIT", "shutdown requested");
        self.state = ServerState::Shutdown;
        cwc.respond(Ok(Empty));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue as Queue;
    use crate::settings::MemorySettingsStore;
    use crate::training_repo::MemoryTrainingResultRepository;
    use dirtsim_types::scenario::{OrganismType, ScenarioId};
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let telemetry = TelemetryBus::new(tx);
        let queue = Queue::bounded(64);
        let (broadcast_tx, _broadcast_rx) = crossbeam_channel::unbounded();
        let mut dispatcher = Dispatcher::new(
            Box::new(MemoryTrainingResultRepository::default()),
            Box::new(MemorySettingsStore::default()),
            telemetry,
            queue,
            broadcast_tx,
            Arc::new(crate::transport::AccessControl::new(false, None)),
            Arc::new(crate::transport::ConnectionRegistry::default()),
        );
        dispatcher.start();
        dispatcher
    }

    fn invoke(dispatcher: &mut Dispatcher, name: &'static str, request_json: serde_json::Value) -> Result<serde_json::Value, ApiError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        dispatcher.dispatch_command(CommandInvocation {
            connection_id: 1,
            name,
            request_json,
            respond: Box::new(move |result| {
                let _ = tx.send(result);
            }),
        });
        rx.try_recv().expect("handler must respond synchronously")
    }

    #[test]
    fn sim_run_then_stop_round_trips_through_idle() {
        let mut dispatcher = dispatcher();
        assert_eq!(dispatcher.state_name(), "Idle");

        let request = json!({
            "timestep": 1.0 / 60.0,
            "max_steps": -1,
            "scenario_id": "Sandbox",
            "start_paused": false,
            "container_size": null,
        });
        invoke(&mut dispatcher, "SimRun", request).unwrap();
        assert_eq!(dispatcher.state_name(), "SimRunning");

        invoke(&mut dispatcher, "SimStop", json!({})).unwrap();
        assert_eq!(dispatcher.state_name(), "Idle");
    }

    #[test]
    fn websocket_access_set_re_arms_the_shared_access_control() {
        let mut dispatcher = dispatcher();
        assert!(!dispatcher.access_control.is_enabled());

        invoke(&mut dispatcher, "WebSocketAccessSet", json!({ "enabled": true, "token": "T" })).unwrap();
        assert!(dispatcher.access_control.is_enabled());
        assert!(dispatcher.access_control.check_token("T"));

        invoke(&mut dispatcher, "WebSocketAccessSet", json!({ "enabled": false, "token": null })).unwrap();
        assert!(!dispatcher.access_control.is_enabled());
    }

    #[test]
    fn commands_outside_their_accepted_state_are_rejected() {
        let mut dispatcher = dispatcher();
        let err = invoke(&mut dispatcher, "SimStop", json!({})).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::StateMismatch);
    }

    #[test]
    fn evolution_runs_to_completion_and_saves_a_genome() {
        let mut dispatcher = dispatcher();
        let request = json!({
            "scenario_id": ScenarioId::DuckPond,
            "organism_type": OrganismType::Duck,
            "population_size": 4,
            "tournament_size": 2,
            "max_generations": 1,
            "max_simulation_time": 0.05,
            "mutation_rate": 0.1,
            "mutation_sigma": 0.1,
            "mutation_reset_rate": 0.01,
            "brain_kind": "feedforward",
            "brain_variant": null,
            "warm_start": false,
        });
        invoke(&mut dispatcher, "EvolutionStart", request).unwrap();
        assert_eq!(dispatcher.state_name(), "Evolution");

        for _ in 0..2000 {
            dispatcher.advance(1.0 / 60.0);
            if dispatcher.state_name() != "Evolution" {
                break;
            }
        }
        assert_eq!(dispatcher.state_name(), "UnsavedTrainingResult");

        let genome_ids: Vec<GenomeId> = dispatcher.pending_genomes.keys().copied().collect();
        let saved = genome_ids.len();
        let okay = invoke(&mut dispatcher, "TrainingResultSave", json!({ "genome_ids": genome_ids, "restart": false })).unwrap();
        assert_eq!(dispatcher.state_name(), "Idle");
        assert!(dispatcher.genome_repo.get_best_id().is_some());
        assert_eq!(okay["saved_count"], saved as u64);
        assert_eq!(okay["discarded_count"], 0);
    }

    #[test]
    fn training_result_save_with_restart_starts_a_fresh_evolution() {
        let mut dispatcher = dispatcher();
        let request = json!({
            "scenario_id": ScenarioId::DuckPond,
            "organism_type": OrganismType::Duck,
            "population_size": 4,
            "tournament_size": 2,
            "max_generations": 1,
            "max_simulation_time": 0.05,
            "mutation_rate": 0.1,
            "mutation_sigma": 0.1,
            "mutation_reset_rate": 0.01,
            "brain_kind": "feedforward",
            "brain_variant": null,
            "warm_start": false,
        });
        invoke(&mut dispatcher, "EvolutionStart", request).unwrap();

        for _ in 0..2000 {
            dispatcher.advance(1.0 / 60.0);
            if dispatcher.state_name() != "Evolution" {
                break;
            }
        }
        assert_eq!(dispatcher.state_name(), "UnsavedTrainingResult");

        let mut genome_ids: Vec<GenomeId> = dispatcher.pending_genomes.keys().copied().collect();
        genome_ids.truncate(2);
        let total = dispatcher.pending_genomes.len();
        let okay = invoke(&mut dispatcher, "TrainingResultSave", json!({ "genome_ids": genome_ids, "restart": true })).unwrap();
        assert_eq!(dispatcher.state_name(), "Evolution");
        assert_eq!(okay["saved_count"], genome_ids.len() as u64);
        assert_eq!(okay["discarded_count"], (total - genome_ids.len()) as u64);
    }
}
