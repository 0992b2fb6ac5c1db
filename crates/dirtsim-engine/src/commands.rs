//! # dirtsim-engine::commands
//!
//! Concrete `Command` implementations for the Server's command surface
//! (spec §6, "non-exhaustive inventory of mutating commands"). Each type
//! here is a zero-sized marker; its `NAME`/`Request`/`Okay` triple is what
//! the registry and the dispatcher's match arms key off of. New commands
//! follow the same three-line shape.

use dirtsim_proto::api::Command;
use dirtsim_types::genome::GenomeRecord;
use dirtsim_types::id::{GenomeId, TrainingSessionId};
use dirtsim_types::scenario::{OrganismType, ScenarioId};
use dirtsim_types::training::TrainingResultRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

macro_rules! command {
    ($name:ident, $wire_name:expr, $request:ty, $okay:ty) => {
        #[derive(Debug)]
        pub struct $name;
        impl Command for $name {
            const NAME: &'static str = $wire_name;
            type Request = $request;
            type Okay = $okay;
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Empty;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRunRequest {
    pub timestep: f64,
    pub max_steps: i64,
    pub scenario_id: Option<ScenarioId>,
    pub start_paused: bool,
    pub container_size: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldResizeRequest {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOkay {
    pub state: String,
    pub tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateOkay {
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStartRequest {
    pub scenario_id: ScenarioId,
    pub organism_type: OrganismType,
    pub population_size: u32,
    pub tournament_size: u32,
    pub max_generations: u32,
    pub max_simulation_time: f64,
    pub mutation_rate: f64,
    pub mutation_sigma: f64,
    pub mutation_reset_rate: f64,
    pub brain_kind: String,
    pub brain_variant: Option<String>,
    pub warm_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStartOkay {
    pub training_session_id: TrainingSessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResultSaveRequest {
    pub genome_ids: Vec<GenomeId>,
    pub restart: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResultSaveOkay {
    pub saved_count: u32,
    pub discarded_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResultListOkay {
    pub records: Vec<TrainingResultRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResultGetRequest {
    pub training_session_id: TrainingSessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResultGetOkay {
    pub record: Option<TrainingResultRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeGetRequest {
    pub id: GenomeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeGetOkay {
    pub record: Option<GenomeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeListOkay {
    pub records: Vec<GenomeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerRequest {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAddRequest {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfStatsOkay {
    pub tick_count: u64,
    pub commands_dispatched: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    pub scenario_id: ScenarioId,
    pub organism_type: OrganismType,
    pub world_width: u32,
    pub world_height: u32,
    pub installable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioListOkay {
    pub scenarios: Vec<ScenarioDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSwitchRequest {
    pub scenario_id: ScenarioId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResultDeleteRequest {
    pub training_session_id: TrainingSessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettingsSetRequest {
    pub value: Json,
}

/// Live toggle for a transport listener's network exposure (spec §8
/// access-control scenario). `enabled=true` requires `token` on every
/// non-loopback connection, compared in constant time; `enabled=false`
/// drops that requirement but also drops every currently-connected
/// non-loopback peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketAccessSetRequest {
    pub enabled: bool,
    pub token: Option<String>,
}

command!(SimRun, "SimRun", SimRunRequest, Empty);
command!(SimStop, "SimStop", Empty, Empty);
command!(SimPause, "SimPause", Empty, Empty);
command!(SimResume, "SimResume", Empty, Empty);
command!(Reset, "Reset", Empty, Empty);
command!(WorldResize, "WorldResize", WorldResizeRequest, Empty);
command!(StatusGet, "StatusGet", Empty, StatusOkay);
command!(StateGet, "StateGet", Empty, StateOkay);
command!(EventSubscribe, "EventSubscribe", Empty, Empty);
command!(EvolutionStart, "EvolutionStart", EvolutionStartRequest, EvolutionStartOkay);
command!(EvolutionStop, "EvolutionStop", Empty, Empty);
command!(TrainingResultSave, "TrainingResultSave", TrainingResultSaveRequest, TrainingResultSaveOkay);
command!(TrainingResultDiscard, "TrainingResultDiscard", Empty, Empty);
command!(TrainingResultList, "TrainingResultList", Empty, TrainingResultListOkay);
command!(TrainingResultGet, "TrainingResultGet", TrainingResultGetRequest, TrainingResultGetOkay);
command!(GenomeList, "GenomeList", Empty, GenomeListOkay);
command!(GenomeGet, "GenomeGet", GenomeGetRequest, GenomeGetOkay);
command!(GenomeGetBest, "GenomeGetBest", Empty, GenomeGetOkay);
command!(FingerDown, "FingerDown", FingerRequest, Empty);
command!(FingerMove, "FingerMove", FingerRequest, Empty);
command!(FingerUp, "FingerUp", FingerRequest, Empty);
command!(SeedAdd, "SeedAdd", SeedAddRequest, Empty);
command!(SpawnDirtBall, "SpawnDirtBall", SeedAddRequest, Empty);
command!(PeersGet, "PeersGet", Empty, Empty);
command!(PerfStatsGet, "PerfStatsGet", Empty, PerfStatsOkay);
command!(TimerStatsGet, "TimerStatsGet", Empty, Empty);
command!(ScenarioListGet, "ScenarioListGet", Empty, ScenarioListOkay);
command!(ScenarioSwitch, "ScenarioSwitch", ScenarioSwitchRequest, Empty);
command!(TrainingResultDelete, "TrainingResultDelete", TrainingResultDeleteRequest, Empty);
command!(UserSettingsSet, "UserSettingsSet", UserSettingsSetRequest, Empty);
command!(WebSocketAccessSet, "WebSocketAccessSet", WebSocketAccessSetRequest, Empty);
command!(Exit, "Exit", Empty, Empty);

/// Registers every command above into a fresh registry, used by both the
/// transport listener (to validate incoming `message_type`s) and tests.
pub fn register_all(registry: &mut dirtsim_proto::api::CommandRegistry) {
    registry
        .register::<SimRun>()
        .register::<SimStop>()
        .register::<SimPause>()
        .register::<SimResume>()
        .register::<Reset>()
        .register::<WorldResize>()
        .register::<StatusGet>()
        .register::<StateGet>()
        .register::<EventSubscribe>()
        .register::<EvolutionStart>()
        .register::<EvolutionStop>()
        .register::<TrainingResultSave>()
        .register::<TrainingResultDiscard>()
        .register::<TrainingResultList>()
        .register::<TrainingResultGet>()
        .register::<GenomeList>()
        .register::<GenomeGet>()
        .register::<GenomeGetBest>()
        .register::<FingerDown>()
        .register::<FingerMove>()
        .register::<FingerUp>()
        .register::<SeedAdd>()
        .register::<SpawnDirtBall>()
        .register::<PeersGet>()
        .register::<PerfStatsGet>()
        .register::<TimerStatsGet>()
        .register::<ScenarioListGet>()
        .register::<ScenarioSwitch>()
        .register::<TrainingResultDelete>()
        .register::<UserSettingsSet>()
        .register::<WebSocketAccessSet>()
        .register::<Exit>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtsim_proto::api::CommandRegistry;

    #[test]
    fn every_registered_command_is_individually_addressable() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        assert!(registry.lookup("SimRun").is_some());
        assert!(registry.lookup("WebSocketAccessSet").is_some());
        assert!(registry.lookup("Exit").is_some());
        assert!(registry.lookup("NotRegistered").is_none());
    }
}
