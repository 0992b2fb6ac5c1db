//! # dirtsim-engine::state
//!
//! The authoritative `ServerState` variant machine (spec §4.5). Each
//! variant owns the resources its name implies; transitions pass
//! ownership by value, never share mutable references across states.

use crate::scenario::Scenario;
use crate::trainer::Trainer;
use crate::world::World;
use dirtsim_types::training::TrainingResult;

/// Parameters captured from `SimRun`, re-used by `SimRunning`/`SimPaused`
/// to bound each outer tick.
#[derive(Debug, Clone, Copy)]
pub struct SimRunConfig {
    pub timestep: f64,
    /// Negative means unbounded.
    pub max_steps: i64,
    pub max_frame_ms: Option<u64>,
}

pub struct ActiveSim {
    pub world: Box<dyn World>,
    pub scenario: Box<dyn Scenario>,
    pub config: SimRunConfig,
    pub steps_taken: u64,
}

pub enum ServerState {
    PreStartup,
    Startup,
    Idle,
    SimRunning(ActiveSim),
    SimPaused(ActiveSim),
    Evolution(Box<Trainer>),
    UnsavedTrainingResult(TrainingResult),
    Error(String),
    Shutdown,
}

impl ServerState {
    pub fn name(&self) -> &'static str {
        match self {
            ServerState::PreStartup => "PreStartup",
            ServerState::Startup => "Startup",
            ServerState::Idle => "Idle",
            ServerState::SimRunning(_) => "SimRunning",
            ServerState::SimPaused(_) => "SimPaused",
            ServerState::Evolution(_) => "Evolution",
            ServerState::UnsavedTrainingResult(_) => "UnsavedTrainingResult",
            ServerState::Error(_) => "Error",
            ServerState::Shutdown => "Shutdown",
        }
    }

    /// Whether the World may be mutated while in this state (spec
    /// invariant: only `SimRunning`, `SimPaused`, `Evolution`).
    pub fn mutates_world(&self) -> bool {
        matches!(self, ServerState::SimRunning(_) | ServerState::SimPaused(_) | ServerState::Evolution(_))
    }

    /// Command gating (spec §4.5): whether `command_name` is accepted in
    /// the current state. Commands not named here and not in any state's
    /// list fail closed (rejected everywhere), matching the registry's
    /// representative, non-exhaustive command surface.
    pub fn accepts(&self, command_name: &str) -> bool {
        const ALWAYS: &[&str] = &[
            "StatusGet",
            "StateGet",
            "PeersGet",
            "PerfStatsGet",
            "TimerStatsGet",
            "TrainingResultList",
            "TrainingResultGet",
            "TrainingResultDelete",
            "ScenarioListGet",
            "UserSettingsSet",
            "WebSocketAccessSet",
        ];
        if ALWAYS.contains(&command_name) {
            return true;
        }
        match self {
            ServerState::PreStartup | ServerState::Startup | ServerState::Shutdown => false,
            ServerState::Error(_) => matches!(command_name, "Exit"),
            ServerState::Idle => matches!(
                command_name,
                "SimRun"
                    | "EvolutionStart"
                    | "ScenarioSwitch"
                    | "GenomeList"
                    | "GenomeGet"
                    | "GenomeGetBest"
                    | "Reset"
                    | "Exit"
            ),
            ServerState::SimRunning(_) => matches!(
                command_name,
                "SimStop"
                    | "SimPause"
                    | "WorldResize"
                    | "CellSet"
                    | "CellGet"
                    | "GravitySet"
                    | "FingerDown"
                    | "FingerMove"
                    | "FingerUp"
                    | "SeedAdd"
                    | "SpawnDirtBall"
                    | "ScenarioConfigSet"
                    | "EventSubscribe"
                    | "RenderFormatSet"
                    | "RenderFormatGet"
                    | "Reset"
                    | "Exit"
            ),
            ServerState::SimPaused(_) => matches!(
                command_name,
                "SimResume"
                    | "SimStop"
                    | "WorldResize"
                    | "CellSet"
                    | "CellGet"
                    | "GravitySet"
                    | "FingerDown"
                    | "FingerMove"
                    | "FingerUp"
                    | "SeedAdd"
                    | "SpawnDirtBall"
                    | "ScenarioConfigSet"
                    | "EventSubscribe"
                    | "RenderFormatSet"
                    | "RenderFormatGet"
                    | "Reset"
                    | "Exit"
            ),
            ServerState::Evolution(_) => matches!(command_name, "EvolutionStop" | "EventSubscribe" | "Reset" | "Exit"),
            ServerState::UnsavedTrainingResult(_) => {
                matches!(command_name, "TrainingResultSave" | "TrainingResultDiscard" | "Reset" | "Exit")
            }
        }
    }
}
