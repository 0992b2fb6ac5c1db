//! # dirtsim-ui::commands
//!
//! Concrete `Command` implementations for the UI's own command surface
//! (spec §6, "UI command surface"). Distinct names from the Server's
//! registry (spec §4.2: a command name may be registered independently on
//! each process) even where a handler goes on to forward an equivalent
//! request to the Server.

use dirtsim_engine::commands::{EvolutionStartOkay, EvolutionStartRequest, GenomeGetOkay, GenomeListOkay, TrainingResultSaveOkay, TrainingResultSaveRequest};
use dirtsim_proto::api::Command;
use dirtsim_types::id::GenomeId;
use serde::{Deserialize, Serialize};

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
pub struct PointerRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconSelectRequest {
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconRailExpandRequest {
    pub expanded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowIconsRequest {
    pub icons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeDetailOpenRequest {
    pub id: GenomeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeDetailLoadRequest {
    pub id: GenomeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthKeyEventRequest {
    pub note: u8,
    pub velocity: u8,
    pub down: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamStartRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebRtcAnswerRequest {
    pub session_id: String,
    pub sdp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebRtcCandidateRequest {
    pub session_id: String,
    pub candidate: String,
}

/// Mirrors `dirtsim_engine::commands::WebSocketAccessSetRequest`'s shape;
/// kept as its own type since the UI's registry doesn't otherwise depend
/// on the engine's command types, only the ones it forwards verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketAccessSetRequest {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOkay {
    pub ui_state: String,
    pub connected_to_server: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateOkay {
    pub ui_state: String,
}

command!(MouseDown, "MouseDown", PointerRequest, Empty);
command!(MouseMove, "MouseMove", PointerRequest, Empty);
command!(MouseUp, "MouseUp", PointerRequest, Empty);
command!(IconSelect, "IconSelect", IconSelectRequest, Empty);
command!(IconRailExpand, "IconRailExpand", IconRailExpandRequest, Empty);
command!(ShowIcons, "ShowIcons", ShowIconsRequest, Empty);

command!(SimRun, "SimRun", Empty, Empty);
command!(SimPause, "SimPause", Empty, Empty);
command!(SimStop, "SimStop", Empty, Empty);

command!(TrainingStart, "TrainingStart", EvolutionStartRequest, EvolutionStartOkay);
command!(ResultSave, "ResultSave", TrainingResultSaveRequest, TrainingResultSaveOkay);
command!(ResultDiscard, "ResultDiscard", Empty, Empty);
command!(TrainingConfigShowEvolution, "TrainingConfigShowEvolution", Empty, Empty);

command!(GenomeBrowserOpen, "GenomeBrowserOpen", Empty, GenomeListOkay);
command!(GenomeDetailOpen, "GenomeDetailOpen", GenomeDetailOpenRequest, GenomeGetOkay);
command!(GenomeDetailLoad, "GenomeDetailLoad", GenomeDetailLoadRequest, GenomeGetOkay);

command!(SynthKeyEvent, "SynthKeyEvent", SynthKeyEventRequest, Empty);
command!(ScreenGrab, "ScreenGrab", Empty, Empty);
command!(StreamStart, "StreamStart", StreamStartRequest, Empty);
command!(WebRtcAnswer, "WebRtcAnswer", WebRtcAnswerRequest, Empty);
command!(WebRtcCandidate, "WebRtcCandidate", WebRtcCandidateRequest, Empty);

command!(WebSocketAccessSet, "WebSocketAccessSet", WebSocketAccessSetRequest, Empty);
command!(StatusGet, "StatusGet", Empty, StatusOkay);
command!(StateGet, "StateGet", Empty, StateOkay);
command!(Exit, "Exit", Empty, Empty);

/// Registers every command the UI accepts on its own listener (spec §6,
/// "UI command surface").
pub fn register_all(registry: &mut dirtsim_proto::api::CommandRegistry) -> &mut dirtsim_proto::api::CommandRegistry {
    registry
        .register::<MouseDown>()
        .register::<MouseMove>()
        .register::<MouseUp>()
        .register::<IconSelect>()
        .register::<IconRailExpand>()
        .register::<ShowIcons>()
        .register::<SimRun>()
        .register::<SimPause>()
        .register::<SimStop>()
        .register::<TrainingStart>()
        .register::<ResultSave>()
        .register::<ResultDiscard>()
        .register::<TrainingConfigShowEvolution>()
        .register::<GenomeBrowserOpen>()
        .register::<GenomeDetailOpen>()
        .register::<GenomeDetailLoad>()
        .register::<SynthKeyEvent>()
        .register::<ScreenGrab>()
        .register::<StreamStart>()
        .register::<WebRtcAnswer>()
        .register::<WebRtcCandidate>()
        .register::<WebSocketAccessSet>()
        .register::<StatusGet>()
        .register::<StateGet>()
        .register::<Exit>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtsim_proto::api::CommandRegistry;

    #[test]
    fn every_registered_command_is_individually_addressable() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        for name in ["SimRun", "TrainingStart", "ResultSave", "ResultDiscard", "GenomeBrowserOpen", "WebSocketAccessSet", "StatusGet", "StateGet", "Exit"] {
            assert!(registry.lookup(name).is_some(), "{name} should be registered");
        }
    }
}
