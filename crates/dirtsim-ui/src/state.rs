//! # dirtsim-ui::state
//!
//! The `UiState` variant machine (spec §4.9): symmetric to the Server's
//! `ServerState`, but the UI owns no World -- its variants track what the
//! operator is looking at, not anything that needs a physics step.

/// Sub-states of `UiState::Training`, named the same way the spec's
/// `Training{Idle,Active,UnsavedResult}` shorthand reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingUiState {
    Idle,
    Active,
    UnsavedResult,
}

pub enum UiState {
    Disconnected,
    StartMenu,
    SimRunning,
    Training(TrainingUiState),
    Shutdown,
}

impl UiState {
    pub fn name(&self) -> &'static str {
        match self {
            UiState::Disconnected => "Disconnected",
            UiState::StartMenu => "StartMenu",
            UiState::SimRunning => "SimRunning",
            UiState::Training(TrainingUiState::Idle) => "Training.Idle",
            UiState::Training(TrainingUiState::Active) => "Training.Active",
            UiState::Training(TrainingUiState::UnsavedResult) => "Training.UnsavedResult",
            UiState::Shutdown => "Shutdown",
        }
    }

    /// Command gating, the UI's own analogue of `ServerState::accepts`.
    /// Commands not named here and not in `ALWAYS` fail closed.
    pub fn accepts(&self, command_name: &str) -> bool {
        const ALWAYS: &[&str] = &["StatusGet", "StateGet", "WebSocketAccessSet", "Exit"];
        if ALWAYS.contains(&command_name) {
            return true;
        }
        match self {
            UiState::Disconnected => false,
            UiState::StartMenu => matches!(
                command_name,
                "SimRun"
                    | "TrainingStart"
                    | "GenomeBrowserOpen"
                    | "IconSelect"
                    | "IconRailExpand"
                    | "ShowIcons"
                    | "MouseDown"
                    | "MouseMove"
                    | "MouseUp"
                    | "ScreenGrab"
                    | "StreamStart"
                    | "WebRtcAnswer"
                    | "WebRtcCandidate"
                    | "SynthKeyEvent"
            ),
            UiState::SimRunning => matches!(
                command_name,
                "SimPause" | "SimStop" | "MouseDown" | "MouseMove" | "MouseUp" | "IconSelect" | "IconRailExpand" | "ShowIcons" | "ScreenGrab" | "SynthKeyEvent"
            ),
            UiState::Training(TrainingUiState::Idle) => {
                matches!(command_name, "TrainingStart" | "GenomeBrowserOpen" | "TrainingConfigShowEvolution" | "IconSelect" | "IconRailExpand" | "ShowIcons")
            }
            UiState::Training(TrainingUiState::Active) => matches!(command_name, "TrainingConfigShowEvolution" | "IconSelect" | "IconRailExpand" | "ShowIcons"),
            UiState::Training(TrainingUiState::UnsavedResult) => matches!(
                command_name,
                "ResultSave" | "ResultDiscard" | "GenomeBrowserOpen" | "GenomeDetailOpen" | "GenomeDetailLoad" | "IconSelect" | "IconRailExpand" | "ShowIcons"
            ),
            UiState::Shutdown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_allowed_commands_pass_in_every_state() {
        let states = [
            UiState::Disconnected,
            UiState::StartMenu,
            UiState::SimRunning,
            UiState::Training(TrainingUiState::Idle),
            UiState::Training(TrainingUiState::Active),
            UiState::Training(TrainingUiState::UnsavedResult),
            UiState::Shutdown,
        ];
        for state in &states {
            assert!(state.accepts("StatusGet"));
            assert!(state.accepts("StateGet"));
            assert!(state.accepts("Exit"));
        }
    }

    #[test]
    fn disconnected_accepts_nothing_else() {
        assert!(!UiState::Disconnected.accepts("SimRun"));
    }

    #[test]
    fn unsaved_result_accepts_save_and_discard_only_from_training_commands() {
        let state = UiState::Training(TrainingUiState::UnsavedResult);
        assert!(state.accepts("ResultSave"));
        assert!(state.accepts("ResultDiscard"));
        assert!(!state.accepts("TrainingStart"));
    }
}
