//! # dirtsim-engine::errors
//!
//! Internal error types that don't cross the transport boundary as
//! `ApiError` (that conversion happens at the command-handler edge).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("world construction failed: {0}")]
    WorldConstruction(String),

    #[error("scenario '{0}' failed validation: {1}")]
    ScenarioValidation(String, String),

    #[error("brain registry has no entry for ({organism_type}, {brain_kind}, {brain_variant:?})")]
    BrainNotFound {
        organism_type: String,
        brain_kind: String,
        brain_variant: Option<String>,
    },

    #[error("training-result store error: {0}")]
    TrainingResultStore(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
