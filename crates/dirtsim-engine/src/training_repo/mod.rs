//! # dirtsim-engine::training_repo
//!
//! The training-result repository: persists completed (or explicitly
//! saved) evolutionary runs, keyed by `training_session_id`. Two
//! interchangeable backends share one trait, grounded on
//! `original_source/apps/src/server/TrainingResultRepository.h` — an
//! in-memory one for tests and ephemeral servers, and a durable SQLite
//! one (via `rusqlite`, bundled feature) for anything meant to survive a
//! restart.

mod memory;
mod sqlite;

pub use memory::MemoryTrainingResultRepository;
pub use sqlite::SqliteTrainingResultRepository;

use dirtsim_types::id::TrainingSessionId;
use dirtsim_types::training::TrainingResultRecord;

/// Uniform interface over both backends. Errors are stringly-typed
/// because the two backends fail for unrelated reasons (`rusqlite::Error`
/// vs. nothing at all) and callers only ever surface the message inside
/// an `ApiError`.
pub trait TrainingResultRepository: Send {
    fn save(&mut self, record: TrainingResultRecord) -> Result<(), String>;
    fn get(&self, training_session_id: TrainingSessionId) -> Result<Option<TrainingResultRecord>, String>;
    fn list(&self) -> Result<Vec<TrainingResultRecord>, String>;
    fn delete(&mut self, training_session_id: TrainingSessionId) -> Result<bool, String>;
}
