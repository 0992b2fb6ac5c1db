//! # dirtsim-types::training
//!
//! Shapes stored by the training-result repository and broadcast as
//! `TrainingResultAvailable` (spec §3 "TrainingResult", §4.8, grounded on
//! `original_source/apps/src/server/api/TrainingResult.h` and
//! `TrainingResultAvailable.h`).

use crate::id::{GenomeId, TrainingSessionId};
use crate::scenario::{OrganismType, ScenarioId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for one completed (or stopped) evolutionary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub training_session_id: TrainingSessionId,
    pub scenario_id: ScenarioId,
    pub organism_type: OrganismType,
    pub population_size: u32,
    pub max_generations: u32,
    pub completed_generations: u32,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub total_training_seconds: f64,
    pub primary_brain_kind: String,
    pub primary_brain_variant: Option<String>,
}

/// One individual's final standing within a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: GenomeId,
    pub fitness: f64,
    pub brain_kind: String,
    pub brain_variant: Option<String>,
    pub generation: u32,
}

/// The full pending/stored artifact of a training run: what
/// `UnsavedTrainingResult` holds and what the repository persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub summary: Summary,
    pub candidates: Vec<Candidate>,
}

/// A stored row, as returned by `TrainingResultRepository::list/get`
/// (spec §4.8: `(summary, candidates, created_at)`, durable schema adds
/// `created_at` as an epoch-seconds integer column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResultRecord {
    pub result: TrainingResult,
    pub created_at: DateTime<Utc>,
}
