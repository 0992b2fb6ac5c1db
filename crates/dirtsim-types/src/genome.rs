//! # dirtsim-types::genome
//!
//! A genome is a flat vector of controller weights plus the metadata the
//! repository and UI need to browse it (spec §3 "Genome", grounded on
//! `original_source/dirtsim/src/core/organisms/brains/Genome.h`).

use crate::id::{GenomeId, TrainingSessionId};
use crate::scenario::{OrganismType, ScenarioId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flat vector of controller weights. Brain-kind-specific interpretation
/// (topology, activation) is the brain registry's concern, not this type's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub weights: Vec<f64>,
}

impl Genome {
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Everything the repository and UI display alongside a stored genome
/// (spec §3 "Genome").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeMetadata {
    pub display_name: String,
    pub fitness: f64,
    pub robust_eval_count: u32,
    pub generation: u32,
    pub scenario_id: ScenarioId,
    pub organism_type: OrganismType,
    pub brain_kind: String,
    pub brain_variant: Option<String>,
    pub created_at: DateTime<Utc>,
    pub training_session_id: TrainingSessionId,
    pub notes: Option<String>,
}

/// A `(Genome, GenomeMetadata)` pair keyed by id, the unit the repository
/// stores and the UI's genome browser lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub id: GenomeId,
    pub genome: Genome,
    pub metadata: GenomeMetadata,
}
