//! # dirtsim-engine::prelude
//!
//! Convenience re-exports for the rest of the crate and for `dirtsim-ui`.

pub use crate::{
    errors::EngineError,
    events::{CommandInvocation, Event},
    genome_repo::GenomeRepository,
    ids::IdGen,
    scenario::{NesRomCatalog, Scenario},
    state::ServerState,
    training_repo::TrainingResultRepository,
    world::{OrganismManager, World},
};

pub use dirtsim_types::{
    self,
    config::*,
    envelope::*,
    errors::*,
    genome::*,
    id::*,
    metrics::*,
    scenario::*,
    training::*,
};

pub use dirtsim_proto::{self, api::*, correlation::CorrelationTable, ctx_ext::*};
