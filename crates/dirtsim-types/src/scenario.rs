//! # dirtsim-types::scenario
//!
//! Identifies the pluggable world-setup strategies the state machine can
//! install into a `World` (spec §3 "Scenario", §4.5). The scenario itself
//! lives in `dirtsim-engine` (it participates in each tick); this module
//! only owns the wire-stable identifier and the NES-ROM validation contract
//! named in spec §9 design notes.

use serde::{Deserialize, Serialize};

/// Identifies a scenario by name. Enumerated here (rather than an opaque
/// string) so `ScenarioListGet`/`ScenarioSwitch`/training specs all agree on
/// a closed set; new scenarios are added as variants, not strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ScenarioId {
    Sandbox,
    TreeGermination,
    DuckPond,
    GoosePond,
    NesAdapter,
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScenarioId::Sandbox => "Sandbox",
            ScenarioId::TreeGermination => "TreeGermination",
            ScenarioId::DuckPond => "DuckPond",
            ScenarioId::GoosePond => "GoosePond",
            ScenarioId::NesAdapter => "NesAdapter",
        };
        write!(f, "{s}")
    }
}

/// Which organism type a scenario/training spec targets. Drives brain
/// registry lookups (`(organism_type, brain_kind, brain_variant)`, spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OrganismType {
    Duck,
    Goose,
    Tree,
}

/// Outcome of validating an NES ROM before a `NesAdapter` scenario installs
/// it. A pure function over `(romId, directory, romPath)` in the engine;
/// this type is just its result shape (spec §9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NesRomCheckResult {
    pub status: NesRomStatus,
    pub mapper: Option<u16>,
    pub prg_banks: Option<u8>,
    pub chr_banks: Option<u8>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NesRomStatus {
    Ok,
    NotFound,
    BadHeader,
    UnsupportedMapper,
}
