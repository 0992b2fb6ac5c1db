//! # dirtsim-engine::scenario
//!
//! The pluggable world-setup strategies the state machine installs into a
//! `World` (spec §3, §4.5). A `Scenario` picks world dimensions, decides
//! where a trainer should place its one evaluation organism, and -- for
//! the NES adapter -- validates an external ROM file before the state
//! machine commits to `SimRunning`.

use crate::world::{CellPos, OrganismManager, World};
use dirtsim_types::scenario::{NesRomCheckResult, NesRomStatus, OrganismType, ScenarioId};
use std::path::Path;

pub trait Scenario: Send {
    fn scenario_id(&self) -> ScenarioId;

    /// World dimensions this scenario expects, in cells.
    fn world_size(&self) -> (u32, u32);

    /// Organism type a training run against this scenario evaluates.
    fn organism_type(&self) -> OrganismType;

    /// Installs any scenario-specific fixtures into a freshly constructed
    /// world (seed terrain, obstacles, starting resources).
    fn install(&self, world: &mut dyn World);

    /// Chooses where the trainer's one evaluation organism should spawn,
    /// per spec §4.6: the nearest air cell to world center, preferring
    /// the top half, falling back to the bottom half.
    fn spawn_position(&self, world: &mut dyn World) -> CellPos {
        let (w, h) = self.world_size();
        let center = CellPos { x: w / 2, y: h / 2 };
        world
            .organisms()
            .nearest_air_cell(center)
            .unwrap_or(CellPos { x: w / 2, y: h.saturating_sub(1) })
    }

    /// Scenario-level precondition check run before `EvolutionStart`/`SimRun`
    /// commits to a `World`. The default accepts unconditionally; only the
    /// NES adapter scenario overrides this.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

pub struct SandboxScenario;

impl Scenario for SandboxScenario {
    fn scenario_id(&self) -> ScenarioId {
        ScenarioId::Sandbox
    }
    fn world_size(&self) -> (u32, u32) {
        (128, 72)
    }
    fn organism_type(&self) -> OrganismType {
        OrganismType::Duck
    }
    fn install(&self, _world: &mut dyn World) {}
}

pub struct TreeGerminationScenario;

impl Scenario for TreeGerminationScenario {
    fn scenario_id(&self) -> ScenarioId {
        ScenarioId::TreeGermination
    }
    fn world_size(&self) -> (u32, u32) {
        (96, 96)
    }
    fn organism_type(&self) -> OrganismType {
        OrganismType::Tree
    }
    fn install(&self, _world: &mut dyn World) {}
}

pub struct DuckPondScenario;

impl Scenario for DuckPondScenario {
    fn scenario_id(&self) -> ScenarioId {
        ScenarioId::DuckPond
    }
    fn world_size(&self) -> (u32, u32) {
        (160, 90)
    }
    fn organism_type(&self) -> OrganismType {
        OrganismType::Duck
    }
    fn install(&self, _world: &mut dyn World) {}
}

pub struct GoosePondScenario;

impl Scenario for GoosePondScenario {
    fn scenario_id(&self) -> ScenarioId {
        ScenarioId::GoosePond
    }
    fn world_size(&self) -> (u32, u32) {
        (160, 90)
    }
    fn organism_type(&self) -> OrganismType {
        OrganismType::Goose
    }
    fn install(&self, _world: &mut dyn World) {}
}

/// Constructs the demo `Scenario` for a given id. `NesAdapter` has no demo
/// implementation here (the real adapter is out of scope) and returns `None`.
pub fn scenario_for_id(id: ScenarioId) -> Option<Box<dyn Scenario>> {
    match id {
        ScenarioId::Sandbox => Some(Box::new(SandboxScenario)),
        ScenarioId::TreeGermination => Some(Box::new(TreeGerminationScenario)),
        ScenarioId::DuckPond => Some(Box::new(DuckPondScenario)),
        ScenarioId::GoosePond => Some(Box::new(GoosePondScenario)),
        ScenarioId::NesAdapter => None,
    }
}

/// Validates candidate NES ROM files against the iNES header before a
/// `NesAdapter` scenario installs one. The real adapter (out of scope
/// here) feeds emulator state into `World`; this is just the validation
/// contract named in spec §9.
pub struct NesRomCatalog;

const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
const SUPPORTED_MAPPERS: [u16; 3] = [0, 1, 4];

impl NesRomCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, rom_path: &Path) -> NesRomCheckResult {
        let bytes = match std::fs::read(rom_path) {
            Ok(bytes) => bytes,
            Err(_) => {
                return NesRomCheckResult {
                    status: NesRomStatus::NotFound,
                    mapper: None,
                    prg_banks: None,
                    chr_banks: None,
                    message: Some(format!("rom not found at {}", rom_path.display())),
                }
            }
        };
        if bytes.len() < 16 || bytes[0..4] != INES_MAGIC {
            return NesRomCheckResult {
                status: NesRomStatus::BadHeader,
                mapper: None,
                prg_banks: None,
                chr_banks: None,
                message: Some("missing iNES magic bytes".to_string()),
            };
        }
        let prg_banks = bytes[4];
        let chr_banks = bytes[5];
        let mapper_low = bytes[6] >> 4;
        let mapper_high = bytes[7] & 0xF0;
        let mapper = (mapper_high | mapper_low) as u16;
        if !SUPPORTED_MAPPERS.contains(&mapper) {
            return NesRomCheckResult {
                status: NesRomStatus::UnsupportedMapper,
                mapper: Some(mapper),
                prg_banks: Some(prg_banks),
                chr_banks: Some(chr_banks),
                message: Some(format!("mapper {mapper} is not supported")),
            };
        }
        NesRomCheckResult {
            status: NesRomStatus::Ok,
            mapper: Some(mapper),
            prg_banks: Some(prg_banks),
            chr_banks: Some(chr_banks),
            message: None,
        }
    }
}

impl Default for NesRomCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rom_is_not_found() {
        let result = NesRomCatalog::new().check(Path::new("/nonexistent/rom.nes"));
        assert_eq!(result.status, NesRomStatus::NotFound);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let dir = std::env::temp_dir().join(format!("dirtsim-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.nes");
        std::fs::write(&path, [0u8; 16]).unwrap();
        let result = NesRomCatalog::new().check(&path);
        assert_eq!(result.status, NesRomStatus::BadHeader);
    }
}
