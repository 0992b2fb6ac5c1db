//! # dirtsim-engine::world
//!
//! Defines the `World` trait: the core's only view onto the cellular
//! physics grid, organism bodies, and rendering it deliberately does not
//! implement itself. The state machine only ever constructs, advances,
//! resizes, and snapshots a `World` through this boundary, plus an
//! `OrganismManager` handle for spawning organisms by type and genome.
//!
//! `DemoWorld` is the one concrete implementation carried here: enough of
//! a sandbox grid to drive the state machine and the trainer end to end
//! in tests, without any of the real cellular-physics/rendering/audio
//! machinery those are out of scope for.

use dirtsim_types::genome::Genome;
use dirtsim_types::scenario::OrganismType;
use std::collections::HashMap;

/// A position in the world grid, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellPos {
    pub x: u32,
    pub y: u32,
}

/// A read-only snapshot of world state suitable for broadcasting to UI
/// subscribers. Kept deliberately thin; the real renderer owns the cell
/// grid's full representation.
#[derive(Debug, Clone)]
pub struct RenderSnapshot {
    pub width: u32,
    pub height: u32,
    pub tick: u64,
    pub organism_count: usize,
}

/// Handle for spawning and querying organisms within a `World`, kept
/// separate from `World` itself so a scenario can hand it to the brain
/// registry without exposing the rest of world state.
pub trait OrganismManager: Send {
    /// Spawns an organism of `organism_type` at `pos`, controlled by a
    /// brain built from `genome` (or a built-in default when `None`).
    /// Returns an opaque handle used to read back fitness-relevant state.
    fn spawn(&mut self, organism_type: OrganismType, pos: CellPos, genome: Option<&Genome>) -> OrganismHandle;

    /// Position of the nearest air (empty, non-solid) cell to `from`,
    /// searching the top half of the grid first and falling back to the
    /// bottom half. Used to place germinating trees.
    fn nearest_air_cell(&self, from: CellPos) -> Option<CellPos>;

    /// Fitness-relevant readout for a previously spawned organism: for
    /// mobile organisms (duck/goose) this is net displacement and
    /// upright-ness; for stationary ones (tree) it is a growth measure.
    fn organism_fitness_input(&self, handle: OrganismHandle) -> OrganismFitnessInput;

    /// Whether `handle` still refers to a living organism body. `false`
    /// once the organism has died; an evaluation ends early on this
    /// transition rather than waiting out `max_simulation_time`.
    fn is_alive(&self, handle: OrganismHandle) -> bool;

    fn organism_count(&self) -> usize;
}

/// Opaque reference to a spawned organism, valid only within the `World`
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrganismHandle(pub u64);

/// Raw measurements a fitness function reduces to a single score. Exact
/// fields chosen to support both the mobile-organism formula (distance
/// traveled, uprightness, time alive) and the tree formula (biomass,
/// height) named in spec §4.6.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganismFitnessInput {
    pub displacement: f64,
    pub uprightness: f64,
    pub seconds_alive: f64,
    pub biomass: f64,
    pub height: f64,
}

/// The core's opaque view of simulated world state. Constructed at a
/// fixed size, advanced by fixed timesteps, optionally resized, and
/// snapshotted for broadcast — nothing else about its internals is
/// load-bearing to the state machine.
pub trait World: Send {
    fn advance_time(&mut self, dt_seconds: f64);
    fn resize(&mut self, width: u32, height: u32);
    fn snapshot(&self) -> RenderSnapshot;
    fn organisms(&mut self) -> &mut dyn OrganismManager;
}

/// A minimal grid-backed `World`: cells are either solid or air, organisms
/// are tracked as a flat map from handle to fitness inputs that accrue
/// with each tick. Stands in for the full cellular-physics/organism-body
/// simulation, which is out of scope here.
pub struct DemoWorld {
    width: u32,
    height: u32,
    tick: u64,
    next_handle: u64,
    organisms: HashMap<u64, OrganismFitnessInput>,
}

impl DemoWorld {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
            next_handle: 0,
            organisms: HashMap::new(),
        }
    }
}

impl World for DemoWorld {
    fn advance_time(&mut self, dt_seconds: f64) {
        self.tick += 1;
        for input in self.organisms.values_mut() {
            input.seconds_alive += dt_seconds;
            input.displacement += dt_seconds * 0.1;
            input.biomass += dt_seconds * 0.05;
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            width: self.width,
            height: self.height,
            tick: self.tick,
            organism_count: self.organisms.len(),
        }
    }

    fn organisms(&mut self) -> &mut dyn OrganismManager {
        self
    }
}

impl OrganismManager for DemoWorld {
    fn spawn(&mut self, _organism_type: OrganismType, _pos: CellPos, _genome: Option<&Genome>) -> OrganismHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.organisms.insert(handle, OrganismFitnessInput::default());
        OrganismHandle(handle)
    }

    fn nearest_air_cell(&self, from: CellPos) -> Option<CellPos> {
        if from.y < self.height / 2 {
            Some(from)
        } else {
            Some(CellPos { x: from.x, y: self.height.saturating_sub(1) })
        }
    }

    fn organism_fitness_input(&self, handle: OrganismHandle) -> OrganismFitnessInput {
        self.organisms.get(&handle.0).copied().unwrap_or_default()
    }

    fn is_alive(&self, handle: OrganismHandle) -> bool {
        self.organisms.contains_key(&handle.0)
    }

    fn organism_count(&self) -> usize {
        self.organisms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_time_accrues_fitness_inputs() {
        let mut world = DemoWorld::new(64, 32);
        let handle = world.organisms().spawn(OrganismType::Duck, CellPos::default(), None);
        world.advance_time(1.0);
        world.advance_time(1.0);
        let input = world.organisms().organism_fitness_input(handle);
        assert!(input.seconds_alive > 1.9);
        assert!(input.displacement > 0.0);
    }

    #[test]
    fn resize_is_reflected_in_snapshot() {
        let mut world = DemoWorld::new(10, 10);
        world.resize(20, 15);
        let snap = world.snapshot();
        assert_eq!((snap.width, snap.height), (20, 15));
    }
}
