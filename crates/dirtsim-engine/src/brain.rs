//! # dirtsim-engine::brain
//!
//! The brain registry: a lookup table from `(organism_type, brain_kind,
//! brain_variant)` to a factory that can spawn a controller and, for
//! trainable brains, create a fresh random genome of the right shape.
//! Grounded on `original_source/dirtsim/src/core/organisms/evolution/TrainingBrainRegistry.h`.

use dirtsim_types::genome::Genome;
use dirtsim_types::scenario::OrganismType;
use rand::Rng;
use std::collections::HashMap;

/// Whether an organism's controller is driven by a trainable genome or is
/// fixed (scripted, player-controlled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Genome,
    Fixed,
}

/// One entry in the registry: the shape a genome must have to be
/// compatible, and whether the trainer is allowed to mutate it.
pub struct BrainDescriptor {
    pub organism_type: OrganismType,
    pub brain_kind: String,
    pub brain_variant: Option<String>,
    pub genome_len: usize,
    pub control_mode: ControlMode,
    pub allows_mutation: bool,
}

impl BrainDescriptor {
    pub fn requires_genome(&self) -> bool {
        matches!(self.control_mode, ControlMode::Genome)
    }

    pub fn is_genome_compatible(&self, genome: &Genome) -> bool {
        !self.requires_genome() || genome.len() == self.genome_len
    }

    pub fn create_random_genome(&self, rng: &mut impl Rng) -> Genome {
        let weights = (0..self.genome_len).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Genome::new(weights)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BrainKey {
    organism_type: OrganismType,
    brain_kind: String,
    brain_variant: Option<String>,
}

/// Keyed lookup from `(organism_type, brain_kind, brain_variant)` to a
/// descriptor. Populated once at startup with every brain the demo world
/// supports; a real deployment would register one entry per compiled
/// controller.
pub struct BrainRegistry {
    entries: HashMap<BrainKey, BrainDescriptor>,
}

impl BrainRegistry {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn register(&mut self, descriptor: BrainDescriptor) -> &mut Self {
        let key = BrainKey {
            organism_type: descriptor.organism_type,
            brain_kind: descriptor.brain_kind.clone(),
            brain_variant: descriptor.brain_variant.clone(),
        };
        self.entries.insert(key, descriptor);
        self
    }

    pub fn lookup(
        &self,
        organism_type: OrganismType,
        brain_kind: &str,
        brain_variant: Option<&str>,
    ) -> Option<&BrainDescriptor> {
        let key = BrainKey {
            organism_type,
            brain_kind: brain_kind.to_string(),
            brain_variant: brain_variant.map(str::to_string),
        };
        self.entries.get(&key)
    }

    /// The default demo brain set: one trainable feedforward controller
    /// per organism type, genome length chosen arbitrarily to exercise
    /// mutation without costing much to evaluate in tests.
    pub fn with_demo_brains() -> Self {
        let mut registry = Self::new();
        registry
            .register(BrainDescriptor {
                organism_type: OrganismType::Duck,
                brain_kind: "feedforward".to_string(),
                brain_variant: None,
                genome_len: 24,
                control_mode: ControlMode::Genome,
                allows_mutation: true,
            })
            .register(BrainDescriptor {
                organism_type: OrganismType::Goose,
                brain_kind: "feedforward".to_string(),
                brain_variant: None,
                genome_len: 24,
                control_mode: ControlMode::Genome,
                allows_mutation: true,
            })
            .register(BrainDescriptor {
                organism_type: OrganismType::Tree,
                brain_kind: "growth".to_string(),
                brain_variant: None,
                genome_len: 12,
                control_mode: ControlMode::Genome,
                allows_mutation: true,
            });
        registry
    }
}

impl Default for BrainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_registered_demo_brain() {
        let registry = BrainRegistry::with_demo_brains();
        let descriptor = registry.lookup(OrganismType::Duck, "feedforward", None).unwrap();
        assert_eq!(descriptor.genome_len, 24);
        assert!(descriptor.allows_mutation);
    }

    #[test]
    fn lookup_misses_unknown_variant() {
        let registry = BrainRegistry::with_demo_brains();
        assert!(registry.lookup(OrganismType::Duck, "feedforward", Some("exotic")).is_none());
    }

    #[test]
    fn random_genome_matches_declared_length() {
        let registry = BrainRegistry::with_demo_brains();
        let descriptor = registry.lookup(OrganismType::Tree, "growth", None).unwrap();
        let mut rng = rand::thread_rng();
        let genome = descriptor.create_random_genome(&mut rng);
        assert!(descriptor.is_genome_compatible(&genome));
    }
}
