//! # dirtsim-engine::trainer
//!
//! The evolutionary trainer: the state owned while `ServerState` is
//! `Evolution`, and the tick protocol that advances it one physics step
//! at a time. Grounded on
//! `original_source/apps/src/server/states/Evolution.h`,
//! `EvolutionStart.h`, and `TrainingRunner.h`.

pub mod fitness;
pub mod mutation;
pub mod selection;

use crate::brain::BrainRegistry;
use crate::errors::EngineError;
use crate::genome_repo::GenomeRepository;
use crate::scenario::scenario_for_id;
use crate::world::{DemoWorld, OrganismHandle, World};
use dirtsim_types::genome::Genome;
use dirtsim_types::id::{GenomeId, TrainingSessionId};
use dirtsim_types::scenario::{OrganismType, ScenarioId};
use serde::Serialize;
use dirtsim_types::training::{Candidate, Summary, TrainingResult};
use fitness::FitnessContext;
use mutation::MutationConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

pub const FIXED_TIMESTEP: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy)]
pub struct EvolutionConfig {
    pub population_size: u32,
    pub tournament_size: u32,
    pub max_generations: u32,
    pub max_simulation_time: f64,
    pub energy_reference: f64,
    pub water_reference: f64,
}

#[derive(Debug, Clone)]
pub struct PopulationSpec {
    pub brain_kind: String,
    pub brain_variant: Option<String>,
    pub count: u32,
    pub random_count: u32,
}

#[derive(Debug, Clone)]
pub struct TrainingSpec {
    pub scenario_id: ScenarioId,
    pub organism_type: OrganismType,
    pub population: Vec<PopulationSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingResumePolicy {
    Fresh,
    WarmFromBest,
}

#[derive(Debug, Clone)]
pub struct Individual {
    pub brain_kind: String,
    pub brain_variant: Option<String>,
    pub genome: Option<Genome>,
    pub allows_mutation: bool,
}

struct CurrentEval {
    world: Box<dyn World>,
    organism: OrganismHandle,
    sim_time: f64,
    max_energy: f64,
}

pub enum TickOutcome {
    /// Still evaluating, or between evaluations within the same generation.
    Continue,
    /// A generation boundary was crossed.
    GenerationAdvanced { generation: u32 },
    /// `max_generations` reached; training is over. Carries the final
    /// population's genomes alongside the summary so `TrainingResultSave`
    /// has something to hand the genome repository.
    Finished(TrainingResult, Vec<(GenomeId, Option<Genome>)>),
}

/// Periodic broadcast payload, emitted at each evaluation boundary.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionProgress {
    pub generation: u32,
    pub max_generations: u32,
    pub current_eval: u32,
    pub population_size: u32,
    pub best_fitness_this_gen: f64,
    pub best_fitness_all_time: f64,
    pub average_fitness: f64,
    pub best_genome_id: Option<GenomeId>,
}

pub struct Trainer {
    config: EvolutionConfig,
    mutation: MutationConfig,
    training_spec: TrainingSpec,
    population: Vec<Individual>,
    fitness_scores: Vec<f64>,
    generation: u32,
    current_eval: usize,
    best_fitness_all_time: f64,
    best_fitness_this_gen: f64,
    best_genome_id: Option<GenomeId>,
    current: Option<CurrentEval>,
    cumulative_sim_time: f64,
    training_session_id: TrainingSessionId,
    rng: ChaCha20Rng,
}

impl Trainer {
    pub fn new(
        config: EvolutionConfig,
        mutation: MutationConfig,
        training_spec: TrainingSpec,
        resume_policy: TrainingResumePolicy,
        brain_registry: &BrainRegistry,
        genome_repo: &GenomeRepository,
        seed: u64,
    ) -> Result<Self, EngineError> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut population = Vec::new();
        for spec in &training_spec.population {
            let descriptor = brain_registry
                .lookup(training_spec.organism_type, &spec.brain_kind, spec.brain_variant.as_deref())
                .ok_or_else(|| EngineError::BrainNotFound {
                    organism_type: format!("{:?}", training_spec.organism_type),
                    brain_kind: spec.brain_kind.clone(),
                    brain_variant: spec.brain_variant.clone(),
                })?;
            for i in 0..spec.count {
                let genome = if i < spec.random_count {
                    Some(descriptor.create_random_genome(&mut rng))
                } else {
                    match resume_policy {
                        TrainingResumePolicy::Fresh => Some(descriptor.create_random_genome(&mut rng)),
                        TrainingResumePolicy::WarmFromBest => Some(
                            genome_repo
                                .get_best()
                                .cloned()
                                .unwrap_or_else(|| descriptor.create_random_genome(&mut rng)),
                        ),
                    }
                };
                population.push(Individual {
                    brain_kind: spec.brain_kind.clone(),
                    brain_variant: spec.brain_variant.clone(),
                    genome,
                    allows_mutation: descriptor.allows_mutation,
                });
            }
        }
        let population_len = population.len();
        Ok(Self {
            config,
            mutation,
            training_spec,
            population,
            fitness_scores: vec![0.0; population_len],
            generation: 0,
            current_eval: 0,
            best_fitness_all_time: f64::MIN,
            best_fitness_this_gen: f64::MIN,
            best_genome_id: None,
            current: None,
            cumulative_sim_time: 0.0,
            training_session_id: TrainingSessionId::new(),
            rng,
        })
    }

    pub fn training_session_id(&self) -> TrainingSessionId {
        self.training_session_id
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Drives one outer tick of the tick protocol (spec §4.6). Returns
    /// what, if anything, changed at a generation or training boundary.
    pub fn tick(&mut self, brain_registry: &BrainRegistry) -> Result<TickOutcome, EngineError> {
        if self.current.is_none() {
            self.start_evaluation(brain_registry)?;
        }

        let world_size;
        let organism_died;
        {
            let eval = self.current.as_mut().expect("just started if missing");
            eval.world.advance_time(FIXED_TIMESTEP);
            eval.sim_time += FIXED_TIMESTEP;
            self.cumulative_sim_time += FIXED_TIMESTEP;
            let organisms = eval.world.organisms();
            let input = organisms.organism_fitness_input(eval.organism);
            eval.max_energy = eval.max_energy.max(input.biomass);
            organism_died = !organisms.is_alive(eval.organism);
            let snapshot = eval.world.snapshot();
            world_size = (snapshot.width as f64, snapshot.height as f64);
        }

        // Spec §4.6: an evaluation ends when the organism dies or
        // `max_simulation_time` is reached, whichever comes first.
        let finished = {
            let eval = self.current.as_ref().unwrap();
            organism_died || eval.sim_time >= self.config.max_simulation_time
        };

        if !finished {
            return Ok(TickOutcome::Continue);
        }

        let eval = self.current.take().unwrap();
        let max_energy = eval.max_energy;
        let input = {
            let mut world = eval.world;
            world.organisms().organism_fitness_input(eval.organism)
        };
        let ctx = FitnessContext {
            max_simulation_time: self.config.max_simulation_time,
            world_width: world_size.0,
            world_height: world_size.1,
            energy_reference: self.config.energy_reference,
            water_reference: self.config.water_reference,
        };
        let mut score = fitness::evaluate(self.training_spec.organism_type, &input, &ctx, max_energy);
        if !score.is_finite() {
            score = 0.0;
        }
        self.fitness_scores[self.current_eval] = score;
        self.best_fitness_this_gen = self.best_fitness_this_gen.max(score);
        self.best_fitness_all_time = self.best_fitness_all_time.max(score);
        self.current_eval += 1;

        if self.current_eval < self.population.len() {
            return Ok(TickOutcome::Continue);
        }

        self.advance_generation();
        let generation = self.generation;

        if self.generation >= self.config.max_generations {
            let (result, genomes) = self.finalize();
            return Ok(TickOutcome::Finished(result, genomes));
        }

        Ok(TickOutcome::GenerationAdvanced { generation })
    }

    /// Builds the `EvolutionProgress` broadcast payload for the current moment.
    pub fn progress(&self) -> EvolutionProgress {
        let average_fitness = if self.fitness_scores.is_empty() {
            0.0
        } else {
            self.fitness_scores.iter().sum::<f64>() / self.fitness_scores.len() as f64
        };
        EvolutionProgress {
            generation: self.generation,
            max_generations: self.config.max_generations,
            current_eval: self.current_eval as u32,
            population_size: self.population.len() as u32,
            best_fitness_this_gen: self.best_fitness_this_gen,
            best_fitness_all_time: self.best_fitness_all_time,
            average_fitness,
            best_genome_id: self.best_genome_id,
        }
    }

    fn start_evaluation(&mut self, brain_registry: &BrainRegistry) -> Result<(), EngineError> {
        let individual = &self.population[self.current_eval];
        let scenario = scenario_for_id(self.training_spec.scenario_id).ok_or_else(|| {
            EngineError::ScenarioValidation(self.training_spec.scenario_id.to_string(), "no demo implementation".to_string())
        })?;
        scenario
            .validate()
            .map_err(|message| EngineError::ScenarioValidation(self.training_spec.scenario_id.to_string(), message))?;
        let (width, height) = scenario.world_size();
        let mut world: Box<dyn World> = Box::new(DemoWorld::new(width, height));
        scenario.install(world.as_mut());
        let spawn_pos = scenario.spawn_position(world.as_mut());

        let descriptor = brain_registry
            .lookup(self.training_spec.organism_type, &individual.brain_kind, individual.brain_variant.as_deref())
            .ok_or_else(|| EngineError::BrainNotFound {
                organism_type: format!("{:?}", self.training_spec.organism_type),
                brain_kind: individual.brain_kind.clone(),
                brain_variant: individual.brain_variant.clone(),
            })?;
        if let Some(genome) = &individual.genome {
            if !descriptor.is_genome_compatible(genome) {
                return Err(EngineError::ScenarioValidation(
                    self.training_spec.scenario_id.to_string(),
                    "genome incompatible with brain descriptor".to_string(),
                ));
            }
        }
        let organism = world
            .organisms()
            .spawn(self.training_spec.organism_type, spawn_pos, individual.genome.as_ref());

        let _ = spawn_pos; // recorded for UI display only; not load-bearing here
        self.current = Some(CurrentEval {
            world,
            organism,
            sim_time: 0.0,
            max_energy: 0.0,
        });
        Ok(())
    }

    fn advance_generation(&mut self) {
        let population_size = self.population.len();
        let mut parents = Vec::with_capacity(population_size);
        let mut parent_fitness = Vec::with_capacity(population_size);
        for _ in 0..population_size {
            let idx = selection::tournament_select(&self.fitness_scores, self.config.tournament_size, &mut self.rng);
            parents.push(self.population[idx].clone());
            parent_fitness.push(self.fitness_scores[idx]);
        }

        let mut offspring = Vec::with_capacity(population_size);
        let mut offspring_fitness = Vec::with_capacity(population_size);
        for (parent, &fitness) in parents.iter().zip(parent_fitness.iter()) {
            let mut child = parent.clone();
            if child.allows_mutation {
                if let Some(genome) = &parent.genome {
                    child.genome = Some(mutation::mutate(genome, &self.mutation, &mut self.rng));
                }
            }
            offspring.push(child);
            // Mutation's fitness is unknown until re-evaluated; carry the
            // parent's score forward so elitist replacement can compare
            // generations without re-running the episode early.
            offspring_fitness.push(fitness);
        }

        // Elitism: merge parents and offspring, rank by fitness descending,
        // and keep the top `population_size` — the pool the next
        // generation is evaluated from.
        let merged: Vec<Individual> = parents.into_iter().chain(offspring).collect();
        let kept = selection::elitist_replace_indices(&parent_fitness, &offspring_fitness, population_size);
        self.population = kept.into_iter().map(|idx| merged[idx].clone()).collect();
        self.fitness_scores = vec![0.0; population_size];
        self.current_eval = 0;
        self.best_fitness_this_gen = f64::MIN;
        self.generation += 1;
    }

    fn finalize(&self) -> (TrainingResult, Vec<(GenomeId, Option<Genome>)>) {
        let summary = Summary {
            training_session_id: self.training_session_id,
            scenario_id: self.training_spec.scenario_id,
            organism_type: self.training_spec.organism_type,
            population_size: self.population.len() as u32,
            max_generations: self.config.max_generations,
            completed_generations: self.generation,
            best_fitness: self.best_fitness_all_time.max(0.0),
            average_fitness: if self.fitness_scores.is_empty() {
                0.0
            } else {
                self.fitness_scores.iter().sum::<f64>() / self.fitness_scores.len() as f64
            },
            total_training_seconds: self.cumulative_sim_time,
            primary_brain_kind: self
                .training_spec
                .population
                .first()
                .map(|p| p.brain_kind.clone())
                .unwrap_or_default(),
            primary_brain_variant: self.training_spec.population.first().and_then(|p| p.brain_variant.clone()),
        };
        let mut genomes = Vec::with_capacity(self.population.len());
        let candidates = self
            .population
            .iter()
            .zip(self.fitness_scores.iter())
            .map(|(individual, &fitness)| {
                let id = GenomeId::new();
                genomes.push((id, individual.genome.clone()));
                Candidate {
                    id,
                    fitness,
                    brain_kind: individual.brain_kind.clone(),
                    brain_variant: individual.brain_variant.clone(),
                    generation: self.generation,
                }
            })
            .collect();
        (TrainingResult { summary, candidates }, genomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::BrainRegistry;
    use crate::genome_repo::GenomeRepository;

    fn config() -> (EvolutionConfig, MutationConfig) {
        (
            EvolutionConfig {
                population_size: 4,
                tournament_size: 2,
                max_generations: 1,
                max_simulation_time: FIXED_TIMESTEP * 2.0,
                energy_reference: 1.0,
                water_reference: 1.0,
            },
            MutationConfig { rate: 0.1, sigma: 0.1, reset_rate: 0.01 },
        )
    }

    fn training_spec() -> TrainingSpec {
        TrainingSpec {
            scenario_id: ScenarioId::Sandbox,
            organism_type: OrganismType::Duck,
            population: vec![PopulationSpec {
                brain_kind: "feedforward".to_string(),
                brain_variant: None,
                count: 4,
                random_count: 4,
            }],
        }
    }

    #[test]
    fn a_full_tiny_training_run_finishes_and_reports_candidates() {
        let (config, mutation) = config();
        let registry = BrainRegistry::with_demo_brains();
        let repo = GenomeRepository::new();
        let mut trainer = Trainer::new(config, mutation, training_spec(), TrainingResumePolicy::Fresh, &registry, &repo, 42).unwrap();

        let mut result = None;
        for _ in 0..2000 {
            match trainer.tick(&registry).unwrap() {
                TickOutcome::Finished(r, genomes) => {
                    assert_eq!(genomes.len(), r.candidates.len());
                    result = Some(r);
                    break;
                }
                _ => continue,
            }
        }
        let result = result.expect("training should finish within the tick budget");
        assert_eq!(result.candidates.len(), 4);
        assert_eq!(result.summary.completed_generations, 1);
    }

    #[test]
    fn brain_lookup_miss_is_reported_before_any_evaluation_starts() {
        let (config, mutation) = config();
        let registry = BrainRegistry::new();
        let repo = GenomeRepository::new();
        let result = Trainer::new(config, mutation, training_spec(), TrainingResumePolicy::Fresh, &registry, &repo, 1);
        assert!(result.is_err());
    }
}
