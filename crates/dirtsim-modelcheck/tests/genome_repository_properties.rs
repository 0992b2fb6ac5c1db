//! Property tests over `dirtsim-engine::genome_repo::GenomeRepository`'s
//! bookkeeping invariants: the "best" pointer never outlives the genome
//! it names, and `list()` always matches what's actually stored.

use dirtsim_engine::genome_repo::GenomeRepository;
use dirtsim_types::genome::{Genome, GenomeMetadata};
use dirtsim_types::id::{GenomeId, TrainingSessionId};
use dirtsim_types::scenario::{OrganismType, ScenarioId};
use proptest::prelude::*;

fn metadata(fitness: f64, generation: u32) -> GenomeMetadata {
    GenomeMetadata {
        display_name: "probe".to_string(),
        fitness,
        robust_eval_count: 1,
        generation,
        scenario_id: ScenarioId::Sandbox,
        organism_type: OrganismType::Duck,
        brain_kind: "feedforward".to_string(),
        brain_variant: None,
        created_at: chrono::Utc::now(),
        training_session_id: TrainingSessionId::new(),
        notes: None,
    }
}

proptest! {
    #[test]
    fn list_len_always_matches_stored_minus_removed(
        fitnesses in prop::collection::vec(-10.0f64..10.0, 0..16),
        remove_every_other in any::<bool>(),
    ) {
        let mut repo = GenomeRepository::new();
        let mut ids = Vec::new();
        for (i, fitness) in fitnesses.iter().enumerate() {
            let id = GenomeId::new();
            repo.store(id, Genome::new(vec![0.0]), metadata(*fitness, i as u32));
            ids.push(id);
        }

        let mut removed = 0;
        for (i, id) in ids.iter().enumerate() {
            if remove_every_other && i % 2 == 0 {
                repo.remove(*id);
                removed += 1;
            }
        }

        prop_assert_eq!(repo.list().len(), ids.len() - removed);
    }

    #[test]
    fn removing_the_best_always_clears_the_pointer(
        fitnesses in prop::collection::vec(-10.0f64..10.0, 1..16),
        best_index in 0usize..16,
    ) {
        let mut repo = GenomeRepository::new();
        let mut ids = Vec::new();
        for (i, fitness) in fitnesses.iter().enumerate() {
            let id = GenomeId::new();
            repo.store(id, Genome::new(vec![0.0]), metadata(*fitness, i as u32));
            ids.push(id);
        }
        let best_index = best_index % ids.len();
        repo.mark_as_best(ids[best_index]);
        prop_assert_eq!(repo.get_best_id(), Some(ids[best_index]));

        repo.remove(ids[best_index]);
        prop_assert_eq!(repo.get_best_id(), None);
        prop_assert!(repo.get_best().is_none());
    }

    #[test]
    fn marking_an_unknown_id_as_best_never_changes_the_pointer(
        fitnesses in prop::collection::vec(-10.0f64..10.0, 0..8),
    ) {
        let mut repo = GenomeRepository::new();
        for (i, fitness) in fitnesses.iter().enumerate() {
            repo.store(GenomeId::new(), Genome::new(vec![0.0]), metadata(*fitness, i as u32));
        }
        let before = repo.get_best_id();
        let unknown = GenomeId::new();
        prop_assert!(!repo.mark_as_best(unknown));
        prop_assert_eq!(repo.get_best_id(), before);
    }

    #[test]
    fn clear_always_empties_the_repository(
        fitnesses in prop::collection::vec(-10.0f64..10.0, 0..8),
    ) {
        let mut repo = GenomeRepository::new();
        for (i, fitness) in fitnesses.iter().enumerate() {
            let id = GenomeId::new();
            repo.store(id, Genome::new(vec![0.0]), metadata(*fitness, i as u32));
            repo.mark_as_best(id);
        }
        repo.clear();
        prop_assert!(repo.list().is_empty());
        prop_assert_eq!(repo.get_best_id(), None);
    }
}
