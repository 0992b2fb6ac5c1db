//! # dirtsim-engine::genome_repo
//!
//! An in-memory catalog of saved genomes plus a "best" pointer, grounded
//! on `original_source/dirtsim/src/core/organisms/evolution/GenomeRepository.h`.
//! Training results flow here on `GenomeSet`/save; the UI's genome
//! browser reads it back through `GenomeList/Get/GetBest`.

use dirtsim_types::genome::{Genome, GenomeMetadata, GenomeRecord};
use dirtsim_types::id::GenomeId;
use indexmap::IndexMap;

#[derive(Default)]
pub struct GenomeRepository {
    entries: IndexMap<GenomeId, (Genome, GenomeMetadata)>,
    best: Option<GenomeId>,
}

impl GenomeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, id: GenomeId, genome: Genome, metadata: GenomeMetadata) {
        self.entries.insert(id, (genome, metadata));
    }

    pub fn exists(&self, id: GenomeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: GenomeId) -> Option<&Genome> {
        self.entries.get(&id).map(|(genome, _)| genome)
    }

    pub fn get_metadata(&self, id: GenomeId) -> Option<&GenomeMetadata> {
        self.entries.get(&id).map(|(_, metadata)| metadata)
    }

    pub fn list(&self) -> Vec<GenomeRecord> {
        self.entries
            .iter()
            .map(|(id, (genome, metadata))| GenomeRecord {
                id: *id,
                genome: genome.clone(),
                metadata: metadata.clone(),
            })
            .collect()
    }

    pub fn remove(&mut self, id: GenomeId) -> bool {
        let removed = self.entries.shift_remove(id).is_some();
        if removed && self.best == Some(id) {
            self.best = None;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.best = None;
    }

    /// Marks `id` as the repository's best genome. No-op if `id` isn't stored.
    pub fn mark_as_best(&mut self, id: GenomeId) -> bool {
        if self.entries.contains_key(&id) {
            self.best = Some(id);
            true
        } else {
            false
        }
    }

    pub fn get_best_id(&self) -> Option<GenomeId> {
        self.best
    }

    pub fn get_best(&self) -> Option<&Genome> {
        self.best.and_then(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtsim_types::id::TrainingSessionId;
    use dirtsim_types::scenario::{OrganismType, ScenarioId};

    fn metadata(fitness: f64) -> GenomeMetadata {
        GenomeMetadata {
            display_name: "test".to_string(),
            fitness,
            robust_eval_count: 1,
            generation: 0,
            scenario_id: ScenarioId::Sandbox,
            organism_type: OrganismType::Duck,
            brain_kind: "feedforward".to_string(),
            brain_variant: None,
            created_at: chrono::Utc::now(),
            training_session_id: TrainingSessionId::new(),
            notes: None,
        }
    }

    #[test]
    fn mark_as_best_requires_existing_entry() {
        let mut repo = GenomeRepository::new();
        let id = GenomeId::new();
        assert!(!repo.mark_as_best(id));
        repo.store(id, Genome::new(vec![0.0]), metadata(1.0));
        assert!(repo.mark_as_best(id));
        assert_eq!(repo.get_best_id(), Some(id));
    }

    #[test]
    fn removing_the_best_clears_the_pointer() {
        let mut repo = GenomeRepository::new();
        let id = GenomeId::new();
        repo.store(id, Genome::new(vec![0.0]), metadata(1.0));
        repo.mark_as_best(id);
        repo.remove(id);
        assert_eq!(repo.get_best_id(), None);
        assert!(repo.get_best().is_none());
    }

    #[test]
    fn list_reflects_all_stored_entries() {
        let mut repo = GenomeRepository::new();
        for _ in 0..3 {
            repo.store(GenomeId::new(), Genome::new(vec![0.0]), metadata(1.0));
        }
        assert_eq!(repo.list().len(), 3);
    }
}
