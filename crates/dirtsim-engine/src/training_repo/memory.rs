use super::TrainingResultRepository;
use dirtsim_types::id::TrainingSessionId;
use dirtsim_types::training::TrainingResultRecord;
use indexmap::IndexMap;

/// Ephemeral backend: lives only as long as the Server process. Used by
/// default unless `ServerConfig::training_result_db_path` is set.
#[derive(Default)]
pub struct MemoryTrainingResultRepository {
    records: IndexMap<TrainingSessionId, TrainingResultRecord>,
}

impl MemoryTrainingResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrainingResultRepository for MemoryTrainingResultRepository {
    fn save(&mut self, record: TrainingResultRecord) -> Result<(), String> {
        self.records.insert(record.result.summary.training_session_id, record);
        Ok(())
    }

    fn get(&self, training_session_id: TrainingSessionId) -> Result<Option<TrainingResultRecord>, String> {
        Ok(self.records.get(&training_session_id).cloned())
    }

    fn list(&self) -> Result<Vec<TrainingResultRecord>, String> {
        Ok(self.records.values().cloned().collect())
    }

    fn delete(&mut self, training_session_id: TrainingSessionId) -> Result<bool, String> {
        Ok(self.records.shift_remove(&training_session_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirtsim_types::scenario::{OrganismType, ScenarioId};
    use dirtsim_types::training::{Summary, TrainingResult};

    fn record() -> TrainingResultRecord {
        TrainingResultRecord {
            result: TrainingResult {
                summary: Summary {
                    training_session_id: TrainingSessionId::new(),
                    scenario_id: ScenarioId::DuckPond,
                    organism_type: OrganismType::Duck,
                    population_size: 8,
                    max_generations: 10,
                    completed_generations: 10,
                    best_fitness: 4.2,
                    average_fitness: 2.1,
                    total_training_seconds: 12.0,
                    primary_brain_kind: "feedforward".to_string(),
                    primary_brain_variant: None,
                },
                candidates: Vec::new(),
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let mut repo = MemoryTrainingResultRepository::new();
        let record = record();
        let id = record.result.summary.training_session_id;
        repo.save(record.clone()).unwrap();
        assert_eq!(repo.get(id).unwrap(), Some(record));
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let mut repo = MemoryTrainingResultRepository::new();
        let record = record();
        let id = record.result.summary.training_session_id;
        assert!(!repo.delete(id).unwrap());
        repo.save(record).unwrap();
        assert!(repo.delete(id).unwrap());
        assert!(repo.get(id).unwrap().is_none());
    }
}
