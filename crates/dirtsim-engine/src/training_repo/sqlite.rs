use super::TrainingResultRepository;
use dirtsim_types::id::TrainingSessionId;
use dirtsim_types::training::{Candidate, TrainingResultRecord};
use rusqlite::{params, Connection};

const SCHEMA_VERSION: i64 = 1;

/// Durable backend, used when `ServerConfig::training_result_db_path` is
/// set. Schema: one row per training session plus a single-row
/// `schema_version` table so a future migration has somewhere to check.
pub struct SqliteTrainingResultRepository {
    conn: Connection,
}

impl SqliteTrainingResultRepository {
    pub fn open(path: &str) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| e.to_string())?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| e.to_string())?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, String> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
             CREATE TABLE IF NOT EXISTS training_results (
                 training_session_id TEXT PRIMARY KEY,
                 summary_json        TEXT NOT NULL,
                 candidates_json     TEXT NOT NULL,
                 candidate_count     INTEGER NOT NULL,
                 created_at          INTEGER NOT NULL
             );",
        )
        .map_err(|e| e.to_string())?;
        let version: Option<i64> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .ok();
        if version.is_none() {
            conn.execute("INSERT INTO schema_version (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|e| e.to_string())?;
        }
        Ok(Self { conn })
    }

    fn row_to_record(
        summary_json: String,
        candidates_json: String,
        created_at: i64,
    ) -> Result<TrainingResultRecord, String> {
        let summary = serde_json::from_str(&summary_json).map_err(|e| e.to_string())?;
        let candidates: Vec<Candidate> = serde_json::from_str(&candidates_json).map_err(|e| e.to_string())?;
        let created_at = chrono::DateTime::from_timestamp(created_at, 0)
            .ok_or_else(|| "created_at out of range".to_string())?;
        Ok(TrainingResultRecord {
            result: dirtsim_types::training::TrainingResult { summary, candidates },
            created_at,
        })
    }
}

impl TrainingResultRepository for SqliteTrainingResultRepository {
    fn save(&mut self, record: TrainingResultRecord) -> Result<(), String> {
        let summary_json = serde_json::to_string(&record.result.summary).map_err(|e| e.to_string())?;
        let candidates_json = serde_json::to_string(&record.result.candidates).map_err(|e| e.to_string())?;
        self.conn
            .execute(
                "INSERT INTO training_results
                     (training_session_id, summary_json, candidates_json, candidate_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(training_session_id) DO UPDATE SET
                     summary_json = excluded.summary_json,
                     candidates_json = excluded.candidates_json,
                     candidate_count = excluded.candidate_count,
                     created_at = excluded.created_at",
                params![
                    record.result.summary.training_session_id.0.to_string(),
                    summary_json,
                    candidates_json,
                    record.result.candidates.len() as i64,
                    record.created_at.timestamp(),
                ],
            )
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn get(&self, training_session_id: TrainingSessionId) -> Result<Option<TrainingResultRecord>, String> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT summary_json, candidates_json, created_at
                 FROM training_results WHERE training_session_id = ?1",
            )
            .map_err(|e| e.to_string())?;
        let row = stmt
            .query_row(params![training_session_id.0.to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })
            .ok();
        match row {
            Some((summary_json, candidates_json, created_at)) => {
                Self::row_to_record(summary_json, candidates_json, created_at).map(Some)
            }
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<TrainingResultRecord>, String> {
        let mut stmt = self
            .conn
            .prepare("SELECT summary_json, candidates_json, created_at FROM training_results ORDER BY created_at DESC")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })
            .map_err(|e| e.to_string())?;
        let mut out = Vec::new();
        for row in rows {
            let (summary_json, candidates_json, created_at) = row.map_err(|e| e.to_string())?;
            out.push(Self::row_to_record(summary_json, candidates_json, created_at)?);
        }
        Ok(out)
    }

    fn delete(&mut self, training_session_id: TrainingSessionId) -> Result<bool, String> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM training_results WHERE training_session_id = ?1",
                params![training_session_id.0.to_string()],
            )
            .map_err(|e| e.to_string())?;
        Ok(affected > 0)
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
                    scenario_id: ScenarioId::TreeGermination,
                    organism_type: OrganismType::Tree,
                    population_size: 6,
                    max_generations: 5,
                    completed_generations: 5,
                    best_fitness: 1.5,
                    average_fitness: 0.8,
                    total_training_seconds: 3.0,
                    primary_brain_kind: "growth".to_string(),
                    primary_brain_variant: None,
                },
                candidates: Vec::new(),
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn save_then_get_round_trips_through_json_columns() {
        let mut repo = SqliteTrainingResultRepository::open_in_memory().unwrap();
        let record = record();
        let id = record.result.summary.training_session_id;
        repo.save(record.clone()).unwrap();
        let fetched = repo.get(id).unwrap().unwrap();
        assert_eq!(fetched.result.summary.best_fitness, record.result.summary.best_fitness);
    }

    #[test]
    fn save_upserts_on_conflicting_session_id() {
        let mut repo = SqliteTrainingResultRepository::open_in_memory().unwrap();
        let mut record = record();
        let id = record.result.summary.training_session_id;
        repo.save(record.clone()).unwrap();
        record.result.summary.best_fitness = 9.9;
        repo.save(record).unwrap();
        assert_eq!(repo.list().unwrap().len(), 1);
        assert_eq!(repo.get(id).unwrap().unwrap().result.summary.best_fitness, 9.9);
    }
}
