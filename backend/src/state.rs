use crate::db::Db;
use std::path::PathBuf;
use std::sync::Arc;
use zk_prover::artifacts::{CircuitArtifacts, RecordPaths};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub records_dir: PathBuf,
    pub artifacts: Arc<CircuitArtifacts>,
}

impl AppState {
    pub fn new(db: Db, records_dir: PathBuf, artifacts: CircuitArtifacts) -> Self {
        Self {
            db,
            records_dir,
            artifacts: Arc::new(artifacts),
        }
    }

    /// Working files for one record. The caller must have validated the id.
    pub fn record_paths(&self, record_id: &str) -> RecordPaths {
        RecordPaths::new(&self.records_dir, record_id)
    }
}
