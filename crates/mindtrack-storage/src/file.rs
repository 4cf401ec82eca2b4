use std::path::PathBuf;
use std::sync::Mutex;

use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use mindtrack_core::models::score::ResponseScore;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::json::{read_json, write_json_atomic};
use crate::ledger::Ledger;
use crate::store::ScoreStore;

/// A score store backed by a JSON ledger file.
///
/// The whole ledger is held in memory and rewritten (tmp + rename) on every
/// upsert. The in-memory copy only changes once the write has succeeded, so a
/// failed write leaves both the file and the store as they were.
#[derive(Debug)]
pub struct JsonFileScoreStore {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl JsonFileScoreStore {
    /// Open the ledger at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let ledger = match read_json::<Ledger>(&path) {
            Ok(ledger) => {
                ledger.check_version()?;
                info!(path = %path.display(), scores = ledger.len(), "opened score ledger");
                ledger
            }
            Err(StorageError::NotFound { .. }) => {
                debug!(path = %path.display(), "no score ledger yet, starting empty");
                Ledger::default()
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
        })
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn upsert(&self, score: ResponseScore) -> Result<Option<ResponseScore>, StorageError> {
        let mut ledger = self.ledger.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = ledger.clone();
        let replaced = next.upsert(score)?;
        write_json_atomic(&self.path, &next)?;
        *ledger = next;
        Ok(replaced)
    }

    fn get(
        &self,
        response_id: ResponseId,
        system_id: ScoringSystemId,
    ) -> Result<Option<ResponseScore>, StorageError> {
        let ledger = self.ledger.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.get(response_id, system_id).cloned())
    }

    fn population(
        &self,
        system_id: ScoringSystemId,
        exclude: Option<ResponseId>,
    ) -> Result<Vec<f64>, StorageError> {
        let ledger = self.ledger.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.population(system_id, exclude))
    }

    fn scores_for(&self, system_id: ScoringSystemId) -> Result<Vec<ResponseScore>, StorageError> {
        let ledger = self.ledger.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.scores_for(system_id))
    }
}
