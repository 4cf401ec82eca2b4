use std::sync::RwLock;

use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use mindtrack_core::models::score::ResponseScore;

use crate::error::StorageError;
use crate::ledger::Ledger;
use crate::store::ScoreStore;

/// A score store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    ledger: RwLock<Ledger>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        let ledger = self.ledger.read().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl ScoreStore for MemoryScoreStore {
    fn upsert(&self, score: ResponseScore) -> Result<Option<ResponseScore>, StorageError> {
        let mut ledger = self.ledger.write().map_err(|_| StorageError::Poisoned)?;
        ledger.upsert(score)
    }

    fn get(
        &self,
        response_id: ResponseId,
        system_id: ScoringSystemId,
    ) -> Result<Option<ResponseScore>, StorageError> {
        let ledger = self.ledger.read().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.get(response_id, system_id).cloned())
    }

    fn population(
        &self,
        system_id: ScoringSystemId,
        exclude: Option<ResponseId>,
    ) -> Result<Vec<f64>, StorageError> {
        let ledger = self.ledger.read().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.population(system_id, exclude))
    }

    fn scores_for(&self, system_id: ScoringSystemId) -> Result<Vec<ResponseScore>, StorageError> {
        let ledger = self.ledger.read().map_err(|_| StorageError::Poisoned)?;
        Ok(ledger.scores_for(system_id))
    }
}
