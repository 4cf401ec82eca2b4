//! The score ledger: every persisted score, in first-scored order.

use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use mindtrack_core::models::score::ResponseScore;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Current on-disk ledger format.
pub const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub ledger_version: u32,
    #[serde(default)]
    pub scores: Vec<ResponseScore>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            ledger_version: LEDGER_VERSION,
            scores: Vec::new(),
        }
    }
}

impl Ledger {
    /// Reject ledgers written by a newer build.
    pub fn check_version(&self) -> Result<(), StorageError> {
        if self.ledger_version > LEDGER_VERSION {
            return Err(StorageError::UnsupportedLedgerVersion {
                found: self.ledger_version,
                supported: LEDGER_VERSION,
            });
        }
        Ok(())
    }

    /// Insert or overwrite the score for its (response, scoring system) pair.
    /// An overwritten score keeps its position. Returns the score replaced.
    ///
    /// Scores carrying NaN or an infinity are refused: they would be written
    /// as `null` and the ledger could no longer be read back.
    pub fn upsert(&mut self, score: ResponseScore) -> Result<Option<ResponseScore>, StorageError> {
        if let Some(field) = score.non_finite_field() {
            return Err(StorageError::NonFiniteScore {
                response_id: score.response_id,
                system_id: score.scoring_system_id,
                field,
            });
        }
        let key = score.key();
        match self.scores.iter_mut().find(|s| s.key() == key) {
            Some(existing) => Ok(Some(std::mem::replace(existing, score))),
            None => {
                self.scores.push(score);
                Ok(None)
            }
        }
    }

    pub fn get(
        &self,
        response_id: ResponseId,
        system_id: ScoringSystemId,
    ) -> Option<&ResponseScore> {
        self.scores
            .iter()
            .find(|s| s.key() == (response_id, system_id))
    }

    /// Raw scores recorded for a scoring system, optionally leaving one
    /// response out.
    pub fn population(&self, system_id: ScoringSystemId, exclude: Option<ResponseId>) -> Vec<f64> {
        self.scores
            .iter()
            .filter(|s| s.scoring_system_id == system_id && Some(s.response_id) != exclude)
            .map(|s| s.raw_score)
            .collect()
    }

    pub fn scores_for(&self, system_id: ScoringSystemId) -> Vec<ResponseScore> {
        self.scores
            .iter()
            .filter(|s| s.scoring_system_id == system_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
