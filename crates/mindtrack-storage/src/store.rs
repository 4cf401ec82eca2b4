use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use mindtrack_core::models::score::ResponseScore;

use crate::error::StorageError;

/// Where scores are persisted. One score per (response, scoring system).
pub trait ScoreStore: Send + Sync {
    /// Insert or overwrite atomically. Returns the score that was replaced.
    fn upsert(&self, score: ResponseScore) -> Result<Option<ResponseScore>, StorageError>;

    fn get(
        &self,
        response_id: ResponseId,
        system_id: ScoringSystemId,
    ) -> Result<Option<ResponseScore>, StorageError>;

    /// Raw scores already recorded for `system_id`, without the score of
    /// `exclude` if one is given.
    fn population(
        &self,
        system_id: ScoringSystemId,
        exclude: Option<ResponseId>,
    ) -> Result<Vec<f64>, StorageError>;

    /// Every score recorded for `system_id`, in ledger order.
    fn scores_for(&self, system_id: ScoringSystemId) -> Result<Vec<ResponseScore>, StorageError>;
}
