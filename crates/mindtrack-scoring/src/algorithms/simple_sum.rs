use mindtrack_core::models::scoring::ScoringType;

use crate::ScoringAlgorithm;
use crate::contribution::sum_contributions;
use crate::error::ScoringError;
use crate::scoring::{RawScoreResult, ScoringContext};

/// Unweighted sum of every scored answer.
pub struct SimpleSum;

impl ScoringAlgorithm for SimpleSum {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::SimpleSum
    }

    fn name(&self) -> &str {
        "Simple Sum"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        Ok(RawScoreResult::raw(sum_contributions(ctx.book, &ctx.response.answers)))
    }
}
