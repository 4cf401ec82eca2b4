use mindtrack_core::models::scoring::ScoringType;

use crate::ScoringAlgorithm;
use crate::contribution::sum_contributions;
use crate::error::ScoringError;
use crate::scoring::{RawScoreResult, ScoringContext};
use crate::stats::round2;

/// Simple sum, ranked against the population: the share of recorded scores
/// strictly below it.
pub struct Percentile;

impl ScoringAlgorithm for Percentile {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::Percentile
    }

    fn name(&self) -> &str {
        "Percentile Ranking"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        let raw_score = sum_contributions(ctx.book, &ctx.response.answers);
        Ok(RawScoreResult {
            raw_score,
            percentile: Some(round2(ctx.population.rank_percentile(raw_score))),
            ..RawScoreResult::default()
        })
    }
}
