use mindtrack_core::models::scoring::ScoringType;

use crate::ScoringAlgorithm;
use crate::contribution::sum_contributions;
use crate::error::ScoringError;
use crate::scoring::{RawScoreResult, ScoringContext};
use crate::stats::round2;

/// Simple sum, reported with its distance from the population mean in
/// standard deviations.
pub struct ZScore;

impl ScoringAlgorithm for ZScore {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::ZScore
    }

    fn name(&self) -> &str {
        "Z-Score Normalization"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        let raw_score = sum_contributions(ctx.book, &ctx.response.answers);
        let (mean, std_dev) = ctx.population.moments();
        Ok(RawScoreResult {
            raw_score,
            z_score: Some(round2((raw_score - mean) / std_dev)),
            mean: Some(mean),
            std_dev: Some(std_dev),
            ..RawScoreResult::default()
        })
    }
}
