use mindtrack_core::models::scoring::{RangeBasis, ScoringType};

use crate::ScoringAlgorithm;
use crate::algorithms::weighted::weighted_average;
use crate::contribution::sum_contributions;
use crate::error::ScoringError;
use crate::ranges::match_range;
use crate::scoring::{RawScoreResult, ScoringContext};

/// Scores the response, then files it into the first configured band that
/// contains the score. Falling outside every band is not an error.
pub struct RangeBased;

impl ScoringAlgorithm for RangeBased {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::RangeBased
    }

    fn name(&self) -> &str {
        "Range-Based"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        let answers = &ctx.response.answers;
        let raw_score = match ctx.system.range_basis {
            RangeBasis::SimpleSum => sum_contributions(ctx.book, answers),
            RangeBasis::Weighted => weighted_average(ctx.book, answers),
        };
        Ok(RawScoreResult {
            raw_score,
            range: match_range(raw_score, ctx.book.ranges()).cloned(),
            ..RawScoreResult::default()
        })
    }
}
