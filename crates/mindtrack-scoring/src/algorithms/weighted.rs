use mindtrack_core::models::response::Answer;
use mindtrack_core::models::scoring::ScoringType;

use crate::ScoringAlgorithm;
use crate::contribution::scored_answers;
use crate::error::ScoringError;
use crate::rulebook::RuleBook;
use crate::scoring::{RawScoreResult, ScoringContext};

/// Weighted average of scored answers, using each rule's weight.
pub struct Weighted;

impl ScoringAlgorithm for Weighted {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::Weighted
    }

    fn name(&self) -> &str {
        "Weighted Average"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        Ok(RawScoreResult::raw(weighted_average(ctx.book, &ctx.response.answers)))
    }
}

/// Σ(contribution × weight) / Σ(weight) over answers with a rule. A total
/// weight of zero or less yields 0.
pub fn weighted_average(book: &RuleBook, answers: &[Answer]) -> f64 {
    let (weighted_sum, total_weight) = scored_answers(book, answers)
        .fold((0.0, 0.0), |(sum, weight), (rule, score)| {
            (sum + score * rule.weight, weight + rule.weight)
        });
    if total_weight <= 0.0 {
        return 0.0;
    }
    weighted_sum / total_weight
}
