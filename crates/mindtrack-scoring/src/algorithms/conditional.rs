use mindtrack_core::models::scoring::ScoringType;

use crate::ScoringAlgorithm;
use crate::conditions::evaluate_rules;
use crate::contribution::sum_contributions;
use crate::error::ScoringError;
use crate::scoring::{RawScoreResult, ScoringContext};

/// Simple sum plus whatever each rule's conditional logic adds.
pub struct Conditional;

impl ScoringAlgorithm for Conditional {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::Conditional
    }

    fn name(&self) -> &str {
        "Conditional Logic"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        let base = sum_contributions(ctx.book, &ctx.response.answers);
        let adjustments = evaluate_rules(ctx.book, ctx.response, ctx.config.max_condition_depth);
        let delta: f64 = adjustments.iter().map(|a| a.adjustment).sum();
        Ok(RawScoreResult {
            raw_score: base + delta,
            adjustments,
            ..RawScoreResult::default()
        })
    }
}
