//! mindtrack-scoring
//!
//! The questionnaire scoring engine. Pure computation with no storage and no I/O.
//! Turns a response's answers into a raw score using one of seven scoring
//! strategies, then enriches it with population statistics, category and
//! subscale breakdowns, conditional adjustments and the matching score band.

pub mod aggregate;
pub mod algorithms;
pub mod conditions;
pub mod config;
pub mod contribution;
pub mod engine;
pub mod error;
pub mod formula;
pub mod ranges;
pub mod rulebook;
pub mod scoring;
pub mod stats;

use mindtrack_core::models::scoring::ScoringType;
use tracing::warn;

use config::Strictness;
use error::ScoringError;
use scoring::{RawScoreResult, ScoringContext};

/// Trait implemented by each scoring strategy.
pub trait ScoringAlgorithm: Send + Sync {
    /// The scoring type this strategy implements.
    fn scoring_type(&self) -> ScoringType;

    /// Human-readable name (e.g., "Simple Sum", "Z-Score Normalization").
    fn name(&self) -> &str;

    /// Compute the raw score for the response in `ctx`.
    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError>;
}

/// Return all registered strategies.
pub fn all_algorithms() -> Vec<Box<dyn ScoringAlgorithm>> {
    ScoringType::ALL
        .into_iter()
        .filter_map(algorithm_for)
        .collect()
}

/// Look up the strategy for a scoring type. `None` for [`ScoringType::Unknown`].
pub fn algorithm_for(scoring_type: ScoringType) -> Option<Box<dyn ScoringAlgorithm>> {
    let algorithm: Box<dyn ScoringAlgorithm> = match scoring_type {
        ScoringType::SimpleSum => Box::new(algorithms::simple_sum::SimpleSum),
        ScoringType::Weighted => Box::new(algorithms::weighted::Weighted),
        ScoringType::RangeBased => Box::new(algorithms::range_based::RangeBased),
        ScoringType::ZScore => Box::new(algorithms::z_score::ZScore),
        ScoringType::Percentile => Box::new(algorithms::percentile::Percentile),
        ScoringType::Conditional => Box::new(algorithms::conditional::Conditional),
        ScoringType::Custom => Box::new(algorithms::custom::Custom),
        ScoringType::Unknown => return None,
    };
    Some(algorithm)
}

/// Compute the raw score for a response by dispatching on the system's
/// scoring type.
///
/// An unrecognised scoring type scores 0 and logs a configuration warning,
/// unless the engine is configured to reject it.
pub fn compute_raw_score(ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
    match algorithm_for(ctx.system.scoring_type) {
        Some(algorithm) => algorithm.compute(ctx),
        None => match ctx.config.unknown_scoring_type {
            Strictness::Lenient => {
                warn!(
                    system_id = %ctx.system.id,
                    system = %ctx.system.name,
                    "unknown scoring type, scoring as 0"
                );
                Ok(RawScoreResult::raw(0.0))
            }
            Strictness::Strict => Err(ScoringError::UnknownScoringType {
                system_id: ctx.system.id,
            }),
        },
    }
}
