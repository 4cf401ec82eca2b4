use mindtrack_core::models::response::Response;
use mindtrack_core::models::score::{ConditionalAdjustment, FormulaOutcome};
use mindtrack_core::models::scoring::{ScoreRange, ScoringSystem};

use crate::config::EngineConfig;
use crate::rulebook::RuleBook;
use crate::stats::Population;

/// Everything a strategy may read while scoring one response.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub system: &'a ScoringSystem,
    pub book: &'a RuleBook,
    pub response: &'a Response,
    /// Raw scores already recorded for this scoring system, the response
    /// being scored excluded.
    pub population: &'a Population,
    pub config: &'a EngineConfig,
}

/// The output of a scoring strategy: the raw score plus whatever metadata the
/// strategy produced on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawScoreResult {
    pub raw_score: f64,
    pub range: Option<ScoreRange>,
    pub z_score: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub percentile: Option<f64>,
    pub adjustments: Vec<ConditionalAdjustment>,
    pub formula: Option<FormulaOutcome>,
}

impl RawScoreResult {
    pub fn raw(raw_score: f64) -> Self {
        Self {
            raw_score,
            ..Self::default()
        }
    }
}
