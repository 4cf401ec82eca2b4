use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ChoiceId, QuestionId, QuestionnaireId, RangeId, RuleId, ScoringSystemId};

/// The strategy a scoring system uses to turn a response into a raw score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringType {
    /// Unweighted sum of per-answer contributions.
    SimpleSum,
    /// Weighted average of per-answer contributions.
    Weighted,
    /// Raw score tagged with the configured band it falls into.
    RangeBased,
    /// Standard deviations from the population mean.
    ZScore,
    /// Share of the population scoring strictly lower.
    Percentile,
    /// Simple sum adjusted by decision-tree rules.
    Conditional,
    /// User-authored arithmetic formula.
    Custom,
    /// A type string this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl ScoringType {
    pub const ALL: [ScoringType; 7] = [
        Self::SimpleSum,
        Self::Weighted,
        Self::RangeBased,
        Self::ZScore,
        Self::Percentile,
        Self::Conditional,
        Self::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimpleSum => "simple_sum",
            Self::Weighted => "weighted",
            Self::RangeBased => "range_based",
            Self::ZScore => "z_score",
            Self::Percentile => "percentile",
            Self::Conditional => "conditional",
            Self::Custom => "custom",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which raw computation a range-based system bands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBasis {
    #[default]
    SimpleSum,
    Weighted,
}

/// A configured scoring strategy attached to one questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoringSystem {
    pub id: ScoringSystemId,
    pub questionnaire_id: QuestionnaireId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[ts(type = "string")]
    pub scoring_type: ScoringType,
    /// Only read by the custom strategy.
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    #[ts(type = "string")]
    pub range_basis: RangeBasis,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
}

/// Per-question scoring configuration within a scoring system.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreRule {
    pub id: RuleId,
    pub scoring_system_id: ScoringSystemId,
    pub question_id: QuestionId,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub text_score_enabled: bool,
    #[serde(default)]
    pub text_score: f64,
    /// Decision tree or flat condition list. Kept as raw JSON: authored by
    /// hand in admin tooling, so it is parsed leniently at evaluation time.
    #[serde(default)]
    pub conditional_logic: Option<serde_json::Value>,
}

/// Points awarded when a specific choice is selected.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OptionScore {
    pub rule_id: RuleId,
    pub choice_id: ChoiceId,
    pub score: f64,
}

/// A labelled band of raw scores. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreRange {
    pub id: RangeId,
    pub scoring_system_id: ScoringSystemId,
    pub name: String,
    pub min_score: f64,
    pub max_score: f64,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub interpretation: String,
}

impl ScoreRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min_score <= value && value <= self.max_score
    }
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

fn default_color() -> String {
    "#3498db".to_string()
}
