use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::scoring::ScoreRange;
use crate::ids::{QuestionId, ResponseId, RuleId, ScoringSystemId};

/// The persisted outcome of scoring one response with one scoring system.
/// Unique per (response, scoring system); recalculation overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResponseScore {
    pub response_id: ResponseId,
    pub scoring_system_id: ScoringSystemId,
    pub raw_score: f64,
    /// Snapshot of the band the raw score fell into, if any.
    pub score_range: Option<ScoreRange>,
    pub z_score: Option<f64>,
    pub percentile: Option<f64>,
    pub additional_data: AdditionalData,
    #[serde(default)]
    pub notes: String,
    pub calculated_at: jiff::Timestamp,
}

impl ResponseScore {
    pub fn key(&self) -> (ResponseId, ScoringSystemId) {
        (self.response_id, self.scoring_system_id)
    }

    /// The first field holding NaN or an infinity, if any. JSON has no
    /// spelling for those, so such a score cannot be stored.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let data = &self.additional_data;
        if !self.raw_score.is_finite() {
            Some("raw_score")
        } else if self.z_score.is_some_and(|z| !z.is_finite()) {
            Some("z_score")
        } else if self.percentile.is_some_and(|p| !p.is_finite()) {
            Some("percentile")
        } else if data.category_scores.values().any(|v| !v.is_finite()) {
            Some("category_scores")
        } else if data.subscales.values().any(|v| !v.is_finite()) {
            Some("subscales")
        } else if data.conditional_adjustments.iter().any(|a| !a.adjustment.is_finite()) {
            Some("conditional_adjustments")
        } else if data
            .formula
            .as_ref()
            .is_some_and(|f| f.variables.values().any(|v| !v.is_finite()))
        {
            Some("formula variables")
        } else {
            None
        }
    }
}

/// Breakdowns recorded next to the raw score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdditionalData {
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub subscales: BTreeMap<String, f64>,
    #[serde(default)]
    pub conditional_adjustments: Vec<ConditionalAdjustment>,
    /// Present only for custom-formula systems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<FormulaOutcome>,
}

/// A score delta produced by a rule's conditional logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConditionalAdjustment {
    pub rule_id: RuleId,
    pub question_id: Option<QuestionId>,
    pub adjustment: f64,
    pub message: String,
}

/// What happened when a custom formula was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormulaOutcome {
    pub formula: String,
    /// False when evaluation failed and the simple sum was used instead.
    pub evaluated: bool,
    pub error: Option<String>,
    pub variables: BTreeMap<String, f64>,
}
