use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::questionnaire::Questionnaire;
use super::scoring::{OptionScore, ScoreRange, ScoreRule, ScoringSystem};
use crate::ids::{QuestionnaireId, ScoringSystemId};

/// Everything the engine needs to know about questionnaires and how they are
/// scored. Authored elsewhere; read-only to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Catalog {
    #[serde(default)]
    pub questionnaires: Vec<Questionnaire>,
    #[serde(default)]
    pub scoring_systems: Vec<SystemDefinition>,
}

/// A scoring system together with its rules, option scores and ranges.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SystemDefinition {
    pub system: ScoringSystem,
    #[serde(default)]
    pub rules: Vec<ScoreRule>,
    #[serde(default)]
    pub option_scores: Vec<OptionScore>,
    #[serde(default)]
    pub ranges: Vec<ScoreRange>,
}

impl Catalog {
    pub fn questionnaire(&self, id: QuestionnaireId) -> Option<&Questionnaire> {
        self.questionnaires.iter().find(|q| q.id == id)
    }

    pub fn system(&self, id: ScoringSystemId) -> Option<&SystemDefinition> {
        self.scoring_systems.iter().find(|d| d.system.id == id)
    }

    /// Active scoring systems attached to a questionnaire, default first.
    pub fn active_systems_for(&self, questionnaire_id: QuestionnaireId) -> Vec<&SystemDefinition> {
        let mut systems: Vec<&SystemDefinition> = self
            .scoring_systems
            .iter()
            .filter(|d| d.system.questionnaire_id == questionnaire_id && d.system.is_active)
            .collect();
        systems.sort_by_key(|d| (!d.system.is_default, d.system.id));
        systems
    }
}
