//! In-memory arena of one scoring system's configuration.
//!
//! Rules, option scores and ranges are loaded once per scoring call and
//! looked up by question id and (rule, choice). Building the book enforces the
//! unique constraints the configuration is supposed to satisfy.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use mindtrack_core::ids::{ChoiceId, QuestionId, RuleId, ScoringSystemId};
use mindtrack_core::models::catalog::SystemDefinition;
use mindtrack_core::models::scoring::{OptionScore, ScoreRange, ScoreRule};
use tracing::warn;

use crate::error::ScoringError;

#[derive(Debug, Clone)]
pub struct RuleBook {
    system_id: ScoringSystemId,
    rules: HashMap<QuestionId, ScoreRule>,
    option_scores: HashMap<(RuleId, ChoiceId), f64>,
    ranges: Vec<ScoreRange>,
    total_questions: usize,
}

impl RuleBook {
    /// Build a rule book, rejecting duplicate rules or option scores and
    /// entries that belong to another scoring system.
    ///
    /// Option scores that reference no known rule are dropped with a warning.
    /// Ranges are kept in ascending `min_score` order.
    pub fn new(
        system_id: ScoringSystemId,
        rules: impl IntoIterator<Item = ScoreRule>,
        option_scores: impl IntoIterator<Item = OptionScore>,
        ranges: impl IntoIterator<Item = ScoreRange>,
        total_questions: usize,
    ) -> Result<Self, ScoringError> {
        let mut by_question = HashMap::new();
        for rule in rules {
            if rule.scoring_system_id != system_id {
                return Err(ScoringError::ForeignRule {
                    rule_id: rule.id,
                    owner: rule.scoring_system_id,
                    system_id,
                });
            }
            match by_question.entry(rule.question_id) {
                Entry::Occupied(_) => {
                    return Err(ScoringError::DuplicateRule {
                        system_id,
                        question_id: rule.question_id,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(rule);
                }
            }
        }

        let known_rules: Vec<RuleId> = by_question.values().map(|r| r.id).collect();
        let mut scores = HashMap::new();
        for option in option_scores {
            if !known_rules.contains(&option.rule_id) {
                warn!(
                    rule_id = %option.rule_id,
                    choice_id = %option.choice_id,
                    "option score references an unknown rule, ignoring"
                );
                continue;
            }
            match scores.entry((option.rule_id, option.choice_id)) {
                Entry::Occupied(_) => {
                    return Err(ScoringError::DuplicateOptionScore {
                        rule_id: option.rule_id,
                        choice_id: option.choice_id,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(option.score);
                }
            }
        }

        let mut ranges: Vec<ScoreRange> = ranges.into_iter().collect();
        if let Some(foreign) = ranges.iter().find(|r| r.scoring_system_id != system_id) {
            return Err(ScoringError::ForeignRange {
                range_id: foreign.id,
                owner: foreign.scoring_system_id,
                system_id,
            });
        }
        ranges.sort_by(|a, b| a.min_score.total_cmp(&b.min_score));

        Ok(Self {
            system_id,
            rules: by_question,
            option_scores: scores,
            ranges,
            total_questions,
        })
    }

    /// Build the rule book for a catalog entry.
    pub fn from_definition(
        definition: &SystemDefinition,
        total_questions: usize,
    ) -> Result<Self, ScoringError> {
        Self::new(
            definition.system.id,
            definition.rules.iter().cloned(),
            definition.option_scores.iter().cloned(),
            definition.ranges.iter().cloned(),
            total_questions,
        )
    }

    pub fn system_id(&self) -> ScoringSystemId {
        self.system_id
    }

    pub fn rule_for(&self, question_id: QuestionId) -> Option<&ScoreRule> {
        self.rules.get(&question_id)
    }

    pub fn option_score(&self, rule_id: RuleId, choice_id: ChoiceId) -> Option<f64> {
        self.option_scores.get(&(rule_id, choice_id)).copied()
    }

    /// All rules in ascending rule id order.
    pub fn rules(&self) -> Vec<&ScoreRule> {
        let mut rules: Vec<&ScoreRule> = self.rules.values().collect();
        rules.sort_by_key(|r| r.id);
        rules
    }

    pub fn ranges(&self) -> &[ScoreRange] {
        &self.ranges
    }

    /// Number of questions on the questionnaire, answered or not.
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }
}
