use mindtrack_core::ids::{
    ChoiceId, QuestionId, QuestionnaireId, RangeId, ResponseId, RuleId, ScoringSystemId,
};
use thiserror::Error;

use crate::formula::FormulaError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("response {response_id} answers questionnaire {found}, the scoring system {expected}")]
    QuestionnaireMismatch {
        response_id: ResponseId,
        expected: QuestionnaireId,
        found: QuestionnaireId,
    },

    #[error("rule book was built for scoring system {found}, not {expected}")]
    RuleBookMismatch {
        expected: ScoringSystemId,
        found: ScoringSystemId,
    },

    #[error("scoring system {system_id} has more than one rule for question {question_id}")]
    DuplicateRule {
        system_id: ScoringSystemId,
        question_id: QuestionId,
    },

    #[error("rule {rule_id} has more than one option score for choice {choice_id}")]
    DuplicateOptionScore { rule_id: RuleId, choice_id: ChoiceId },

    #[error("rule {rule_id} belongs to scoring system {owner}, not {system_id}")]
    ForeignRule {
        rule_id: RuleId,
        owner: ScoringSystemId,
        system_id: ScoringSystemId,
    },

    #[error("score range {range_id} belongs to scoring system {owner}, not {system_id}")]
    ForeignRange {
        range_id: RangeId,
        owner: ScoringSystemId,
        system_id: ScoringSystemId,
    },

    #[error("scoring system {system_id} has an unknown scoring type")]
    UnknownScoringType { system_id: ScoringSystemId },

    #[error("custom formula for scoring system {system_id} failed: {source}")]
    FormulaFailed {
        system_id: ScoringSystemId,
        formula: String,
        #[source]
        source: FormulaError,
    },

    #[error("scoring response {response_id} with system {system_id} gave a non-finite {field}")]
    NonFiniteScore {
        response_id: ResponseId,
        system_id: ScoringSystemId,
        field: &'static str,
    },
}
