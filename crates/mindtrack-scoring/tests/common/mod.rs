#![allow(dead_code)]

use mindtrack_core::ids::{
    ChoiceId, QuestionId, QuestionnaireId, RangeId, ResponseId, RuleId, ScoringSystemId,
};
use mindtrack_core::models::questionnaire::{Choice, Question, QuestionType};
use mindtrack_core::models::response::{Answer, Response};
use mindtrack_core::models::scoring::{
    OptionScore, RangeBasis, ScoreRange, ScoreRule, ScoringSystem, ScoringType,
};
use mindtrack_scoring::rulebook::RuleBook;
use serde_json::Value;

pub const QUESTIONNAIRE: QuestionnaireId = QuestionnaireId(1);
pub const SYSTEM: ScoringSystemId = ScoringSystemId(10);

pub fn system(scoring_type: ScoringType) -> ScoringSystem {
    ScoringSystem {
        id: SYSTEM,
        questionnaire_id: QUESTIONNAIRE,
        name: format!("{scoring_type} system"),
        description: String::new(),
        scoring_type,
        formula: None,
        range_basis: RangeBasis::SimpleSum,
        is_active: true,
        is_default: false,
    }
}

pub fn custom_system(formula: &str) -> ScoringSystem {
    ScoringSystem {
        formula: Some(formula.to_string()),
        ..system(ScoringType::Custom)
    }
}

pub fn question(id: u64, question_type: QuestionType, text: &str) -> Question {
    Question {
        id: QuestionId(id),
        question_type,
        text: text.to_string(),
        category: None,
        choices: Vec::new(),
    }
}

pub fn choice(id: u64, text: &str) -> Choice {
    Choice {
        id: ChoiceId(id),
        text: text.to_string(),
    }
}

pub fn single(question: Question, choice: Choice) -> Answer {
    Answer {
        question,
        selected_choice: Some(choice),
        multiple_choices: Vec::new(),
        value: None,
    }
}

pub fn multiple(question: Question, choices: Vec<Choice>) -> Answer {
    Answer {
        question,
        selected_choice: None,
        multiple_choices: choices,
        value: None,
    }
}

pub fn valued(question: Question, value: Value) -> Answer {
    Answer {
        question,
        selected_choice: None,
        multiple_choices: Vec::new(),
        value: Some(value),
    }
}

pub fn response(answers: Vec<Answer>) -> Response {
    Response {
        id: ResponseId::new(),
        questionnaire_id: QUESTIONNAIRE,
        answers,
    }
}

pub fn rule(id: u64, question_id: u64) -> ScoreRule {
    ScoreRule {
        id: RuleId(id),
        scoring_system_id: SYSTEM,
        question_id: QuestionId(question_id),
        weight: 1.0,
        text_score_enabled: false,
        text_score: 0.0,
        conditional_logic: None,
    }
}

pub fn weighted_rule(id: u64, question_id: u64, weight: f64) -> ScoreRule {
    ScoreRule {
        weight,
        ..rule(id, question_id)
    }
}

pub fn logic_rule(id: u64, question_id: u64, logic: Value) -> ScoreRule {
    ScoreRule {
        conditional_logic: Some(logic),
        ..rule(id, question_id)
    }
}

pub fn option(rule_id: u64, choice_id: u64, score: f64) -> OptionScore {
    OptionScore {
        rule_id: RuleId(rule_id),
        choice_id: ChoiceId(choice_id),
        score,
    }
}

pub fn range(id: u64, name: &str, min_score: f64, max_score: f64) -> ScoreRange {
    ScoreRange {
        id: RangeId(id),
        scoring_system_id: SYSTEM,
        name: name.to_string(),
        min_score,
        max_score,
        color: "#3498db".to_string(),
        description: String::new(),
        interpretation: String::new(),
    }
}

pub fn book(rules: Vec<ScoreRule>, options: Vec<OptionScore>, ranges: Vec<ScoreRange>) -> RuleBook {
    RuleBook::new(SYSTEM, rules, options, ranges, 10).unwrap()
}

/// Three single-choice questions answered with choices worth 5, 3 and 2.
pub fn five_three_two() -> (RuleBook, Response) {
    let book = book(
        vec![rule(1, 1), rule(2, 2), rule(3, 3)],
        vec![option(1, 11, 5.0), option(2, 21, 3.0), option(3, 31, 2.0)],
        Vec::new(),
    );
    let response = response(vec![
        single(question(1, QuestionType::SingleChoice, "Q1"), choice(11, "A")),
        single(question(2, QuestionType::SingleChoice, "Q2"), choice(21, "B")),
        single(question(3, QuestionType::SingleChoice, "Q3"), choice(31, "C")),
    ]);
    (book, response)
}
