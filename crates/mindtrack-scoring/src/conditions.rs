//! Conditional logic evaluation.
//!
//! A rule's `conditional_logic` comes in one of two shapes:
//!
//! ```text
//! { "if": {"question_id": 3, "operator": ">=", "answer": 4},
//!   "then": {"score": 2, "message": "elevated"},
//!   "else": { "if": ..., "then": ..., "else": ... } }
//!
//! { "conditions": [{"question_id": 3, "operator": "==", "value": "Often"}, ...],
//!   "adjustment": 5, "description": "frequent and severe" }
//! ```
//!
//! The first is a decision tree whose branches are either terminal results or
//! nested nodes. The second is a flat list of conditions that must all hold.
//! The logic is authored by hand, so anything malformed (unknown operators,
//! non-object branches, trees nested deeper than the configured limit) yields
//! no adjustment and a warning rather than an error.

use std::cmp::Ordering;
use std::collections::HashMap;

use mindtrack_core::ids::QuestionId;
use mindtrack_core::models::questionnaire::QuestionType;
use mindtrack_core::models::response::{Answer, Response};
use mindtrack_core::models::score::ConditionalAdjustment;
use mindtrack_core::models::scoring::ScoreRule;
use serde_json::{Map, Value};
use tracing::warn;

use crate::rulebook::RuleBook;

/// Comparison operators a condition may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
        }
    }
}

/// Evaluate the conditional logic of every rule in the book against one
/// response, in rule id order.
pub fn evaluate_rules(
    book: &RuleBook,
    response: &Response,
    max_depth: usize,
) -> Vec<ConditionalAdjustment> {
    let evaluator = ConditionEvaluator::new(response, max_depth);
    book.rules()
        .into_iter()
        .filter_map(|rule| evaluator.evaluate_rule(rule))
        .collect()
}

/// Evaluates conditional logic against a prebuilt map of a response's answers.
pub struct ConditionEvaluator<'a> {
    answers: HashMap<QuestionId, &'a Answer>,
    max_depth: usize,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(response: &'a Response, max_depth: usize) -> Self {
        Self {
            answers: response.answers.iter().map(|a| (a.question.id, a)).collect(),
            max_depth,
        }
    }

    /// The adjustment a rule's logic produces for this response, if any.
    pub fn evaluate_rule(&self, rule: &ScoreRule) -> Option<ConditionalAdjustment> {
        match rule.conditional_logic.as_ref()? {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) if map.contains_key("if") => self.evaluate_node(map, rule, 0),
            Value::Object(map) if map.contains_key("conditions") => {
                self.evaluate_conjunction(map, rule)
            }
            _ => {
                warn!(
                    rule_id = %rule.id,
                    "conditional logic has neither 'if' nor 'conditions', ignoring"
                );
                None
            }
        }
    }

    fn evaluate_node(
        &self,
        node: &Map<String, Value>,
        rule: &ScoreRule,
        depth: usize,
    ) -> Option<ConditionalAdjustment> {
        if depth > self.max_depth {
            warn!(
                rule_id = %rule.id,
                max_depth = self.max_depth,
                "conditional logic nested too deeply, ignoring"
            );
            return None;
        }

        let condition = node.get("if").unwrap_or(&Value::Null);
        let branch = if self.check(condition, rule) {
            match node.get("then") {
                Some(branch) => branch,
                None => return Some(adjustment(rule, 0.0, String::new())),
            }
        } else {
            match node.get("else") {
                Some(branch) if !is_falsy(branch) => branch,
                _ => return None,
            }
        };

        match branch {
            Value::Object(next) if next.contains_key("if") => {
                self.evaluate_node(next, rule, depth + 1)
            }
            Value::Object(result) => terminal(result, rule),
            _ => {
                warn!(rule_id = %rule.id, "conditional branch is not an object, ignoring");
                None
            }
        }
    }

    fn evaluate_conjunction(
        &self,
        map: &Map<String, Value>,
        rule: &ScoreRule,
    ) -> Option<ConditionalAdjustment> {
        let conditions = match map.get("conditions") {
            Some(Value::Array(conditions)) => conditions,
            _ => {
                warn!(rule_id = %rule.id, "'conditions' is not a list, ignoring");
                return None;
            }
        };
        if conditions.is_empty() || !conditions.iter().all(|c| self.check_flat(c, rule)) {
            return None;
        }

        let delta = match map.get("adjustment") {
            None | Some(Value::Null) => 0.0,
            Some(value) => match as_number(value) {
                Some(delta) => delta,
                None => {
                    warn!(rule_id = %rule.id, "conditional adjustment is not a number, ignoring");
                    return None;
                }
            },
        };
        Some(adjustment(rule, delta, text_of(map.get("description"))))
    }

    /// A tree condition: `{question_id, operator, answer}`.
    fn check(&self, condition: &Value, rule: &ScoreRule) -> bool {
        let Value::Object(condition) = condition else {
            warn!(rule_id = %rule.id, "condition is not an object, treating as unmet");
            return false;
        };
        let Some(operator) = operator_of(condition, rule) else {
            return false;
        };
        let expected = condition.get("answer");

        match question_ref(condition.get("question_id")) {
            // A condition that names no question holds whenever it carries an
            // expected answer.
            QuestionRef::Absent => expected.is_some(),
            QuestionRef::Invalid => false,
            QuestionRef::Id(id) => self
                .answers
                .get(&id)
                .is_some_and(|answer| compare_answer(answer, operator, expected)),
        }
    }

    /// A flat condition: `{question_id, operator, value}`. Both the question
    /// and the value are required.
    fn check_flat(&self, condition: &Value, rule: &ScoreRule) -> bool {
        let Value::Object(condition) = condition else {
            return false;
        };
        let Some(operator) = operator_of(condition, rule) else {
            return false;
        };
        let QuestionRef::Id(id) = question_ref(condition.get("question_id")) else {
            return false;
        };
        let expected = match condition.get("value") {
            None | Some(Value::Null) => return false,
            Some(value) => value,
        };
        self.answers
            .get(&id)
            .is_some_and(|answer| compare_answer(answer, operator, Some(expected)))
    }
}

enum QuestionRef {
    Absent,
    Invalid,
    Id(QuestionId),
}

fn question_ref(value: Option<&Value>) -> QuestionRef {
    match value {
        None | Some(Value::Null) => QuestionRef::Absent,
        Some(Value::String(s)) if s.trim().is_empty() => QuestionRef::Absent,
        Some(Value::String(s)) => s.parse().map_or(QuestionRef::Invalid, QuestionRef::Id),
        Some(Value::Number(n)) => n
            .as_u64()
            .map_or(QuestionRef::Invalid, |id| QuestionRef::Id(QuestionId(id))),
        Some(_) => QuestionRef::Invalid,
    }
}

fn operator_of(condition: &Map<String, Value>, rule: &ScoreRule) -> Option<Operator> {
    let raw = condition.get("operator").and_then(Value::as_str).unwrap_or("==");
    let operator = Operator::parse(raw);
    if operator.is_none() {
        warn!(rule_id = %rule.id, operator = raw, "unknown comparison operator, treating as unmet");
    }
    operator
}

/// Compare an answer against an expected value, reading the answer the way
/// its question type calls for.
fn compare_answer(answer: &Answer, operator: Operator, expected: Option<&Value>) -> bool {
    match answer.question.question_type {
        QuestionType::SingleChoice if answer.selected_choice.is_some() => {
            let text = answer
                .selected_choice
                .as_ref()
                .map(|choice| Value::String(choice.text.clone()));
            compare_values(operator, text.as_ref(), expected)
        }
        QuestionType::MultipleChoice => {
            let wanted = expected.and_then(Value::as_str);
            let member = answer
                .multiple_choices
                .iter()
                .any(|choice| Some(choice.text.as_str()) == wanted);
            match operator {
                Operator::Eq => member,
                Operator::Ne => !member,
                _ => false,
            }
        }
        QuestionType::Number | QuestionType::Scale => {
            let actual = match answer.value.as_ref() {
                None | Some(Value::Null) => None,
                Some(_) => match answer.numeric_value() {
                    Some(value) => Some(value),
                    None => return false,
                },
            };
            let expected = match expected {
                None | Some(Value::Null) => None,
                Some(value) => match as_number(value) {
                    Some(value) => Some(value),
                    None => return false,
                },
            };
            compare_numbers(operator, actual, expected)
        }
        _ => compare_values(operator, answer.value.as_ref(), expected),
    }
}

fn compare_numbers(operator: Operator, actual: Option<f64>, expected: Option<f64>) -> bool {
    match operator {
        Operator::Eq => actual == expected,
        Operator::Ne => actual != expected,
        _ => match (actual, expected) {
            (Some(a), Some(b)) => a.partial_cmp(&b).is_some_and(|o| operator.holds(o)),
            _ => false,
        },
    }
}

fn compare_values(operator: Operator, actual: Option<&Value>, expected: Option<&Value>) -> bool {
    let actual = actual.unwrap_or(&Value::Null);
    let expected = expected.unwrap_or(&Value::Null);
    match operator {
        Operator::Eq => values_equal(actual, expected),
        Operator::Ne => !values_equal(actual, expected),
        _ => {
            let ordering = match (actual, expected) {
                (Value::Number(a), Value::Number(b)) => a
                    .as_f64()
                    .zip(b.as_f64())
                    .and_then(|(a, b)| a.partial_cmp(&b)),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => None,
            };
            ordering.is_some_and(|o| operator.holds(o))
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

/// A terminal branch: `{score, message}`.
fn terminal(result: &Map<String, Value>, rule: &ScoreRule) -> Option<ConditionalAdjustment> {
    let delta = match result.get("score") {
        None | Some(Value::Null) => 0.0,
        Some(value) => match as_number(value) {
            Some(delta) => delta,
            None => {
                warn!(rule_id = %rule.id, "conditional score is not a number, ignoring");
                return None;
            }
        },
    };
    Some(adjustment(rule, delta, text_of(result.get("message"))))
}

fn adjustment(rule: &ScoreRule, delta: f64, message: String) -> ConditionalAdjustment {
    ConditionalAdjustment {
        rule_id: rule.id,
        question_id: Some(rule.question_id),
        adjustment: delta,
        message,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
