use std::collections::BTreeMap;

use mindtrack_core::models::questionnaire::QuestionType;
use mindtrack_core::models::response::Answer;
use mindtrack_core::models::score::FormulaOutcome;
use mindtrack_core::models::scoring::ScoringType;
use tracing::error;

use crate::ScoringAlgorithm;
use crate::algorithms::weighted::weighted_average;
use crate::config::Strictness;
use crate::contribution::{contribution, sum_contributions};
use crate::error::ScoringError;
use crate::formula::Formula;
use crate::rulebook::RuleBook;
use crate::scoring::{RawScoreResult, ScoringContext};

/// Evaluates the scoring system's formula over the response's answers.
///
/// A blank formula scores as the simple sum. A formula that fails to parse or
/// evaluate also scores as the simple sum, with the failure logged and
/// recorded in the outcome, unless the engine is configured to reject it.
pub struct Custom;

impl ScoringAlgorithm for Custom {
    fn scoring_type(&self) -> ScoringType {
        ScoringType::Custom
    }

    fn name(&self) -> &str {
        "Custom Formula"
    }

    fn compute(&self, ctx: &ScoringContext<'_>) -> Result<RawScoreResult, ScoringError> {
        let simple_sum = sum_contributions(ctx.book, &ctx.response.answers);
        let source = match ctx.system.formula.as_deref() {
            Some(source) if !source.trim().is_empty() => source,
            _ => return Ok(RawScoreResult::raw(simple_sum)),
        };

        let variables = formula_variables(ctx.book, &ctx.response.answers, simple_sum);
        let result = Formula::parse(source, ctx.config.formula_max_length)
            .and_then(|formula| formula.evaluate(&variables, ctx.config.formula_step_limit));

        match result {
            Ok(raw_score) => Ok(RawScoreResult {
                raw_score,
                formula: Some(FormulaOutcome {
                    formula: source.to_string(),
                    evaluated: true,
                    error: None,
                    variables,
                }),
                ..RawScoreResult::default()
            }),
            Err(source_error) => match ctx.config.formula_failure {
                Strictness::Lenient => {
                    error!(
                        system_id = %ctx.system.id,
                        formula = source,
                        error = %source_error,
                        "custom formula failed, falling back to simple sum"
                    );
                    Ok(RawScoreResult {
                        raw_score: simple_sum,
                        formula: Some(FormulaOutcome {
                            formula: source.to_string(),
                            evaluated: false,
                            error: Some(source_error.to_string()),
                            variables,
                        }),
                        ..RawScoreResult::default()
                    })
                }
                Strictness::Strict => Err(ScoringError::FormulaFailed {
                    system_id: ctx.system.id,
                    formula: source.to_string(),
                    source: source_error,
                }),
            },
        }
    }
}

/// The names a custom formula may read for one response:
///
/// - `q_<question id>` for every answered question;
/// - `simple_sum` and `weighted_sum`;
/// - `answered_questions` and `total_questions`.
pub fn formula_variables(
    book: &RuleBook,
    answers: &[Answer],
    simple_sum: f64,
) -> BTreeMap<String, f64> {
    let mut variables = BTreeMap::new();
    variables.insert("total_questions".to_string(), book.total_questions() as f64);
    variables.insert("answered_questions".to_string(), answers.len() as f64);
    for answer in answers {
        variables.insert(format!("q_{}", answer.question.id), question_value(book, answer));
    }
    variables.insert("simple_sum".to_string(), simple_sum);
    variables.insert("weighted_sum".to_string(), weighted_average(book, answers));
    variables
}

/// Numeric questions expose their value whether or not they have a rule;
/// choice questions expose their option scores through the rule.
fn question_value(book: &RuleBook, answer: &Answer) -> f64 {
    match answer.question.question_type {
        QuestionType::Number | QuestionType::Scale => answer.numeric_value().unwrap_or(0.0),
        QuestionType::SingleChoice | QuestionType::MultipleChoice => book
            .rule_for(answer.question.id)
            .map(|rule| contribution(book, rule, answer))
            .unwrap_or(0.0),
        _ => 0.0,
    }
}
