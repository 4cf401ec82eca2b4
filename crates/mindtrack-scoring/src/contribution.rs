//! Per-answer score contributions, shared by every strategy and aggregate.

use mindtrack_core::models::questionnaire::QuestionType;
use mindtrack_core::models::response::Answer;
use mindtrack_core::models::scoring::ScoreRule;

use crate::rulebook::RuleBook;

/// What one answer is worth under its question's rule.
///
/// - single choice: the selected choice's option score;
/// - multiple choice: the sum of the selected choices' option scores;
/// - number / scale: the numeric value itself;
/// - text / textarea: the rule's fixed text score, when enabled.
///
/// Missing option scores and unusable values contribute 0.
pub fn contribution(book: &RuleBook, rule: &ScoreRule, answer: &Answer) -> f64 {
    match answer.question.question_type {
        QuestionType::SingleChoice => answer
            .selected_choice
            .as_ref()
            .and_then(|choice| book.option_score(rule.id, choice.id))
            .unwrap_or(0.0),
        QuestionType::MultipleChoice => answer
            .multiple_choices
            .iter()
            .filter_map(|choice| book.option_score(rule.id, choice.id))
            .sum(),
        QuestionType::Number | QuestionType::Scale => answer.numeric_value().unwrap_or(0.0),
        QuestionType::Text | QuestionType::Textarea if rule.text_score_enabled => rule.text_score,
        _ => 0.0,
    }
}

/// Pair each answer that has a rule with its contribution. Answers whose
/// question has no rule are skipped.
pub fn scored_answers<'a>(
    book: &'a RuleBook,
    answers: impl IntoIterator<Item = &'a Answer>,
) -> impl Iterator<Item = (&'a ScoreRule, f64)> {
    answers.into_iter().filter_map(move |answer| {
        book.rule_for(answer.question.id)
            .map(|rule| (rule, contribution(book, rule, answer)))
    })
}

/// Unweighted sum of contributions.
pub fn sum_contributions<'a>(
    book: &'a RuleBook,
    answers: impl IntoIterator<Item = &'a Answer>,
) -> f64 {
    scored_answers(book, answers).map(|(_, score)| score).sum()
}
