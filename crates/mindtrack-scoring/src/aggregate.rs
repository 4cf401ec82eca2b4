//! Category and subscale breakdowns of a response's score.

use std::collections::BTreeMap;

use mindtrack_core::models::response::Answer;

use crate::contribution::scored_answers;
use crate::rulebook::RuleBook;
use crate::stats::round2;

/// The four fixed subscales, assigned by keyword in the question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subscale {
    Cognitive,
    Emotional,
    Physical,
    Behavioral,
}

impl Subscale {
    pub const ALL: [Subscale; 4] = [
        Subscale::Cognitive,
        Subscale::Emotional,
        Subscale::Physical,
        Subscale::Behavioral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subscale::Cognitive => "cognitive",
            Subscale::Emotional => "emotional",
            Subscale::Physical => "physical",
            Subscale::Behavioral => "behavioral",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Subscale::Cognitive => &["think", "thought", "memory", "concentrate", "decision"],
            Subscale::Emotional => &["feel", "emotion", "mood", "sad", "happy", "angry"],
            Subscale::Physical => &["body", "pain", "sleep", "tired", "energy", "physical"],
            Subscale::Behavioral => &["do", "activity", "behavior", "action", "interact"],
        }
    }

    /// Case-insensitive substring match, so "do" also hits "done".
    pub fn matches(self, question_text: &str) -> bool {
        let text = question_text.to_lowercase();
        self.keywords().iter().any(|keyword| text.contains(keyword))
    }

    /// Every subscale a question belongs to, possibly none.
    pub fn classify(question_text: &str) -> Vec<Subscale> {
        Self::ALL.into_iter().filter(|s| s.matches(question_text)).collect()
    }
}

/// Simple-sum score per question category, rounded to 2 decimals. Questions
/// without a category count toward "general". Only categories with at least
/// one answer appear.
pub fn category_scores(book: &RuleBook, answers: &[Answer]) -> BTreeMap<String, f64> {
    let mut groups: BTreeMap<String, Vec<&Answer>> = BTreeMap::new();
    for answer in answers {
        groups
            .entry(answer.question.category_or_default().to_string())
            .or_default()
            .push(answer);
    }
    groups
        .into_iter()
        .map(|(category, members)| (category, group_score(book, members)))
        .collect()
}

/// Simple-sum score per subscale, rounded to 2 decimals. All four subscales
/// are always present.
pub fn subscale_scores(book: &RuleBook, answers: &[Answer]) -> BTreeMap<String, f64> {
    Subscale::ALL
        .into_iter()
        .map(|subscale| {
            let members = answers.iter().filter(|a| subscale.matches(&a.question.text));
            (subscale.as_str().to_string(), group_score(book, members))
        })
        .collect()
}

fn group_score<'a>(book: &'a RuleBook, members: impl IntoIterator<Item = &'a Answer>) -> f64 {
    round2(scored_answers(book, members).map(|(_, score)| score).sum())
}
