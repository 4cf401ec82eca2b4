use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ChoiceId, QuestionId, QuestionnaireId};

/// Category assigned to questions that carry no explicit tag.
pub const DEFAULT_CATEGORY: &str = "general";

/// The kind of input a question collects. Determines how an answer's value
/// is turned into a score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Number,
    Scale,
    Text,
    Textarea,
    /// Any question type the scoring engine does not know how to score
    /// (dates, file uploads, ...). Always contributes zero.
    #[serde(other)]
    Other,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleChoice => "single_choice",
            Self::MultipleChoice => "multiple_choice",
            Self::Number => "number",
            Self::Scale => "scale",
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable answer option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: QuestionId,
    #[ts(type = "string")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    /// The question's category tag, or [`DEFAULT_CATEGORY`] when absent or blank.
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag,
            _ => DEFAULT_CATEGORY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Questionnaire {
    pub id: QuestionnaireId,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}
