use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::questionnaire::{Choice, Question};
use crate::ids::{QuestionnaireId, ResponseId};

/// A finalized, submitted questionnaire response.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Response {
    pub id: ResponseId,
    pub questionnaire_id: QuestionnaireId,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// One answer within a response. Only the fields relevant to the question's
/// type are populated: `selected_choice` for single choice, `multiple_choices`
/// for multiple choice, `value` for numeric and free-text questions.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Answer {
    pub question: Question,
    #[serde(default)]
    pub selected_choice: Option<Choice>,
    #[serde(default)]
    pub multiple_choices: Vec<Choice>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl Answer {
    /// The answer's value read as a finite number. Accepts JSON numbers and
    /// strings holding a number (form posts often arrive as text).
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value.as_ref()? {
            serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}
