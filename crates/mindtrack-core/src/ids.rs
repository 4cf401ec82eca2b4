//! Strongly typed identifiers.
//!
//! Every reference between entities goes through one of these newtypes so a
//! rule can never be looked up with a choice id, and a scoring system is never
//! resolved from a loosely typed string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map($name)
                    .map_err(|_| CoreError::InvalidId(s.to_string()))
            }
        }
    };
}

numeric_id!(
    /// Identifies a questionnaire.
    QuestionnaireId
);
numeric_id!(
    /// Identifies a question within a questionnaire.
    QuestionId
);
numeric_id!(
    /// Identifies a selectable choice of a choice question.
    ChoiceId
);
numeric_id!(
    /// Identifies a scoring system.
    ScoringSystemId
);
numeric_id!(
    /// Identifies a score rule.
    RuleId
);
numeric_id!(
    /// Identifies a score range.
    RangeId
);

/// Identifies a submitted response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct ResponseId(pub Uuid);

impl ResponseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResponseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResponseId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}
