use serde::{Deserialize, Serialize};

/// Deepest nesting of `then`/`else` branches the conditional evaluator follows.
pub const DEFAULT_MAX_CONDITION_DEPTH: usize = 10;

/// Evaluation steps a custom formula may take before it is abandoned.
pub const DEFAULT_FORMULA_STEP_LIMIT: usize = 10_000;

/// Longest formula source accepted, in bytes.
pub const DEFAULT_FORMULA_MAX_LENGTH: usize = 4_096;

/// Tuning knobs for the engine. Every field has a default, so a partial
/// config file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_condition_depth: usize,
    pub formula_step_limit: usize,
    pub formula_max_length: usize,
    /// What to do with a scoring system whose type this build does not know.
    pub unknown_scoring_type: Strictness,
    /// What to do when a custom formula fails to evaluate.
    pub formula_failure: Strictness,
    /// Which population batch runs normalise against.
    pub population_mode: PopulationMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_condition_depth: DEFAULT_MAX_CONDITION_DEPTH,
            formula_step_limit: DEFAULT_FORMULA_STEP_LIMIT,
            formula_max_length: DEFAULT_FORMULA_MAX_LENGTH,
            unknown_scoring_type: Strictness::Lenient,
            formula_failure: Strictness::Lenient,
            population_mode: PopulationMode::Live,
        }
    }
}

/// Lenient degrades to a safe default and logs; strict returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationMode {
    /// Each response sees every score stored before it, including scores
    /// stored earlier in the same batch.
    #[default]
    Live,
    /// The population is captured once per scoring system at the start of a
    /// batch and reused for every response in it.
    Snapshot,
}
