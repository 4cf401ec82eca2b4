//! Scores one response with one scoring system, end to end.

use mindtrack_core::models::response::Response;
use mindtrack_core::models::score::{AdditionalData, ResponseScore};
use mindtrack_core::models::scoring::{ScoringSystem, ScoringType};
use tracing::{debug, warn};

use crate::aggregate::{category_scores, subscale_scores};
use crate::conditions::evaluate_rules;
use crate::config::EngineConfig;
use crate::error::ScoringError;
use crate::ranges::match_range;
use crate::rulebook::RuleBook;
use crate::scoring::{RawScoreResult, ScoringContext};
use crate::stats::{Population, normalize};
use crate::{algorithm_for, compute_raw_score};

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score `response` with `system`.
    ///
    /// `population` holds the raw scores already recorded for the system,
    /// excluding this response. The returned record is not persisted; the
    /// caller upserts it.
    ///
    /// Fails when the inputs do not belong together, when a strict engine
    /// meets an unknown scoring type or a failing formula, and when the
    /// arithmetic overflows. The last is fatal for this one response only.
    pub fn score(
        &self,
        system: &ScoringSystem,
        book: &RuleBook,
        response: &Response,
        population: &Population,
    ) -> Result<ResponseScore, ScoringError> {
        if response.questionnaire_id != system.questionnaire_id {
            return Err(ScoringError::QuestionnaireMismatch {
                response_id: response.id,
                expected: system.questionnaire_id,
                found: response.questionnaire_id,
            });
        }
        if book.system_id() != system.id {
            return Err(ScoringError::RuleBookMismatch {
                expected: system.id,
                found: book.system_id(),
            });
        }

        let ctx = ScoringContext {
            system,
            book,
            response,
            population,
            config: &self.config,
        };
        let RawScoreResult {
            raw_score,
            range,
            z_score,
            percentile,
            adjustments,
            formula,
            ..
        } = compute_raw_score(&ctx)?;

        let score_range = range.or_else(|| match_range(raw_score, book.ranges()).cloned());

        let normalized = normalize(raw_score, population);
        let z_score = z_score.unwrap_or(normalized.z_score);
        let percentile = match system.scoring_type {
            ScoringType::Percentile => percentile.unwrap_or(normalized.percentile),
            _ => normalized.percentile,
        };

        let conditional_adjustments = match system.scoring_type {
            ScoringType::Conditional => adjustments,
            _ => evaluate_rules(book, response, self.config.max_condition_depth),
        };

        let notes = notes_for(system, formula.as_ref().is_some_and(|f| !f.evaluated));

        debug!(
            response_id = %response.id,
            system_id = %system.id,
            scoring_type = %system.scoring_type,
            raw_score,
            z_score,
            percentile,
            range = score_range.as_ref().map(|r| r.name.as_str()),
            adjustments = conditional_adjustments.len(),
            "scored response"
        );

        let score = ResponseScore {
            response_id: response.id,
            scoring_system_id: system.id,
            raw_score,
            score_range,
            z_score: Some(z_score),
            percentile: Some(percentile),
            additional_data: AdditionalData {
                category_scores: category_scores(book, &response.answers),
                subscales: subscale_scores(book, &response.answers),
                conditional_adjustments,
                formula,
            },
            notes,
            calculated_at: jiff::Timestamp::now(),
        };
        if let Some(field) = score.non_finite_field() {
            warn!(
                response_id = %response.id,
                system_id = %system.id,
                field,
                "score overflowed, not recording it"
            );
            return Err(ScoringError::NonFiniteScore {
                response_id: response.id,
                system_id: system.id,
                field,
            });
        }
        Ok(score)
    }
}

fn notes_for(system: &ScoringSystem, formula_fell_back: bool) -> String {
    let method = algorithm_for(system.scoring_type)
        .map(|algorithm| algorithm.name().to_string())
        .unwrap_or_else(|| "unknown scoring type (scored as 0)".to_string());
    if formula_fell_back {
        format!("Scored with {method}; formula failed, simple sum used")
    } else {
        format!("Scored with {method}")
    }
}
