//! The work behind each `mindtrack` subcommand, kept out of `main.rs` so it
//! can be driven against an in-memory store.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use mindtrack_core::models::catalog::{Catalog, SystemDefinition};
use mindtrack_core::models::response::Response;
use mindtrack_core::models::score::ResponseScore;
use mindtrack_scoring::config::{EngineConfig, PopulationMode};
use mindtrack_scoring::engine::ScoringEngine;
use mindtrack_scoring::formula::Formula;
use mindtrack_scoring::ranges::match_range;
use mindtrack_scoring::rulebook::RuleBook;
use mindtrack_scoring::stats::{Population, PopulationSummary};
use mindtrack_storage::ScoreStore;
use serde::Serialize;
use tracing::{info, warn};

/// One scoring run over a set of responses.
///
/// Rule books are built once per scoring system. In snapshot mode the
/// population of each system is captured the first time the system is
/// scored, before this run has stored anything for it.
pub struct Batch<'a> {
    catalog: &'a Catalog,
    store: &'a dyn ScoreStore,
    engine: &'a ScoringEngine,
    books: HashMap<ScoringSystemId, RuleBook>,
    snapshots: HashMap<ScoringSystemId, Vec<(ResponseId, f64)>>,
}

impl<'a> Batch<'a> {
    pub fn new(
        catalog: &'a Catalog,
        store: &'a dyn ScoreStore,
        engine: &'a ScoringEngine,
    ) -> Self {
        Self {
            catalog,
            store,
            engine,
            books: HashMap::new(),
            snapshots: HashMap::new(),
        }
    }

    /// Score every response against each active system of its questionnaire,
    /// or only against `only` when given. Scores are upserted as they are
    /// produced, in input order.
    pub fn score(
        &mut self,
        responses: &[Response],
        only: Option<ScoringSystemId>,
    ) -> eyre::Result<Vec<ResponseScore>> {
        let catalog = self.catalog;
        let only = only.map(|id| find_system(catalog, id)).transpose()?;

        let mut scores = Vec::new();
        for response in responses {
            let systems = match only {
                Some(definition) if belongs(definition, response) => vec![definition],
                Some(definition) => {
                    warn!(
                        response_id = %response.id,
                        questionnaire_id = %response.questionnaire_id,
                        system_id = %definition.system.id,
                        "response belongs to another questionnaire, skipping"
                    );
                    continue;
                }
                None => catalog.active_systems_for(response.questionnaire_id),
            };
            if systems.is_empty() {
                warn!(
                    response_id = %response.id,
                    questionnaire_id = %response.questionnaire_id,
                    "no active scoring systems for questionnaire"
                );
            }
            for definition in systems {
                scores.push(self.score_one(definition, response)?);
            }
        }

        info!(responses = responses.len(), scores = scores.len(), "batch scored");
        Ok(scores)
    }

    /// Rescore every response that already has a score for `system_id`, in
    /// ledger order. Every such response must be present in `responses`.
    pub fn recalculate(
        &mut self,
        responses: &[Response],
        system_id: ScoringSystemId,
    ) -> eyre::Result<Vec<ResponseScore>> {
        let definition = find_system(self.catalog, system_id)?;
        let by_id: HashMap<ResponseId, &Response> = responses.iter().map(|r| (r.id, r)).collect();

        let stored = self.store.scores_for(system_id)?;
        let mut scores = Vec::with_capacity(stored.len());
        for previous in &stored {
            let response = by_id.get(&previous.response_id).ok_or_else(|| {
                eyre::eyre!(
                    "response {} has a score for system {system_id} but is not in the input",
                    previous.response_id
                )
            })?;
            scores.push(self.score_one(definition, response)?);
        }

        info!(system_id = %system_id, rescored = scores.len(), "recalculated scores");
        Ok(scores)
    }

    fn score_one(
        &mut self,
        definition: &SystemDefinition,
        response: &Response,
    ) -> eyre::Result<ResponseScore> {
        let system = &definition.system;
        let population = self.population(system.id, response.id)?;

        let book = match self.books.entry(system.id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let questionnaire = self
                    .catalog
                    .questionnaire(system.questionnaire_id)
                    .ok_or_else(|| {
                        eyre::eyre!(
                            "scoring system {} refers to questionnaire {}, not in the catalog",
                            system.id,
                            system.questionnaire_id
                        )
                    })?;
                let total_questions = questionnaire.questions.len();
                entry.insert(RuleBook::from_definition(definition, total_questions)?)
            }
        };

        let score = self.engine.score(system, book, response, &population)?;
        self.store.upsert(score.clone())?;
        Ok(score)
    }

    fn population(
        &mut self,
        system_id: ScoringSystemId,
        response_id: ResponseId,
    ) -> eyre::Result<Population> {
        match self.engine.config().population_mode {
            PopulationMode::Live => {
                let scores = self.store.population(system_id, Some(response_id))?;
                Ok(Population::new(scores))
            }
            PopulationMode::Snapshot => {
                let snapshot = match self.snapshots.entry(system_id) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let captured: Vec<(ResponseId, f64)> = self
                            .store
                            .scores_for(system_id)?
                            .into_iter()
                            .map(|s| (s.response_id, s.raw_score))
                            .collect();
                        info!(
                            system_id = %system_id,
                            size = captured.len(),
                            "population snapshot taken"
                        );
                        entry.insert(captured)
                    }
                };
                Ok(Population::new(
                    snapshot
                        .iter()
                        .filter(|(id, _)| *id != response_id)
                        .map(|(_, raw)| *raw),
                ))
            }
        }
    }
}

fn belongs(definition: &SystemDefinition, response: &Response) -> bool {
    definition.system.questionnaire_id == response.questionnaire_id
}

fn find_system(catalog: &Catalog, system_id: ScoringSystemId) -> eyre::Result<&SystemDefinition> {
    catalog
        .system(system_id)
        .ok_or_else(|| eyre::eyre!("scoring system {system_id} is not in the catalog"))
}

/// Stored scores of one scoring system, described.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSummary {
    pub system_id: ScoringSystemId,
    pub name: String,
    pub population: PopulationSummary,
    /// One entry per configured range, ordered by lower bound.
    pub ranges: Vec<RangeCount>,
    /// Scores that fall in no configured range.
    pub unranged: usize,
    pub last_calculated_at: Option<jiff::Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCount {
    pub name: String,
    pub min_score: f64,
    pub max_score: f64,
    pub count: usize,
}

/// Summarise the scores stored for `system_id`. Scores are placed in the
/// catalog's current ranges, which may differ from the range stored with
/// the score if the ranges were edited since.
pub fn summarize(
    catalog: &Catalog,
    store: &dyn ScoreStore,
    system_id: ScoringSystemId,
) -> eyre::Result<SystemSummary> {
    let definition = find_system(catalog, system_id)?;
    let total_questions = catalog
        .questionnaire(definition.system.questionnaire_id)
        .map_or(0, |q| q.questions.len());
    let book = RuleBook::from_definition(definition, total_questions)?;
    let stored = store.scores_for(system_id)?;

    let mut counts: Vec<usize> = vec![0; book.ranges().len()];
    let mut unranged = 0;
    for score in &stored {
        let matched = match_range(score.raw_score, book.ranges())
            .and_then(|range| book.ranges().iter().position(|r| r.id == range.id));
        match matched {
            Some(index) => counts[index] += 1,
            None => unranged += 1,
        }
    }
    let ranges = book
        .ranges()
        .iter()
        .zip(counts)
        .map(|(r, count)| RangeCount {
            name: r.name.clone(),
            min_score: r.min_score,
            max_score: r.max_score,
            count,
        })
        .collect();

    Ok(SystemSummary {
        system_id,
        name: definition.system.name.clone(),
        population: Population::new(stored.iter().map(|s| s.raw_score)).summary(),
        ranges,
        unranged,
        last_calculated_at: stored.iter().map(|s| s.calculated_at).max(),
    })
}

/// Outcome of parsing and evaluating a formula outside of scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaCheck {
    pub formula: String,
    /// Names the formula reads, constants included.
    pub variables: Vec<String>,
    pub value: Option<f64>,
    pub error: Option<String>,
}

impl FormulaCheck {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse and evaluate `source` under the engine's formula limits.
pub fn check_formula(
    source: &str,
    variables: &BTreeMap<String, f64>,
    config: &EngineConfig,
) -> FormulaCheck {
    let formula = match Formula::parse(source, config.formula_max_length) {
        Ok(formula) => formula,
        Err(e) => {
            return FormulaCheck {
                formula: source.to_string(),
                variables: Vec::new(),
                value: None,
                error: Some(e.to_string()),
            };
        }
    };
    let names = formula.variables().into_iter().map(str::to_string).collect();
    let (value, error) = match formula.evaluate(variables, config.formula_step_limit) {
        Ok(value) => (Some(value), None),
        Err(e) => (None, Some(e.to_string())),
    };
    FormulaCheck {
        formula: source.to_string(),
        variables: names,
        value,
        error,
    }
}
