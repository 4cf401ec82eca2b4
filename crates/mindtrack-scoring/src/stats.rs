//! Population statistics used to place a raw score relative to earlier ones.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Percentile reported by the rank definition when there is no history.
pub const NEUTRAL_PERCENTILE: f64 = 50.0;

/// The raw scores previously recorded for one scoring system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    scores: Vec<f64>,
}

impl Population {
    /// Non-finite scores are discarded.
    pub fn new(scores: impl IntoIterator<Item = f64>) -> Self {
        Self {
            scores: scores.into_iter().filter(|s| s.is_finite()).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn mean(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        Some(self.scores.iter().sum::<f64>() / self.scores.len() as f64)
    }

    /// Population (not sample) standard deviation.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self
            .scores
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / self.scores.len() as f64;
        Some(variance.sqrt())
    }

    /// Mean and standard deviation with the division-by-zero guards applied:
    /// an empty population has mean 0, and a missing or zero deviation is
    /// treated as 1.
    pub fn moments(&self) -> (f64, f64) {
        let mean = self.mean().unwrap_or(0.0);
        let std_dev = match self.std_dev() {
            Some(sd) if sd > 0.0 => sd,
            _ => 1.0,
        };
        (mean, std_dev)
    }

    /// Unrounded z-score.
    pub fn z_score(&self, raw_score: f64) -> f64 {
        let (mean, std_dev) = self.moments();
        (raw_score - mean) / std_dev
    }

    /// Percentage of recorded scores strictly below `raw_score`, or
    /// [`NEUTRAL_PERCENTILE`] when nothing has been recorded yet.
    pub fn rank_percentile(&self, raw_score: f64) -> f64 {
        if self.scores.is_empty() {
            return NEUTRAL_PERCENTILE;
        }
        let below = self.scores.iter().filter(|&&s| s < raw_score).count();
        below as f64 / self.scores.len() as f64 * 100.0
    }

    pub fn summary(&self) -> PopulationSummary {
        PopulationSummary {
            count: self.scores.len(),
            mean: self.mean().map(round2),
            std_dev: self.std_dev().map(round2),
            min: self.scores.iter().copied().reduce(f64::min),
            max: self.scores.iter().copied().reduce(f64::max),
        }
    }
}

/// Descriptive statistics of a population, for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PopulationSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A raw score's position relative to its population, rounded for storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub z_score: f64,
    /// Derived from the z-score through the standard normal CDF.
    pub percentile: f64,
}

/// Compute the rounded z-score and CDF-derived percentile of `raw_score`.
pub fn normalize(raw_score: f64, population: &Population) -> Normalized {
    let z = population.z_score(raw_score);
    Normalized {
        z_score: round2(z),
        percentile: round2(normal_cdf_percentile(z)),
    }
}

/// `100 × Φ(z)`, the percentile a z-score corresponds to under a standard
/// normal distribution.
pub fn normal_cdf_percentile(z: f64) -> f64 {
    let p = 100.0 * (0.5 + 0.5 * erf(z / std::f64::consts::SQRT_2));
    p.clamp(0.0, 100.0)
}

/// Round to two decimal places. Values too large to scale are already whole.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Error function, Abramowitz and Stegun 7.1.26 (max error 1.5e-7).
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
