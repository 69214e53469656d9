//! Prediction result types.
//!
//! Field names follow the remote prediction service's JSON so a remote
//! response deserialises straight into [`PredictionResult`].

use serde::{Deserialize, Serialize};

use super::model::FeatureImportance;
use super::text::RiskFactor;

/// Risk level classification of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Overall risk below 30
    #[default]
    Low,
    /// Overall risk from 30 to below 60
    Moderate,
    /// Overall risk 60 and above
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 60.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Standard precautions",
            Self::Moderate => "Moderate risk - Improve protection and follow-up",
            Self::High => "High risk - Medical follow-up advised",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Which predictor produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Trained linear model
    Model,
    /// Deterministic rule cascade
    #[default]
    Rules,
    /// Remote prediction service
    Remote,
}

/// A hypothetical re-scoring under a modified input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    pub label: String,
    pub score: f64,
}

/// Output of every predictor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionResult {
    pub overall_risk: f64,
    pub respiratory_risk: f64,
    pub skin_risk: f64,
    pub neurological_risk: f64,

    /// `[low, high]` bounds around `overall_risk`
    pub confidence_interval: [f64; 2],

    pub feature_importance: Vec<FeatureImportance>,

    /// Human-readable explanations
    pub risk_factors: Vec<String>,

    pub recommendations: Vec<String>,
    pub what_if_scenarios: Vec<WhatIfScenario>,

    /// Text-analysis risk factors relevant to this worker's exposures
    pub matched_risk_factors: Vec<RiskFactor>,

    pub risk_level: RiskLevel,
    pub source: PredictionSource,
}

impl PredictionResult {
    /// Bring a result into canonical form: risks clamped to `[0, 100]` and
    /// rounded, interval ordered and clamped, risk level recomputed, duplicate
    /// strings removed.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.overall_risk = clamp_score(self.overall_risk);
        self.respiratory_risk = clamp_score(self.respiratory_risk);
        self.skin_risk = clamp_score(self.skin_risk);
        self.neurological_risk = clamp_score(self.neurological_risk);

        let [a, b] = self.confidence_interval;
        let (lo, hi) = (clamp_score(a.min(b)), clamp_score(a.max(b)));
        self.confidence_interval = [lo, hi];

        for scenario in &mut self.what_if_scenarios {
            scenario.score = clamp_score(scenario.score);
        }

        dedup_preserving_order(&mut self.risk_factors);
        dedup_preserving_order(&mut self.recommendations);
        self.risk_level = RiskLevel::from_score(self.overall_risk);
        self
    }

    /// Each of the four risks lies in `[0, 100]`.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        [
            self.overall_risk,
            self.respiratory_risk,
            self.skin_risk,
            self.neurological_risk,
        ]
        .iter()
        .all(|v| (0.0..=100.0).contains(v))
    }
}

/// Clamp to `[0, 100]` and round to a whole number; NaN becomes 0.
#[must_use]
pub fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0).round()
    } else {
        0.0
    }
}

pub(crate) fn dedup_preserving_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}
