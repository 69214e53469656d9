//! Trained linear risk model.
//!
//! A `RiskModel` is produced once per dataset load and is read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::features::FeatureVector;

/// Per-feature statistics gathered over the training matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FeatureStats {
    /// Compute statistics over a column. An empty column yields all zeros.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
            };
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Self { min, max, mean }
    }

    /// Min-max scale a value. Constant features scale to 0.
    ///
    /// Values outside the training range are not clipped; the linear model
    /// extrapolates and the final score is clamped instead.
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            0.0
        } else {
            (value - self.min) / range
        }
    }
}

/// Relative weight magnitude of one feature, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Linear model over min-max scaled features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskModel {
    pub weights: BTreeMap<String, f64>,
    pub intercept: f64,
    pub feature_scaling: BTreeMap<String, FeatureStats>,

    /// Sorted by descending importance
    pub importance: Vec<FeatureImportance>,

    pub mean_absolute_error: f64,
    pub root_mean_squared_error: f64,
    pub r_squared: f64,

    /// Percentage of training predictions within 10 points of the target
    pub accuracy: f64,

    pub training_samples: usize,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

impl RiskModel {
    /// Scale a raw feature vector with the stored statistics.
    /// Features the model has no statistics for are dropped.
    #[must_use]
    pub fn scale(&self, features: &FeatureVector) -> FeatureVector {
        let mut scaled = FeatureVector::new();
        for (name, stats) in &self.feature_scaling {
            scaled.set(name, stats.scale(features.get(name)));
        }
        scaled
    }

    /// `intercept + Σ weight · feature` over already scaled features.
    #[must_use]
    pub fn linear_score(&self, scaled: &FeatureVector) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .map(|(name, w)| w * scaled.get(name))
                .sum::<f64>()
    }

    /// Overall risk for raw features, clamped to `[0, 100]`.
    #[must_use]
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let raw = self.linear_score(&self.scale(features));
        if raw.is_finite() {
            raw.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Half-width of the confidence interval: `MAE × (100 − accuracy) / 50`.
    #[must_use]
    pub fn confidence_margin(&self) -> f64 {
        (self.mean_absolute_error * (100.0 - self.accuracy) / 50.0).max(0.0)
    }

    /// The `n` most important features.
    #[must_use]
    pub fn top_features(&self, n: usize) -> &[FeatureImportance] {
        &self.importance[..n.min(self.importance.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(weights: &[(&str, f64)], intercept: f64) -> RiskModel {
        let mut w = BTreeMap::new();
        let mut scaling = BTreeMap::new();
        for (name, weight) in weights {
            w.insert((*name).to_string(), *weight);
            scaling.insert(
                (*name).to_string(),
                FeatureStats {
                    min: 0.0,
                    max: 10.0,
                    mean: 5.0,
                },
            );
        }
        RiskModel {
            weights: w,
            intercept,
            feature_scaling: scaling,
            importance: Vec::new(),
            mean_absolute_error: 4.0,
            root_mean_squared_error: 5.0,
            r_squared: 0.8,
            accuracy: 75.0,
            training_samples: 10,
            trained_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_stats_and_scaling() {
        let stats = FeatureStats::from_values(&[2.0, 4.0, 6.0]);
        assert!((stats.min - 2.0).abs() < f64::EPSILON);
        assert!((stats.max - 6.0).abs() < f64::EPSILON);
        assert!((stats.mean - 4.0).abs() < f64::EPSILON);
        assert!((stats.scale(4.0) - 0.5).abs() < f64::EPSILON);

        let constant = FeatureStats::from_values(&[3.0, 3.0]);
        assert!((constant.scale(3.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_clamped() {
        let model = model_with(&[("age", 200.0)], 10.0);
        let mut features = FeatureVector::new();
        features.set("age", 10.0);
        assert!((model.score(&features) - 100.0).abs() < f64::EPSILON);

        let negative = model_with(&[("age", -200.0)], 0.0);
        assert!((negative.score(&features) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_linear_score() {
        let model = model_with(&[("age", 20.0), ("children", 10.0)], 5.0);
        let mut features = FeatureVector::new();
        features.set("age", 5.0); // scaled 0.5
        features.set("children", 10.0); // scaled 1.0
        assert!((model.score(&features) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_margin() {
        let model = model_with(&[], 0.0);
        // 4 * (100 - 75) / 50 = 2
        assert!((model.confidence_margin() - 2.0).abs() < 1e-9);
    }
}
