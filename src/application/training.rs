//! Batch fitting of the linear risk model.
//!
//! Targets are produced by a fixed additive rule ([`risk_score`]) and the
//! model learns to reproduce them from min-max scaled features.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::features::FeatureExtractor;
use crate::config::TrainingConfig;
use crate::domain::{
    fold_accents, FeatureImportance, FeatureStats, FeatureVector, HealthRecord, RiskModel,
};

/// Predictions within this many points of the target count as accurate.
const ACCURACY_TOLERANCE: f64 = 10.0;

/// Learning rate halves after this many iterations.
const DECAY_ITERATIONS: f64 = 500.0;

/// Errors that can occur while fitting.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("No records to train on")]
    EmptyDataset,

    #[error("Records produced no features")]
    NoFeatures,

    #[error("Gradient descent diverged at iteration {0}")]
    Diverged(usize),
}

/// Reference risk score of a survey record, in `[0, 100]`.
///
/// Deterministic: the same record always yields the same score.
#[must_use]
pub fn risk_score(record: &HealthRecord) -> f64 {
    let mut score = 0.0;

    let complaints = [
        (&record.cardio_respiratory, 25.0),
        (&record.cognitive, 20.0),
        (&record.neurological, 25.0),
        (&record.skin, 20.0),
    ];
    for (text, points) in complaints {
        if !text.trim().is_empty() {
            score += points;
        }
    }

    if record.has_hypertension() {
        score += 10.0;
    }

    if record.age > 50.0 {
        score += 10.0;
    } else if record.age > 40.0 {
        score += 5.0;
    }

    if record.work_experience < 3.0 {
        score += 10.0;
    } else if record.work_experience > 15.0 {
        score += 8.0;
    }

    let protection = record.protection.percent();
    if protection < 30.0 {
        score += 15.0;
    } else if protection < 50.0 {
        score += 10.0;
    } else if protection < 70.0 {
        score += 5.0;
    } else if protection >= 90.0 {
        score -= 10.0;
    } else if protection >= 80.0 {
        score -= 5.0;
    }

    let chemicals = fold_accents(&record.chemicals);
    for (family, points) in [
        ("pesticide", 12.0),
        ("herbicide", 10.0),
        ("insecticide", 10.0),
        ("fongicide", 8.0),
    ] {
        if chemicals.contains(family) {
            score += points;
        }
    }

    let weekly = record.weekly_hours();
    if weekly > 60.0 {
        score += 15.0;
    } else if weekly > 48.0 {
        score += 10.0;
    } else if weekly > 40.0 {
        score += 5.0;
    }

    let tasks = fold_accents(&record.tasks);
    if tasks.contains("epand") || tasks.contains("pulveris") {
        score += 10.0;
    }
    if tasks.contains("trait") {
        score += 8.0;
    }
    if tasks.contains("desherb") {
        score += 7.0;
    }

    f64::clamp(score, 0.0, 100.0)
}

/// Fits [`RiskModel`]s by full-batch gradient descent.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainingConfig,
    extractor: FeatureExtractor,
}

impl ModelTrainer {
    #[must_use]
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Fit a model on `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if `records` is empty, if no features were extracted,
    /// or if the weights stop being finite.
    pub fn fit(&self, records: &[HealthRecord]) -> Result<RiskModel, TrainingError> {
        if records.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        let raw: Vec<FeatureVector> = records.iter().map(|r| self.extractor.from_record(r)).collect();
        let targets: Vec<f64> = records.iter().map(risk_score).collect();

        let names: Vec<String> = raw[0].names().map(str::to_string).collect();
        if names.is_empty() {
            return Err(TrainingError::NoFeatures);
        }

        let feature_scaling: BTreeMap<String, FeatureStats> = names
            .iter()
            .map(|name| {
                let column: Vec<f64> = raw.iter().map(|v| v.get(name)).collect();
                (name.clone(), FeatureStats::from_values(&column))
            })
            .collect();

        // Row-major scaled matrix in `names` order.
        let matrix: Vec<Vec<f64>> = raw
            .iter()
            .map(|v| {
                names
                    .iter()
                    .map(|name| feature_scaling[name].scale(v.get(name)))
                    .collect()
            })
            .collect();

        tracing::info!(
            samples = records.len(),
            features = names.len(),
            iterations = self.config.iterations,
            "Fitting risk model"
        );

        let (weights, intercept) = self.descend(&matrix, &targets)?;

        let predictions: Vec<f64> = matrix
            .iter()
            .map(|row| predict_row(&weights, intercept, row).clamp(0.0, 100.0))
            .collect();
        let metrics = Metrics::compute(&predictions, &targets);

        let max_weight = weights.iter().map(|w| w.abs()).fold(0.0, f64::max);
        let mut importance: Vec<FeatureImportance> = names
            .iter()
            .zip(&weights)
            .map(|(name, w)| FeatureImportance {
                feature: name.clone(),
                importance: if max_weight > 0.0 { w.abs() / max_weight } else { 0.0 },
            })
            .collect();
        importance.sort_by(|a, b| {
            b.importance
                .total_cmp(&a.importance)
                .then_with(|| a.feature.cmp(&b.feature))
        });

        let model = RiskModel {
            weights: names.iter().cloned().zip(weights).collect(),
            intercept,
            feature_scaling,
            importance,
            mean_absolute_error: metrics.mae,
            root_mean_squared_error: metrics.rmse,
            r_squared: metrics.r_squared,
            accuracy: metrics.accuracy,
            training_samples: records.len(),
            trained_at: chrono::Utc::now(),
        };

        tracing::info!(
            mae = format!("{:.2}", model.mean_absolute_error),
            rmse = format!("{:.2}", model.root_mean_squared_error),
            r_squared = format!("{:.3}", model.r_squared),
            accuracy = format!("{:.1}", model.accuracy),
            "Risk model trained"
        );
        Ok(model)
    }

    fn rng(&self) -> ChaCha20Rng {
        match self.config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }

    fn descend(&self, matrix: &[Vec<f64>], targets: &[f64]) -> Result<(Vec<f64>, f64), TrainingError> {
        let n = matrix.len() as f64;
        let width = matrix.first().map_or(0, Vec::len);
        let range = self.config.init_range.abs();

        let mut rng = self.rng();
        let mut weights: Vec<f64> = (0..width)
            .map(|_| if range > 0.0 { rng.gen_range(-range..=range) } else { 0.0 })
            .collect();
        let mut intercept = 0.0;

        let mut grad_w = vec![0.0; width];
        for iteration in 0..self.config.iterations {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for (row, target) in matrix.iter().zip(targets) {
                let error = predict_row(&weights, intercept, row) - target;
                grad_b += error;
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += error * x;
                }
            }

            let rate = self.config.learning_rate / (1.0 + iteration as f64 / DECAY_ITERATIONS);
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= rate * (g / n + self.config.l2_penalty * *w);
            }
            intercept -= rate * grad_b / n;

            if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                tracing::warn!(iteration, "Weights are no longer finite");
                return Err(TrainingError::Diverged(iteration));
            }
        }

        Ok((weights, intercept))
    }
}

fn predict_row(weights: &[f64], intercept: f64, row: &[f64]) -> f64 {
    intercept + weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>()
}

struct Metrics {
    mae: f64,
    rmse: f64,
    r_squared: f64,
    accuracy: f64,
}

impl Metrics {
    fn compute(predictions: &[f64], targets: &[f64]) -> Self {
        let n = targets.len().max(1) as f64;
        let mean_target = targets.iter().sum::<f64>() / n;

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut total_sq = 0.0;
        let mut accurate = 0usize;
        for (p, t) in predictions.iter().zip(targets) {
            let error = p - t;
            abs_sum += error.abs();
            sq_sum += error * error;
            total_sq += (t - mean_target).powi(2);
            if error.abs() <= ACCURACY_TOLERANCE {
                accurate += 1;
            }
        }

        let r_squared = if total_sq > 0.0 {
            1.0 - sq_sum / total_sq
        } else if sq_sum == 0.0 {
            1.0
        } else {
            0.0
        };

        Self {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            r_squared,
            accuracy: accurate as f64 / n * 100.0,
        }
    }
}
