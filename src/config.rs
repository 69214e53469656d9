//! Runtime configuration.
//!
//! Every value has a default; environment variables override them
//! best-effort (unparseable or out-of-range values are ignored).

use std::time::Duration;

/// Batch gradient-descent settings for the linear risk model.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Number of full-batch iterations
    pub iterations: usize,

    /// Base learning rate, decayed as `rate / (1 + i / 500)`
    pub learning_rate: f64,

    /// L2 penalty applied to the weight gradient (not the intercept)
    pub l2_penalty: f64,

    /// Initial weights are drawn uniformly from `[-init_range, init_range]`
    pub init_range: f64,

    /// Fixed RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            learning_rate: 0.01,
            l2_penalty: 0.01,
            init_range: 0.05,
            seed: None,
        }
    }
}

/// Remote prediction service settings.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL such as `http://localhost:8000`; `None` disables the remote path
    pub base_url: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_millis(2000),
        }
    }
}

/// Top-level configuration for [`crate::AssessmentService`].
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub training: TrainingConfig,
    pub remote: RemoteConfig,

    /// How many ranked risk factors to keep from text analysis
    pub risk_factor_limit: usize,

    /// How many of those may be attached to a single prediction
    pub matched_factor_limit: usize,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            training: TrainingConfig::default(),
            remote: RemoteConfig::default(),
            risk_factor_limit: 10,
            matched_factor_limit: 3,
        }
    }
}

impl AssessmentConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - AGRIRISK_TRAIN_ITERATIONS
    /// - AGRIRISK_TRAIN_LEARNING_RATE
    /// - AGRIRISK_TRAIN_L2
    /// - AGRIRISK_TRAIN_SEED
    /// - AGRIRISK_RISK_FACTOR_LIMIT
    /// - AGRIRISK_REMOTE_URL
    /// - AGRIRISK_REMOTE_TIMEOUT_MS
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env_or_default`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(x) = parse_var::<usize, _>(&lookup, "AGRIRISK_TRAIN_ITERATIONS") {
            if x > 0 {
                cfg.training.iterations = x;
            }
        }

        if let Some(x) = parse_var::<f64, _>(&lookup, "AGRIRISK_TRAIN_LEARNING_RATE") {
            if x.is_finite() && x > 0.0 {
                cfg.training.learning_rate = x;
            }
        }

        if let Some(x) = parse_var::<f64, _>(&lookup, "AGRIRISK_TRAIN_L2") {
            if x.is_finite() && x >= 0.0 {
                cfg.training.l2_penalty = x;
            }
        }

        if let Some(x) = parse_var::<u64, _>(&lookup, "AGRIRISK_TRAIN_SEED") {
            cfg.training.seed = Some(x);
        }

        if let Some(x) = parse_var::<usize, _>(&lookup, "AGRIRISK_RISK_FACTOR_LIMIT") {
            if x > 0 {
                cfg.risk_factor_limit = x;
            }
        }

        if let Some(v) = lookup("AGRIRISK_REMOTE_URL") {
            let v = v.trim().trim_end_matches('/');
            if v.starts_with("http://") || v.starts_with("https://") {
                cfg.remote.base_url = Some(v.to_string());
            }
        }

        if let Some(x) = parse_var::<u64, _>(&lookup, "AGRIRISK_REMOTE_TIMEOUT_MS") {
            if x > 0 {
                cfg.remote.timeout = Duration::from_millis(x);
            }
        }

        cfg
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}
