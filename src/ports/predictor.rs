//! Risk predictor port.
//!
//! Every way of producing a [`PredictionResult`] (trained model, rule cascade,
//! remote service) sits behind this trait. Callers pick an implementation by
//! availability instead of branching on fallback flags.

use crate::domain::{PredictionInput, PredictionResult};

/// Errors that can occur while predicting.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("Predictor unavailable: {0}")]
    Unavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trait for risk predictors.
pub trait RiskPredictor: Send + Sync {
    /// Score a worker profile.
    ///
    /// # Errors
    ///
    /// Local predictors only fail on unusable input; the remote predictor also
    /// fails on transport and protocol errors.
    fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, PredictorError>;

    /// Whether the predictor can currently serve requests.
    fn is_available(&self) -> bool {
        true
    }

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
