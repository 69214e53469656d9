//! # AgriRisk
//!
//! Occupational health risk scoring for agricultural workers.
//!
//! This crate provides:
//! - Term-frequency and co-occurrence mining over free-text survey answers
//! - Feature extraction from survey records and live worker profiles
//! - A batch-fitted linear risk model with a deterministic rule-based fallback
//! - A client for an optional remote prediction service
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (records, profiles, features, predictions)
//! - `ports`: Trait definitions for interchangeable predictors and extractors
//! - `adapters`: Concrete implementations (French NLP, datasets, HTTP, logging)
//! - `application`: Use cases orchestrating domain and ports

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{AssessmentService, FeatureExtractor, TextAnalyzer};
pub use config::AssessmentConfig;
pub use domain::{HealthRecord, PredictionInput, PredictionResult, RiskLevel, WorkerProfile};

/// Result type for AgriRisk operations
pub type Result<T> = std::result::Result<T, AgriRiskError>;

/// Main error type for AgriRisk
#[derive(Debug, thiserror::Error)]
pub enum AgriRiskError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] adapters::dataset::DatasetError),

    #[error("Model training failed: {0}")]
    Training(#[from] application::TrainingError),

    #[error("Prediction failed: {0}")]
    Predictor(#[from] ports::PredictorError),
}
