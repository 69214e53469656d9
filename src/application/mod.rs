//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application: survey text analysis, feature
//! extraction, model fitting and risk prediction.

mod assessment;
mod features;
mod intake;
mod scoring;
mod text_analysis;
mod training;

pub use assessment::AssessmentService;
pub use features::{age_group, work_intensity, FeatureExtractor};
pub use intake::profile_from_text;
pub use scoring::{
    match_risk_factors, Cascade, CategoryRisks, ModelPredictor, RulePredictor, ScoringContext,
};
pub use text_analysis::TextAnalyzer;
pub use training::{risk_score, ModelTrainer, TrainingError};
