//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and interchangeable backends (trained model,
//! rule cascade, remote prediction service, keyword catalogues).

mod keywords;
mod predictor;

pub use keywords::{KeywordExtractor, KeywordKind};
pub use predictor::{PredictorError, RiskPredictor};
