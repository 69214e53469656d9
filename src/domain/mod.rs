//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! All types are serializable; absent survey values are filled exactly once,
//! when a raw record is converted into a [`HealthRecord`].

mod features;
mod model;
mod prediction;
mod profile;
mod protection;
mod record;
mod text;

pub use features::{names as feature_names, FeatureVector};
pub use model::{FeatureImportance, FeatureStats, RiskModel};
pub(crate) use prediction::dedup_preserving_order;
pub use prediction::{clamp_score, PredictionResult, PredictionSource, RiskLevel, WhatIfScenario};
pub use profile::{PredictionInput, TextProfile, WorkerProfile};
pub use protection::{Equipment, ProtectionSet, ProtectionUsage, MAX_PROTECTION_SCORE};
pub use record::{HealthRecord, RawHealthRecord};
pub use text::{RelationRecord, RiskFactor, TermRecord, TextAnalysis};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case and strip diacritics so that keyword matching does not depend
/// on how a respondent typed accents ("épandage", "epandage", or a decomposed
/// `e` + U+0301).
#[must_use]
pub fn fold_accents(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// True if the accent-folded `haystack` contains any of the (ASCII) needles.
#[must_use]
pub fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    let folded = fold_accents(haystack);
    needles.iter().any(|n| folded.contains(n))
}
