//! Keyword extraction port.

use serde::{Deserialize, Serialize};

use super::PredictorError;

/// Keyword catalogue to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Chemical,
    Task,
    Health,
    Protection,
}

impl KeywordKind {
    /// Query-string value understood by the remote service.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chemical => "chemical",
            Self::Task => "task",
            Self::Health => "health",
            Self::Protection => "protection",
        }
    }
}

impl std::fmt::Display for KeywordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for extracting canonical keywords from free text.
pub trait KeywordExtractor: Send + Sync {
    /// Return the canonical keywords of `kind` found in `text`, without
    /// duplicates. Empty text yields an empty list.
    ///
    /// # Errors
    ///
    /// Only remote extractors fail.
    fn extract(&self, text: &str, kind: KeywordKind) -> Result<Vec<String>, PredictorError>;
}
