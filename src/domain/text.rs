//! Text-analysis output types.

use serde::{Deserialize, Serialize};

/// A stemmed term and how many records mention it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub count: u32,
}

/// Co-occurrence of a health term and a chemical term in one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub health_term: String,
    pub chemical_term: String,
    pub count: u32,
}

/// Ranked view of a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub health_issue: String,
    pub exposure: String,
    pub occurrence_count: u32,

    /// `occurrence_count` relative to the most frequent relation, 0 to 100
    pub risk_score: f64,

    /// `risk_score` adjusted by health severity and chemical hazard, capped at 100
    pub weighted_score: f64,
}

/// Result of one analysis pass; every list is sorted by descending count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub health_terms: Vec<TermRecord>,
    pub chemical_terms: Vec<TermRecord>,
    pub task_terms: Vec<TermRecord>,
    pub relations: Vec<RelationRecord>,
}

impl TextAnalysis {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.health_terms.is_empty()
            && self.chemical_terms.is_empty()
            && self.task_terms.is_empty()
            && self.relations.is_empty()
    }
}
