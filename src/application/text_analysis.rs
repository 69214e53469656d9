//! Text analysis over survey records.
//!
//! Counts how many records mention each health, chemical and task term, and
//! how often a health term and a chemical term appear in the same record.

use std::collections::HashMap;

use crate::adapters::nlp::{self, Lexicon};
use crate::domain::{
    fold_accents, HealthRecord, RelationRecord, RiskFactor, TermRecord, TextAnalysis,
};

/// Severity weight of a health term; unlisted terms weigh 1.
const HEALTH_SEVERITY: &[(&str, f64)] = &[
    ("respiratoire", 1.5),
    ("pulmonaire", 1.5),
    ("dyspnee", 1.3),
    ("asthme", 1.4),
    ("toux", 1.2),
    ("palpitations", 1.4),
    ("cardio", 1.4),
    ("hypertension", 1.3),
    ("cephalees", 1.1),
    ("vertiges", 1.2),
    ("paresthesies", 1.3),
    ("convulsions", 1.5),
    ("neurologique", 1.4),
    ("cognitif", 1.3),
    ("memoire", 1.2),
    ("dermatite", 1.1),
    ("irritation", 1.0),
    ("cutane", 1.0),
    ("eczema", 1.1),
    ("erytheme", 1.0),
];

/// Hazard weight of a chemical term; unlisted terms weigh 1.
const CHEMICAL_HAZARD: &[(&str, f64)] = &[
    ("pesticide", 1.8),
    ("herbicide", 1.5),
    ("insecticide", 1.7),
    ("fongicide", 1.4),
    ("nematicide", 1.6),
    ("glyphosate", 1.7),
    ("paraquat", 1.8),
    ("engrais", 1.2),
    ("chimique", 1.3),
    ("organique", 0.8),
    ("ammoniac", 1.4),
    ("nitrate", 1.3),
    ("phosphore", 1.2),
    ("potasse", 1.1),
];

/// Health/chemical pairs never counted as relations.
const EXCLUDED_RELATIONS: &[(&str, &str)] = &[("cutané", "chimique")];

const WEIGHTED_BASE: f64 = 60.0;

/// Mines free-text survey answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAnalyzer;

impl TextAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Count terms and health/chemical co-occurrences over `records`.
    ///
    /// A term counts once per record, so every count is a number of records.
    #[must_use]
    pub fn analyze(&self, records: &[HealthRecord]) -> TextAnalysis {
        let mut health = HashMap::<String, u32>::new();
        let mut chemical = HashMap::<String, u32>::new();
        let mut task = HashMap::<String, u32>::new();
        let mut relations = HashMap::<(String, String), u32>::new();

        for record in records {
            let health_terms = nlp::normalize_terms(&record.health_text(), Some(Lexicon::health()));
            let chemical_terms =
                nlp::normalize_terms(&record.chemical_text(), Some(Lexicon::chemical()));
            let task_terms = nlp::normalize_terms(&record.tasks, Some(Lexicon::task()));

            for term in &health_terms {
                *health.entry(term.clone()).or_default() += 1;
            }
            for term in &chemical_terms {
                *chemical.entry(term.clone()).or_default() += 1;
            }
            for term in &task_terms {
                *task.entry(term.clone()).or_default() += 1;
            }

            for h in &health_terms {
                for c in &chemical_terms {
                    if EXCLUDED_RELATIONS.contains(&(h.as_str(), c.as_str())) {
                        continue;
                    }
                    *relations.entry((h.clone(), c.clone())).or_default() += 1;
                }
            }
        }

        let analysis = TextAnalysis {
            health_terms: ranked_terms(health),
            chemical_terms: ranked_terms(chemical),
            task_terms: ranked_terms(task),
            relations: ranked_relations(relations),
        };

        tracing::debug!(
            records = records.len(),
            health_terms = analysis.health_terms.len(),
            chemical_terms = analysis.chemical_terms.len(),
            task_terms = analysis.task_terms.len(),
            relations = analysis.relations.len(),
            "Text analysis complete"
        );
        analysis
    }

    /// The `limit` most frequent relations as risk factors.
    #[must_use]
    pub fn top_risk_factors(&self, analysis: &TextAnalysis, limit: usize) -> Vec<RiskFactor> {
        let Some(max_count) = analysis.relations.iter().map(|r| r.count).max() else {
            return Vec::new();
        };
        let max_count = f64::from(max_count.max(1));

        analysis
            .relations
            .iter()
            .take(limit)
            .map(|relation| {
                let ratio = f64::from(relation.count) / max_count;
                let weighted = ratio
                    * WEIGHTED_BASE
                    * weight(HEALTH_SEVERITY, &relation.health_term)
                    * weight(CHEMICAL_HAZARD, &relation.chemical_term);
                RiskFactor {
                    health_issue: relation.health_term.clone(),
                    exposure: relation.chemical_term.clone(),
                    occurrence_count: relation.count,
                    risk_score: (ratio * 100.0).round(),
                    weighted_score: weighted.round().min(100.0),
                }
            })
            .collect()
    }

    /// Reduce free text to canonical terms without any domain vocabulary.
    #[must_use]
    pub fn normalize_terms(&self, text: &str) -> Vec<String> {
        nlp::normalize_terms(text, None)
    }
}

fn weight(table: &[(&str, f64)], term: &str) -> f64 {
    let folded = fold_accents(term);
    table
        .iter()
        .find(|(name, _)| *name == folded)
        .map_or(1.0, |(_, w)| *w)
}

fn ranked_terms(counts: HashMap<String, u32>) -> Vec<TermRecord> {
    let mut terms: Vec<TermRecord> = counts
        .into_iter()
        .map(|(term, count)| TermRecord { term, count })
        .collect();
    terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    terms
}

fn ranked_relations(counts: HashMap<(String, String), u32>) -> Vec<RelationRecord> {
    let mut relations: Vec<RelationRecord> = counts
        .into_iter()
        .map(|((health_term, chemical_term), count)| RelationRecord {
            health_term,
            chemical_term,
            count,
        })
        .collect();
    relations.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.health_term.cmp(&b.health_term))
            .then_with(|| a.chemical_term.cmp(&b.chemical_term))
    });
    relations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(health: &str, chemicals: &str, tasks: &str) -> HealthRecord {
        HealthRecord {
            cardio_respiratory: health.into(),
            chemicals: chemicals.into(),
            tasks: tasks.into(),
            ..Default::default()
        }
    }

    fn term_set(terms: &[TermRecord]) -> BTreeSet<&str> {
        terms.iter().map(|t| t.term.as_str()).collect()
    }

    fn count_of(terms: &[TermRecord], term: &str) -> Option<u32> {
        terms.iter().find(|t| t.term == term).map(|t| t.count)
    }

    #[test]
    fn test_analyze_empty() {
        let analysis = TextAnalyzer::new().analyze(&[]);
        assert!(analysis.health_terms.is_empty());
        assert!(analysis.chemical_terms.is_empty());
        assert!(analysis.task_terms.is_empty());
        assert!(analysis.relations.is_empty());
        assert!(analysis.is_empty());
    }

    #[test]
    fn test_analyze_counts_records() {
        let records = vec![
            record("toux, toux sèche et dyspnée", "pesticides", "épandage"),
            record("toux", "pesticides, herbicides", "cueillette"),
            record("", "engrais", ""),
        ];
        let analysis = TextAnalyzer::new().analyze(&records);

        // Repeated within one record, counted once.
        assert_eq!(count_of(&analysis.health_terms, "toux"), Some(2));
        assert_eq!(count_of(&analysis.health_terms, "dyspnée"), Some(1));
        assert_eq!(count_of(&analysis.chemical_terms, "pesticide"), Some(2));
        assert_eq!(count_of(&analysis.chemical_terms, "engrais"), Some(1));
        assert_eq!(count_of(&analysis.task_terms, "épandage"), Some(1));

        assert_eq!(analysis.health_terms[0].term, "toux");
        assert_eq!(analysis.chemical_terms[0].term, "pesticide");
    }

    #[test]
    fn test_relations_cross_product() {
        let records = vec![
            record("toux et dyspnée", "pesticides, herbicides", ""),
            record("toux", "pesticides", ""),
            record("dyspnée", "", ""),
        ];
        let analysis = TextAnalyzer::new().analyze(&records);

        assert_eq!(analysis.relations.len(), 4);
        let top = &analysis.relations[0];
        assert_eq!(
            (top.health_term.as_str(), top.chemical_term.as_str(), top.count),
            ("toux", "pesticide", 2)
        );
        assert!(analysis.relations.iter().all(|r| r.count >= 1));
        assert!(analysis
            .relations
            .windows(2)
            .all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_excluded_relation() {
        let records = vec![HealthRecord {
            skin: "irritation de la peau".into(),
            chemicals: "produits chimiques".into(),
            ..Default::default()
        }];
        let analysis = TextAnalyzer::new().analyze(&records);
        assert!(analysis
            .relations
            .iter()
            .all(|r| !(r.health_term == "cutané" && r.chemical_term == "chimique")));
        assert!(analysis
            .relations
            .iter()
            .any(|r| r.health_term == "irritation" && r.chemical_term == "chimique"));
    }

    #[test]
    fn test_non_string_fields_contribute_nothing() {
        let value = serde_json::json!({
            "Troubles cardio-respiratoires": 42,
            "Produits chimiques utilisés": null,
            "Tâches effectuées": ["liste"]
        });
        let record = HealthRecord::from_json(value).expect("Should coerce fields");
        let analysis = TextAnalyzer::new().analyze(&[record]);
        assert!(analysis.is_empty());
    }

    #[test]
    fn test_top_risk_factors() {
        let records = vec![
            record("toux", "pesticides", ""),
            record("toux", "pesticides", ""),
            record("toux", "pesticides", ""),
            record("toux", "pesticides", ""),
            record("dermatite", "engrais", ""),
        ];
        let analyzer = TextAnalyzer::new();
        let analysis = analyzer.analyze(&records);
        let factors = analyzer.top_risk_factors(&analysis, 10);

        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].health_issue, "toux");
        assert_eq!(factors[0].exposure, "pesticide");
        assert!((factors[0].risk_score - 100.0).abs() < f64::EPSILON);
        // 60 × 1.2 × 1.8 = 129.6, capped
        assert!((factors[0].weighted_score - 100.0).abs() < f64::EPSILON);

        assert!((factors[1].risk_score - 25.0).abs() < f64::EPSILON);
        // 0.25 × 60 × 1.1 × 1.2 = 19.8
        assert!((factors[1].weighted_score - 20.0).abs() < f64::EPSILON);

        assert_eq!(analyzer.top_risk_factors(&analysis, 1).len(), 1);
        assert!(analyzer
            .top_risk_factors(&TextAnalysis::default(), 5)
            .is_empty());
    }

    #[test]
    fn test_reanalysis_of_terms_is_stable() {
        let raw = vec![record(
            "céphalées fréquentes, vertiges, toux",
            "pesticides, engrais chimiques",
            "épandage et désherbage",
        )];
        let analyzer = TextAnalyzer::new();
        let first = analyzer.analyze(&raw);

        let joined = |terms: &[TermRecord]| {
            terms.iter().map(|t| t.term.clone()).collect::<Vec<_>>().join(" ")
        };
        let processed = vec![record(
            &joined(&first.health_terms),
            &joined(&first.chemical_terms),
            &joined(&first.task_terms),
        )];
        let second = analyzer.analyze(&processed);

        assert_eq!(term_set(&first.health_terms), term_set(&second.health_terms));
        assert_eq!(term_set(&first.chemical_terms), term_set(&second.chemical_terms));
        assert_eq!(term_set(&first.task_terms), term_set(&second.task_terms));
        assert_eq!(first.relations, second.relations);
    }

    #[test]
    fn test_normalize_terms_without_lexicon() {
        let terms = TextAnalyzer::new().normalize_terms("Fatigue et fatigues générales");
        assert_eq!(terms.len(), 2);
    }
}
