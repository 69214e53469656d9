//! Local keyword extractor backed by fixed catalogues.
//!
//! Used when no remote service is configured, or when it fails.

use crate::domain::fold_accents;
use crate::ports::{KeywordExtractor, KeywordKind, PredictorError};

/// Canonical keyword and the accent-folded fragments that reveal it.
type Catalogue = &'static [(&'static str, &'static [&'static str])];

const CHEMICALS: Catalogue = &[
    ("pesticide", &["pesticid", "phytosanitaire"]),
    ("herbicide", &["herbicid", "desherbant", "glyphosate", "roundup", "paraquat"]),
    ("fongicide", &["fongicid", "fongique"]),
    ("insecticide", &["insecticid"]),
    ("engrais chimique", &["engrais"]),
];

const TASKS: Catalogue = &[
    ("épandage", &["epand"]),
    ("traitement", &["traitement", "pulveris"]),
    ("récolte", &["recolt", "cueil"]),
    ("désherbage", &["desherb", "sarcl"]),
    ("taille", &["taille"]),
];

const HEALTH: Catalogue = &[
    ("respiratoire", &["respir", "toux", "poumon", "pulmon", "asthm", "dyspn", "bronch"]),
    ("cutané", &["peau", "cutan", "dermat", "irrit", "eczema", "prurit", "demang"]),
    ("neurologique", &["neuro", "cephal", "migrain", "vertig", "tremble", "paresthes"]),
    ("cognitif", &["cognit", "memoire", "concentration", "oubli", "confusion"]),
    ("allergie", &["allerg"]),
];

const PROTECTION: Catalogue = &[
    ("masque", &["masque", "mask"]),
    ("gants", &["gant", "glove"]),
    ("bottes", &["botte", "boot"]),
    ("casquette", &["casquette", "mdhalla", "chapeau"]),
    ("manteau", &["manteau", "combinaison", "tablier", "coat"]),
];

/// Keyword extractor over the built-in catalogues.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogueKeywordExtractor;

impl CatalogueKeywordExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Infallible form of [`KeywordExtractor::extract`].
    #[must_use]
    pub fn find(&self, text: &str, kind: KeywordKind) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let folded = fold_accents(text);
        catalogue(kind)
            .iter()
            .filter(|(_, needles)| needles.iter().any(|n| folded.contains(n)))
            .map(|(keyword, _)| (*keyword).to_string())
            .collect()
    }
}

impl KeywordExtractor for CatalogueKeywordExtractor {
    fn extract(&self, text: &str, kind: KeywordKind) -> Result<Vec<String>, PredictorError> {
        Ok(self.find(text, kind))
    }
}

fn catalogue(kind: KeywordKind) -> Catalogue {
    match kind {
        KeywordKind::Chemical => CHEMICALS,
        KeywordKind::Task => TASKS,
        KeywordKind::Health => HEALTH,
        KeywordKind::Protection => PROTECTION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chemical_keywords() {
        let extractor = CatalogueKeywordExtractor::new();
        let found = extractor.find("Pesticides et Roundup, engrais chimiques", KeywordKind::Chemical);
        assert_eq!(found, vec!["pesticide", "herbicide", "engrais chimique"]);
    }

    #[test]
    fn test_accent_insensitive() {
        let extractor = CatalogueKeywordExtractor::new();
        assert_eq!(
            extractor.find("Épandage et désherbage", KeywordKind::Task),
            vec!["épandage", "désherbage"]
        );
        assert_eq!(
            extractor.find("epandage et desherbage", KeywordKind::Task),
            vec!["épandage", "désherbage"]
        );
    }

    #[test]
    fn test_health_and_protection() {
        let extractor = CatalogueKeywordExtractor::new();
        assert_eq!(
            extractor.find("toux chronique, céphalées", KeywordKind::Health),
            vec!["respiratoire", "neurologique"]
        );
        assert_eq!(
            extractor.find("je porte des gants et des bottes", KeywordKind::Protection),
            vec!["gants", "bottes"]
        );
    }

    #[test]
    fn test_empty_text() {
        let extractor = CatalogueKeywordExtractor::new();
        let found = extractor
            .extract("   ", KeywordKind::Chemical)
            .expect("Should never fail");
        assert!(found.is_empty());
    }
}
