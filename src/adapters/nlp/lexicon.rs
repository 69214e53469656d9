//! Domain vocabularies that map spelling variants onto one canonical term.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::stemmer::stem;
use crate::domain::fold_accents;

const HEALTH: &[(&str, &str)] = &[
    // Respiratory
    ("dyspnée", "dyspnée"),
    ("essoufflement", "dyspnée"),
    ("toux", "toux"),
    ("asthme", "asthme"),
    ("bronchite", "bronchite"),
    ("pneumonie", "pneumonie"),
    ("emphysème", "emphysème"),
    ("respiratoire", "respiratoire"),
    ("pulmonaire", "pulmonaire"),
    // Cardiac
    ("palpitations", "palpitations"),
    ("cardio", "cardio"),
    ("hypertension", "hypertension"),
    ("hypotension", "hypotension"),
    ("tachycardie", "tachycardie"),
    ("arythmie", "arythmie"),
    // Neurological
    ("céphalées", "céphalées"),
    ("migraine", "migraine"),
    ("vertiges", "vertiges"),
    ("étourdissements", "vertiges"),
    ("paresthésies", "paresthésies"),
    ("tremblements", "tremblements"),
    ("convulsions", "convulsions"),
    ("neurologique", "neurologique"),
    // Cognitive
    ("mémoire", "mémoire"),
    ("oubli", "mémoire"),
    ("cognitif", "cognitif"),
    ("concentration", "concentration"),
    ("confusion", "confusion"),
    // Skin
    ("dermatite", "dermatite"),
    ("irritation", "irritation"),
    ("prurit", "prurit"),
    ("démangeaisons", "prurit"),
    ("cutané", "cutané"),
    ("peau", "cutané"),
    ("dermatose", "dermatose"),
    ("eczéma", "eczéma"),
    ("érythème", "érythème"),
    ("rougeur", "érythème"),
];

const CHEMICAL: &[(&str, &str)] = &[
    ("pesticide", "pesticide"),
    ("herbicide", "herbicide"),
    ("insecticide", "insecticide"),
    ("fongicide", "fongicide"),
    ("nématicide", "nématicide"),
    ("engrais", "engrais"),
    ("chimique", "chimique"),
    ("organique", "organique"),
    ("phosphore", "phosphore"),
    ("azote", "azote"),
    ("potasse", "potasse"),
    ("potassium", "potasse"),
    ("nitrate", "nitrate"),
    ("ammoniac", "ammoniac"),
    ("ammonium", "ammoniac"),
    ("sulfate", "sulfate"),
    ("paraquat", "paraquat"),
    ("glyphosate", "glyphosate"),
    ("roundup", "glyphosate"),
    ("pyrèthre", "pyrèthre"),
];

const TASK: &[(&str, &str)] = &[
    ("épandage", "épandage"),
    ("épand", "épandage"),
    ("traitement", "traitement"),
    ("trait", "traitement"),
    ("pulvérisation", "traitement"),
    ("récolte", "récolte"),
    ("cueillette", "cueillette"),
    ("taille", "taille"),
    ("semis", "semis"),
    ("semailles", "semis"),
    ("désherbage", "désherbage"),
    ("sarclage", "désherbage"),
    ("désherbant", "désherbage"),
    ("irrigation", "irrigation"),
    ("arrosage", "irrigation"),
    ("labour", "labour"),
    ("labourage", "labour"),
    ("nettoyage", "nettoyage"),
    ("stockage", "stockage"),
    ("plantation", "plantation"),
    ("fertilisation", "fertilisation"),
];

/// A vocabulary keyed by accent-folded word and by its stem.
#[derive(Debug)]
pub struct Lexicon {
    entries: HashMap<String, &'static str>,
}

impl Lexicon {
    fn build(pairs: &'static [(&'static str, &'static str)]) -> Self {
        let mut entries = HashMap::new();
        for (word, canonical) in pairs {
            entries.insert(fold_accents(word), *canonical);
        }
        // Stems only fill gaps; an exact spelling always wins.
        for (word, canonical) in pairs {
            entries.entry(stem(word)).or_insert(*canonical);
        }
        Self { entries }
    }

    #[must_use]
    pub fn health() -> &'static Self {
        static LEXICON: OnceLock<Lexicon> = OnceLock::new();
        LEXICON.get_or_init(|| Self::build(HEALTH))
    }

    #[must_use]
    pub fn chemical() -> &'static Self {
        static LEXICON: OnceLock<Lexicon> = OnceLock::new();
        LEXICON.get_or_init(|| Self::build(CHEMICAL))
    }

    #[must_use]
    pub fn task() -> &'static Self {
        static LEXICON: OnceLock<Lexicon> = OnceLock::new();
        LEXICON.get_or_init(|| Self::build(TASK))
    }

    /// Canonical term for a word or stem, if known.
    #[must_use]
    pub fn lookup(&self, word: &str) -> Option<&'static str> {
        self.entries.get(&fold_accents(word)).copied()
    }
}
