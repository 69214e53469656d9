//! French stopwords.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::domain::fold_accents;

static STOPWORDS: OnceLock<HashSet<String>> = OnceLock::new();

const WORDS: &[&str] = &[
    // Function words
    "a", "à", "au", "aux", "avec", "ce", "ces", "cette", "cet", "dans", "de", "des", "du",
    "elle", "elles", "en", "et", "eux", "il", "ils", "je", "j'ai", "la", "le", "les", "leur",
    "leurs", "lui", "ma", "mais", "me", "même", "mes", "moi", "mon", "ni", "notre", "nos",
    "nous", "on", "ou", "où", "par", "pas", "pour", "qu", "que", "qui", "quoi", "sa", "sans",
    "se", "si", "son", "ses", "sur", "sous", "chez", "entre", "vers", "ta", "te", "tes",
    "toi", "ton", "tu", "un", "une", "votre", "vos", "vous", "c", "d", "j", "l", "m", "n",
    "s", "t", "y", "lors", "après", "avant", "depuis", "pendant", "comme", "aussi", "tout",
    "tous", "toute", "toutes", "autre", "autres",
    // Être
    "été", "étée", "étées", "étés", "étant", "suis", "es", "est", "sommes", "êtes", "sont",
    "serai", "seras", "sera", "serons", "serez", "seront", "serais", "serait", "serions",
    "seriez", "seraient", "étais", "était", "étions", "étiez", "étaient", "fus", "fut",
    "fûmes", "fûtes", "furent", "sois", "soit", "soyons", "soyez", "soient", "fusse",
    "fusses", "fût", "fussions", "fussiez", "fussent",
    // Avoir
    "ai", "as", "avons", "avez", "ont", "avait", "avais", "avaient", "eu", "aura", "aurait",
    // Numbers
    "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix",
    // Time words
    "mois", "jour", "jours", "ans", "an", "année", "années", "semaine", "semaines", "fois",
    "moment", "temps", "heure", "heures",
    // Quantity and frequency
    "oui", "non", "peu", "très", "plus", "moins", "beaucoup", "trop", "jamais", "toujours",
    "souvent", "parfois", "quelquefois", "rarement",
];

fn stopwords() -> &'static HashSet<String> {
    STOPWORDS.get_or_init(|| WORDS.iter().map(|w| fold_accents(w)).collect())
}

/// True if `word` is a stopword, ignoring case and accents.
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    stopwords().contains(&fold_accents(word))
}
