//! French stemmer.
//!
//! Snowball French (`rust-stemmers`) followed by accent folding and removal of
//! the third-person plural `-ent`, which Snowball keeps. Passes repeat while
//! they shorten the word and never leave fewer than [`MIN_STEM_CHARS`]
//! characters, so `stem(stem(w)) == stem(w)`.

use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

use crate::domain::fold_accents;

pub const MIN_STEM_CHARS: usize = 3;

/// Shortest stem left after dropping a verb's `-ent`.
const MIN_VERB_ROOT_CHARS: usize = 4;

fn french() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::French))
}

/// Stem a single word. The result is lower-case and accent-free.
#[must_use]
pub fn stem(word: &str) -> String {
    let lower = word.nfc().collect::<String>().to_lowercase();
    let mut current = fold_accents(&lower);

    // Snowball reads accents, so the first pass sees the original spelling.
    if let Some(next) = shorter(&current, reduce(&lower)) {
        current = next;
    }
    while let Some(next) = shorter(&current, reduce(&current)) {
        current = next;
    }
    current
}

fn reduce(word: &str) -> String {
    let folded = fold_accents(&french().stem(word));
    match folded.strip_suffix("ent") {
        Some(root)
            if !folded.ends_with("ment") && root.chars().count() >= MIN_VERB_ROOT_CHARS =>
        {
            root.to_string()
        }
        _ => folded,
    }
}

fn shorter(current: &str, candidate: String) -> Option<String> {
    let len = candidate.chars().count();
    (len >= MIN_STEM_CHARS && len < current.chars().count()).then_some(candidate)
}
