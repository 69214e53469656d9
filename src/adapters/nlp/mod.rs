//! French text normalisation: tokenizer, stopwords, stemmer and vocabularies.

mod lexicon;
mod stemmer;
mod stopwords;

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

pub use lexicon::Lexicon;
pub use stemmer::{stem, MIN_STEM_CHARS};
pub use stopwords::is_stopword;

/// Compose accents, split lower-cased text on every non-alphanumeric
/// character and keep the tokens longer than two characters that are neither
/// stopwords nor numbers.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.nfc()
        .collect::<String>()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Tokenize and reduce every token to a canonical term, without duplicates,
/// in order of first appearance.
///
/// A token found in `lexicon` (directly or through its stem) becomes the
/// lexicon's canonical term; any other token becomes its stem. Applying this
/// to its own output returns the same terms.
#[must_use]
pub fn normalize_terms(text: &str, lexicon: Option<&Lexicon>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    for token in tokenize(text) {
        let term = match lexicon.and_then(|l| l.lookup(&token)) {
            Some(canonical) => canonical.to_string(),
            None => {
                let stemmed = stem(&token);
                match lexicon.and_then(|l| l.lookup(&stemmed)) {
                    Some(canonical) => canonical.to_string(),
                    None => stemmed,
                }
            }
        };

        if term.chars().count() < MIN_STEM_CHARS || is_stopword(&term) {
            continue;
        }
        if seen.insert(term.clone()) {
            terms.push(term);
        }
    }

    terms
}
