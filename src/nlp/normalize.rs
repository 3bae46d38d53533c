// Text normalization: lower-case, strip punctuation, drop stopwords.
use once_cell::sync::Lazy;
use regex::Regex;

use super::lexicon::Lexicon;

// `\w` is Unicode-aware, so accented letters survive while apostrophes,
// punctuation and emoji are removed.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

pub fn normalize(raw: &str, lexicon: &Lexicon) -> String {
    strip_punctuation(raw)
        .split_whitespace()
        .filter(|token| !lexicon.is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

// Lower-cased text with every non-word, non-space character removed.
pub fn strip_punctuation(raw: &str) -> String {
    NON_WORD.replace_all(&raw.to_lowercase(), "").into_owned()
}

pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}
