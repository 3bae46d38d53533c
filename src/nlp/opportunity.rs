// Improvement-opportunity detection over normalized comments.
use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use super::normalize::tokens;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseMatching {
    // Raw substring search; "dommage" also fires inside "dommageable".
    #[default]
    Substring,
    // Phrase tokens must line up with whole consecutive tokens of the comment.
    Tokens,
}

pub fn detect_opportunity(normalized: &str, lexicon: &Lexicon) -> bool {
    detect_opportunity_with(normalized, lexicon, PhraseMatching::Substring)
}

pub fn detect_opportunity_with(normalized: &str, lexicon: &Lexicon, matching: PhraseMatching) -> bool {
    if normalized.is_empty() {
        return false;
    }
    match matching {
        PhraseMatching::Substring => lexicon
            .opportunity_phrases()
            .iter()
            .any(|phrase| normalized.contains(phrase.as_str())),
        PhraseMatching::Tokens => {
            let words: Vec<&str> = tokens(normalized).collect();
            lexicon.opportunity_phrases().iter().any(|phrase| {
                let needle: Vec<&str> = tokens(phrase).collect();
                !needle.is_empty() && words.windows(needle.len()).any(|w| w == needle.as_slice())
            })
        }
    }
}
