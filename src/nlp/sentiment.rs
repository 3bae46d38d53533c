// Sentiment classification using a lexicon-based approach.
// A comment is labelled by set membership of its tokens: any positive cue wins,
// otherwise any negative cue, otherwise neutral.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::lexicon::Lexicon;
use super::normalize::tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "positif" => Ok(Sentiment::Positive),
            "negative" | "négatif" | "negatif" => Ok(Sentiment::Negative),
            "neutral" | "neutre" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment: {}", other)),
        }
    }
}

pub fn classify(normalized: &str, lexicon: &Lexicon) -> Sentiment {
    let words: HashSet<&str> = tokens(normalized).collect();

    // Positive is checked first: a comment with cues from both sides is positive.
    if words.iter().any(|w| lexicon.positive().contains(*w)) {
        Sentiment::Positive
    } else if words.iter().any(|w| lexicon.negative().contains(*w)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
