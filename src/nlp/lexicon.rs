// Fixed word tables used by the normalizer, the sentiment classifier and the
// opportunity detector. The built-in French tables are built once per process;
// a configuration file may replace any of them.
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::LexiconConfig;
use crate::error::{PipelineError, Result};

use super::normalize::strip_punctuation;

const FRENCH_STOPWORDS: &[&str] = &[
    "a", "à", "ai", "aie", "aient", "as", "au", "aux", "avec", "avez", "avions", "avoir",
    "avons", "ayant", "c", "ça", "car", "ce", "ceci", "cela", "celle", "celui", "ces", "cet",
    "cette", "d", "dans", "de", "des", "donc", "du", "elle", "elles", "en", "es", "est", "et",
    "étaient", "était", "été", "être", "eu", "eux", "il", "ils", "j", "je", "l", "la", "le",
    "les", "leur", "leurs", "lui", "m", "ma", "mais", "me", "même", "mes", "moi", "mon", "n",
    "ne", "ni", "nos", "notre", "nous", "on", "ont", "or", "ou", "où", "par", "pas", "pour",
    "qu", "que", "quel", "quelle", "qui", "s", "sa", "sans", "se", "ses", "si", "son", "sont",
    "suis", "sur", "t", "ta", "te", "tes", "toi", "ton", "tu", "un", "une", "vos", "votre",
    "vous", "y", "très", "plus", "aussi", "alors", "tout", "tous", "toute", "toutes",
];

const FRENCH_POSITIVE: &[&str] = &[
    "adore", "jadore", "aime", "jaime", "agréable", "bien", "bon", "bonne", "content",
    "contente", "efficace", "excellent", "excellente", "facile", "fantastique", "génial",
    "géniale", "impeccable", "merci", "parfait", "parfaite", "pratique", "rapide", "ravi",
    "ravie", "recommande", "satisfait", "satisfaite", "simple", "super", "top", "utile",
];

const FRENCH_NEGATIVE: &[&str] = &[
    "bug", "bugs", "cher", "chère", "compliqué", "compliquée", "décevant", "décevante", "déçu",
    "déçue", "difficile", "horrible", "inacceptable", "insatisfait", "insatisfaite", "inutile",
    "lent", "lente", "mauvais", "mauvaise", "médiocre", "nul", "nulle", "panne", "pire",
    "problème", "problèmes", "retard", "cassé", "cassée",
];

// Matched against normalized text; stopword tokens are removed on load.
const FRENCH_OPPORTUNITY_PHRASES: &[&str] = &[
    "améliorer",
    "amélioration",
    "faudrait",
    "devrait",
    "pourrait",
    "manque",
    "dommage",
    "souhaiterais",
    "aimerais",
    "suggestion",
    "serait mieux",
    "serait bien",
    "mise jour",
    "prix élevé",
];

static FRENCH: Lazy<Arc<Lexicon>> = Lazy::new(|| {
    Arc::new(Lexicon::assemble(
        FRENCH_STOPWORDS.iter().copied(),
        FRENCH_POSITIVE.iter().copied(),
        FRENCH_NEGATIVE.iter().copied(),
        FRENCH_OPPORTUNITY_PHRASES.iter().copied(),
    ))
});

#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
    positive: HashSet<String>,
    negative: HashSet<String>,
    opportunity_phrases: Vec<String>,
}

impl Lexicon {
    pub fn french() -> Arc<Lexicon> {
        Arc::clone(&FRENCH)
    }

    pub fn new<S: AsRef<str>>(
        stopwords: &[S],
        positive: &[S],
        negative: &[S],
        opportunity_phrases: &[S],
    ) -> Result<Lexicon> {
        let lexicon = Lexicon::assemble(
            stopwords.iter().map(|s| s.as_ref()),
            positive.iter().map(|s| s.as_ref()),
            negative.iter().map(|s| s.as_ref()),
            opportunity_phrases.iter().map(|s| s.as_ref()),
        );
        lexicon.validate()?;
        Ok(lexicon)
    }

    // Lists present in the config replace the built-in ones; absent lists keep them.
    // Every list is cleaned again so kept phrases follow replaced stopwords.
    pub fn from_config(config: &LexiconConfig) -> Result<Lexicon> {
        let base = Lexicon::french();
        let pick = |given: &Option<Vec<String>>, fallback: Vec<String>| -> Vec<String> {
            given.clone().unwrap_or(fallback)
        };
        let stopwords = pick(&config.stopwords, base.stopwords.iter().cloned().collect());
        let positive = pick(&config.positive, base.positive.iter().cloned().collect());
        let negative = pick(&config.negative, base.negative.iter().cloned().collect());
        let phrases = pick(&config.opportunity_phrases, base.opportunity_phrases.clone());

        let lexicon = Lexicon::assemble(
            stopwords.iter().map(String::as_str),
            positive.iter().map(String::as_str),
            negative.iter().map(String::as_str),
            phrases.iter().map(String::as_str),
        );
        lexicon.validate()?;
        debug!(
            stopwords = lexicon.stopwords.len(),
            positive = lexicon.positive.len(),
            negative = lexicon.negative.len(),
            phrases = lexicon.opportunity_phrases.len(),
            "loaded lexicon from config"
        );
        Ok(lexicon)
    }

    // Entries go through the same cleaning as comments, otherwise they could never match.
    fn assemble<'a>(
        stopwords: impl Iterator<Item = &'a str>,
        positive: impl Iterator<Item = &'a str>,
        negative: impl Iterator<Item = &'a str>,
        opportunity_phrases: impl Iterator<Item = &'a str>,
    ) -> Lexicon {
        let stopwords: HashSet<String> = stopwords
            .flat_map(|w| {
                strip_punctuation(w)
                    .split_whitespace()
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .collect();
        let positive = clean_cues(positive, &stopwords);
        let negative = clean_cues(negative, &stopwords);
        let opportunity_phrases = clean_phrases(opportunity_phrases, &stopwords);
        Lexicon {
            stopwords,
            positive,
            negative,
            opportunity_phrases,
        }
    }

    fn validate(&self) -> Result<()> {
        let mut overlap: Vec<&String> = self.positive.intersection(&self.negative).collect();
        overlap.sort();
        match overlap.first() {
            Some(cue) => Err(PipelineError::LexiconOverlap((*cue).clone())),
            None => Ok(()),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn positive(&self) -> &HashSet<String> {
        &self.positive
    }

    pub fn negative(&self) -> &HashSet<String> {
        &self.negative
    }

    pub fn opportunity_phrases(&self) -> &[String] {
        &self.opportunity_phrases
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }
}

// A cue must clean to a single non-stopword token; anything else is dropped.
fn clean_cues<'a>(words: impl Iterator<Item = &'a str>, stopwords: &HashSet<String>) -> HashSet<String> {
    let mut cues = HashSet::new();
    for word in words {
        let cleaned = strip_punctuation(word);
        let toks: Vec<&str> = cleaned.split_whitespace().collect();
        match toks.as_slice() {
            [] => {}
            [tok] if !stopwords.contains(*tok) => {
                cues.insert(tok.to_string());
            }
            _ => warn!(cue = word, "dropping cue that is not a single non-stopword token"),
        }
    }
    cues
}

fn clean_phrases<'a>(phrases: impl Iterator<Item = &'a str>, stopwords: &HashSet<String>) -> Vec<String> {
    let mut cleaned = Vec::new();
    for phrase in phrases {
        let stripped = strip_punctuation(phrase);
        let kept: Vec<&str> = stripped
            .split_whitespace()
            .filter(|t| !stopwords.contains(*t))
            .collect();
        if kept.is_empty() {
            if !stripped.trim().is_empty() {
                warn!(phrase, "dropping phrase made only of stopwords");
            }
            continue;
        }
        cleaned.push(kept.join(" "));
    }
    cleaned
}
