// Partitions of an analyzed table and token frequencies for the word-cloud and bar-chart views.
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

use crate::nlp::normalize::tokens;
use crate::nlp::Sentiment;
use crate::pipeline::{AnalyzedRow, AnalyzedTable};

// Rows per rayon task when counting tokens.
const FREQUENCY_CHUNK: usize = 256;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequency {
    counts: HashMap<String, usize>,
    // Distinct tokens in order of first appearance.
    order: Vec<String>,
}

impl WordFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text(&mut self, normalized: &str) {
        for token in tokens(normalized) {
            self.add(token, 1);
        }
    }

    fn add(&mut self, token: &str, n: usize) {
        match self.counts.get_mut(token) {
            Some(count) => *count += n,
            None => {
                self.counts.insert(token.to_string(), n);
                self.order.push(token.to_string());
            }
        }
    }

    // Count addition per token; tokens new to `self` are appended in `other`'s order.
    pub fn merge(mut self, other: WordFrequency) -> WordFrequency {
        for token in &other.order {
            self.add(token, other.counts[token]);
        }
        self
    }

    pub fn get(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn counts(&self) -> &HashMap<String, usize> {
        &self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.order.iter().map(move |t| (t.as_str(), self.counts[t]))
    }

    // Highest counts first; equal counts keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

pub fn word_frequency<'a, I>(texts: I) -> WordFrequency
where
    I: IntoIterator<Item = &'a str>,
{
    let texts: Vec<&str> = texts.into_iter().collect();
    texts
        .par_chunks(FREQUENCY_CHUNK)
        .map(|chunk| {
            let mut freq = WordFrequency::new();
            for text in chunk {
                freq.add_text(text);
            }
            freq
        })
        .collect::<Vec<_>>()
        .into_iter()
        .fold(WordFrequency::new(), WordFrequency::merge)
}

pub fn rows_word_frequency(rows: &[AnalyzedRow<'_>]) -> WordFrequency {
    word_frequency(rows.iter().map(|r| r.analysis.normalized_text.as_str()))
}

pub fn by_sentiment(table: &AnalyzedTable, sentiment: Sentiment) -> Vec<AnalyzedRow<'_>> {
    table.rows().filter(|r| r.analysis.sentiment == sentiment).collect()
}

pub fn good_comments(table: &AnalyzedTable) -> Vec<AnalyzedRow<'_>> {
    by_sentiment(table, Sentiment::Positive)
}

pub fn bad_comments(table: &AnalyzedTable) -> Vec<AnalyzedRow<'_>> {
    by_sentiment(table, Sentiment::Negative)
}

#[derive(Debug, Clone, Default)]
pub struct OpportunityPartition<'a> {
    pub positive: Vec<AnalyzedRow<'a>>,
    pub negative_or_neutral: Vec<AnalyzedRow<'a>>,
}

impl<'a> OpportunityPartition<'a> {
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative_or_neutral.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn opportunity_partition(table: &AnalyzedTable) -> OpportunityPartition<'_> {
    let (positive, negative_or_neutral) = table
        .rows()
        .filter(|r| r.analysis.has_opportunity)
        .partition(|r| r.analysis.sentiment == Sentiment::Positive);
    OpportunityPartition {
        positive,
        negative_or_neutral,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub opportunities: usize,
}

pub fn summary(table: &AnalyzedTable) -> Summary {
    table.analyses().iter().fold(Summary::default(), |mut s, a| {
        s.total += 1;
        match a.sentiment {
            Sentiment::Positive => s.positive += 1,
            Sentiment::Negative => s.negative += 1,
            Sentiment::Neutral => s.neutral += 1,
        }
        if a.has_opportunity {
            s.opportunities += 1;
        }
        s
    })
}
