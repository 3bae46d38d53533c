// Runs normalize -> classify -> detect over the comment column of a table.
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{Config, DEFAULT_COMMENT_COLUMN};
use crate::error::Result;
use crate::nlp::{classify, detect_opportunity_with, normalize, Lexicon, PhraseMatching, Sentiment};
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentAnalysis {
    pub normalized_text: String,
    pub sentiment: Sentiment,
    pub has_opportunity: bool,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    lexicon: Arc<Lexicon>,
    comment_column: String,
    matching: PhraseMatching,
}

impl Pipeline {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            comment_column: DEFAULT_COMMENT_COLUMN.to_string(),
            matching: PhraseMatching::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let lexicon = match &config.lexicon {
            Some(lexicon_config) => Arc::new(Lexicon::from_config(lexicon_config)?),
            None => Lexicon::french(),
        };
        Ok(Pipeline::new(lexicon)
            .with_comment_column(&config.comment_column)
            .with_phrase_matching(config.phrase_matching))
    }

    pub fn with_comment_column(mut self, column: &str) -> Self {
        self.comment_column = column.to_string();
        self
    }

    pub fn with_phrase_matching(mut self, matching: PhraseMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn comment_column(&self) -> &str {
        &self.comment_column
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn analyze_comment(&self, raw: &str) -> CommentAnalysis {
        let normalized_text = normalize(raw, &self.lexicon);
        let sentiment = classify(&normalized_text, &self.lexicon);
        let has_opportunity = detect_opportunity_with(&normalized_text, &self.lexicon, self.matching);
        CommentAnalysis {
            normalized_text,
            sentiment,
            has_opportunity,
        }
    }

    pub fn analyze(&self, table: Table) -> Result<AnalyzedTable> {
        self.analyze_with_progress(table, &ProgressBar::hidden())
    }

    // The schema is checked before any row is touched, so a bad table yields nothing.
    pub fn analyze_with_progress(&self, table: Table, pb: &ProgressBar) -> Result<AnalyzedTable> {
        let column = table.column_index(&self.comment_column)?;
        pb.set_length(table.len() as u64);

        let analyses: Vec<CommentAnalysis> = table
            .rows()
            .par_iter()
            .map(|row| {
                let analysis = self.analyze_comment(&row[column]);
                pb.inc(1);
                analysis
            })
            .collect();

        pb.finish_and_clear();
        info!(rows = analyses.len(), column = %self.comment_column, "analyzed comments");
        debug!(matching = ?self.matching, stopwords = self.lexicon.stopword_count(), "pipeline settings");

        Ok(AnalyzedTable {
            table,
            comment_column: column,
            analyses,
        })
    }
}

// The caller's table plus one derived record per row.
#[derive(Debug, Clone)]
pub struct AnalyzedTable {
    table: Table,
    comment_column: usize,
    analyses: Vec<CommentAnalysis>,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzedRow<'a> {
    pub index: usize,
    pub cells: &'a [String],
    pub comment: &'a str,
    pub analysis: &'a CommentAnalysis,
}

impl AnalyzedTable {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn analyses(&self) -> &[CommentAnalysis] {
        &self.analyses
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    pub fn comment_column(&self) -> &str {
        &self.table.headers()[self.comment_column]
    }

    pub fn row(&self, index: usize) -> Option<AnalyzedRow<'_>> {
        let cells = self.table.rows().get(index)?;
        Some(AnalyzedRow {
            index,
            cells,
            comment: &cells[self.comment_column],
            analysis: &self.analyses[index],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = AnalyzedRow<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }
}
