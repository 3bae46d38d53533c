// Lexical classification of free-text customer comments:
// clean -> sentiment -> improvement-opportunity, plus word frequencies per group.
pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod nlp;
pub mod pipeline;
pub mod table;

pub use aggregate::{
    bad_comments, by_sentiment, good_comments, opportunity_partition, summary, word_frequency,
    OpportunityPartition, Summary, WordFrequency,
};
pub use config::Config;
pub use error::PipelineError;
pub use nlp::{classify, detect_opportunity, normalize, Lexicon, PhraseMatching, Sentiment};
pub use pipeline::{AnalyzedRow, AnalyzedTable, CommentAnalysis, Pipeline};
pub use table::Table;
