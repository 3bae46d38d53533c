use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("column `{column}` not found in table (available: {})", .available.join(", "))]
    MissingColumn { column: String, available: Vec<String> },

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow { line: u64, expected: usize, found: usize },

    #[error("lexicon cue `{0}` is listed as both positive and negative")]
    LexiconOverlap(String),

    #[error("failed to read table: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    // Schema problems are the caller's to show; everything else is a read failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            PipelineError::MissingColumn { .. } | PipelineError::RaggedRow { .. } | PipelineError::LexiconOverlap(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_lists_headers() {
        let err = PipelineError::MissingColumn {
            column: "Commentaire".to_string(),
            available: vec!["id".to_string(), "note".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "column `Commentaire` not found in table (available: id, note)"
        );
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_ragged_row_is_user_facing() {
        let err = PipelineError::RaggedRow { line: 3, expected: 2, found: 4 };
        assert_eq!(err.to_string(), "line 3: expected 2 fields, found 4");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_io_error_is_not_user_facing() {
        let err = PipelineError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_user_facing());
        assert_eq!(err.to_string(), "gone");
    }
}
