use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::nlp::PhraseMatching;

pub const DEFAULT_COMMENT_COLUMN: &str = "Commentaire";
pub const DEFAULT_TOP_WORDS: usize = 20;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub comment_column: String,
    pub phrase_matching: PhraseMatching,
    pub top_words: usize,
    pub lexicon: Option<LexiconConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LexiconConfig {
    pub stopwords: Option<Vec<String>>,
    pub positive: Option<Vec<String>>,
    pub negative: Option<Vec<String>>,
    pub opportunity_phrases: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comment_column: DEFAULT_COMMENT_COLUMN.to_string(),
            phrase_matching: PhraseMatching::default(),
            top_words: DEFAULT_TOP_WORDS,
            lexicon: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let config = Config::parse(&read_to_string(path)?)?;
        info!(path = %path.display(), column = %config.comment_column, "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.comment_column, "Commentaire");
        assert_eq!(config.phrase_matching, PhraseMatching::Substring);
        assert_eq!(config.top_words, 20);
        assert!(config.lexicon.is_none());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.comment_column, DEFAULT_COMMENT_COLUMN);
        assert_eq!(config.top_words, DEFAULT_TOP_WORDS);
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
comment_column = "feedback"
phrase_matching = "tokens"
top_words = 5

[lexicon]
positive = ["chouette"]
opportunity_phrases = ["serait top"]
"#,
        )
        .unwrap();
        assert_eq!(config.comment_column, "feedback");
        assert_eq!(config.phrase_matching, PhraseMatching::Tokens);
        assert_eq!(config.top_words, 5);
        let lexicon = config.lexicon.unwrap();
        assert_eq!(lexicon.positive, Some(vec!["chouette".to_string()]));
        assert!(lexicon.negative.is_none());
    }

    #[test]
    fn test_parse_invalid() {
        let result = Config::parse("phrase_matching = \"fuzzy\"");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "comment_column = \"avis\"")?;
        let config = Config::load(file.path())?;
        assert_eq!(config.comment_column, "avis");
        Ok(())
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let result = Config::load_or_default(Some(Path::new("/nonexistent/avislens.toml")));
        assert!(matches!(result, Err(PipelineError::Io(_))));
        assert!(Config::load_or_default(None).is_ok());
    }
}
