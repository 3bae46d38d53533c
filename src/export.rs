// CSV download of the augmented table and the JSON report.
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::aggregate::{bad_comments, good_comments, opportunity_partition, rows_word_frequency, summary, Summary};
use crate::error::Result;
use crate::pipeline::{AnalyzedRow, AnalyzedTable};

pub const DEFAULT_EXPORT_FILE: &str = "données_analyse.csv";
pub const DERIVED_COLUMNS: [&str; 3] = ["normalized_text", "sentiment", "has_opportunity"];

pub fn write_csv<W: Write>(analyzed: &AnalyzedTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = analyzed.table().headers().iter().map(String::as_str).collect();
    header.extend(DERIVED_COLUMNS);
    out.write_record(&header)?;

    for row in analyzed.rows() {
        let mut record: Vec<&str> = row.cells.iter().map(String::as_str).collect();
        record.push(&row.analysis.normalized_text);
        record.push(row.analysis.sentiment.as_str());
        record.push(if row.analysis.has_opportunity { "true" } else { "false" });
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

// Rust strings are UTF-8, so the bytes are already in the download encoding.
pub fn to_csv_bytes(analyzed: &AnalyzedTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(analyzed, &mut buf)?;
    Ok(buf)
}

pub fn write_csv_file(analyzed: &AnalyzedTable, path: &Path) -> Result<()> {
    write_csv(analyzed, std::fs::File::create(path)?)?;
    info!(path = %path.display(), rows = analyzed.len(), "wrote augmented table");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub comment_column: String,
    pub summary: Summary,
    pub top_positive_words: Vec<WordCount>,
    pub top_negative_words: Vec<WordCount>,
    pub positive_opportunities: usize,
    pub negative_or_neutral_opportunities: usize,
}

impl Report {
    pub fn build(analyzed: &AnalyzedTable, top_n: usize) -> Report {
        let top = |rows: &[AnalyzedRow]| -> Vec<WordCount> {
            rows_word_frequency(rows)
                .top(top_n)
                .into_iter()
                .map(|(word, count)| WordCount {
                    word: word.to_string(),
                    count,
                })
                .collect()
        };
        let opportunities = opportunity_partition(analyzed);
        Report {
            comment_column: analyzed.comment_column().to_string(),
            summary: summary(analyzed),
            top_positive_words: top(&good_comments(analyzed)),
            top_negative_words: top(&bad_comments(analyzed)),
            positive_opportunities: opportunities.positive.len(),
            negative_or_neutral_opportunities: opportunities.negative_or_neutral.len(),
        }
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::Lexicon;
    use crate::pipeline::Pipeline;
    use crate::table::Table;
    use tempfile::TempDir;

    fn analyzed() -> AnalyzedTable {
        let data = "id,Commentaire\n\
                    1,\"J'adore ce produit, il est excellent !\"\n\
                    2,\"Produit horrible, très déçu, trop lent.\"\n\
                    3,Il faudrait améliorer la vitesse.\n";
        let table = Table::from_csv_reader(data.as_bytes()).unwrap();
        Pipeline::new(Lexicon::french()).analyze(table).unwrap()
    }

    #[test]
    fn test_to_csv_bytes() {
        let bytes = to_csv_bytes(&analyzed()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,Commentaire,normalized_text,sentiment,has_opportunity");
        assert_eq!(
            lines[1],
            "1,\"J'adore ce produit, il est excellent !\",jadore produit excellent,positive,false"
        );
        assert_eq!(
            lines[3],
            "3,Il faudrait améliorer la vitesse.,faudrait améliorer vitesse,neutral,true"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_round_trips_through_table() {
        let bytes = to_csv_bytes(&analyzed()).unwrap();
        let table = Table::from_csv_reader(bytes.as_slice()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column("sentiment").unwrap(), vec!["positive", "negative", "neutral"]);
        assert_eq!(table.column("Commentaire").unwrap()[1], "Produit horrible, très déçu, trop lent.");
    }

    #[test]
    fn test_write_csv_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        write_csv_file(&analyzed(), &path)?;
        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with("id,Commentaire,normalized_text"));
        Ok(())
    }

    #[test]
    fn test_report() {
        let report = Report::build(&analyzed(), 2);
        assert_eq!(report.comment_column, "Commentaire");
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.top_positive_words.len(), 2);
        assert_eq!(report.top_positive_words[0].word, "jadore");
        assert_eq!(report.top_negative_words[0].word, "produit");
        assert_eq!(report.positive_opportunities, 0);
        assert_eq!(report.negative_or_neutral_opportunities, 1);
    }

    #[test]
    fn test_report_json() {
        let mut buf = Vec::new();
        Report::build(&analyzed(), 5).write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["summary"]["positive"], 1);
        assert_eq!(value["summary"]["negative"], 1);
        assert_eq!(value["top_negative_words"][1]["word"], "horrible");
    }
}
