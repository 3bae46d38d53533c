// Command-line front end: load a comment table, classify it, show the views, export.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{error, info};

use avislens::aggregate::{by_sentiment, opportunity_partition, rows_word_frequency, summary, word_frequency, Summary};
use avislens::export::{write_csv_file, Report, DEFAULT_EXPORT_FILE};
use avislens::logging::init_logging;
use avislens::table::ColumnStats;
use avislens::{AnalyzedRow, AnalyzedTable, Config, Pipeline, PhraseMatching, PipelineError, Sentiment, Table};

#[derive(Parser)]
#[command(name = "avislens", about = "Lexical sentiment and improvement-opportunity analysis of customer comments")]
struct Cli {
    /// TOML configuration file (comment column, phrase matching, lexicon overrides)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Name of the comment column (default: Commentaire)
    #[arg(long, global = true)]
    column: Option<String>,
    /// Match opportunity phrases on whole tokens instead of substrings
    #[arg(long, global = true)]
    tokens: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every comment and write the augmented table as CSV
    Analyze {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = DEFAULT_EXPORT_FILE)]
        out: PathBuf,
    },
    /// Most frequent words, for one sentiment group or for all comments
    Words {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        sentiment: Option<Sentiment>,
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// Comments that suggest an improvement, split by sentiment
    Opportunities {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Summary counts and top words as JSON
    Report {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },
    /// First rows and per-column statistics of the raw table
    Preview {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value_t = 5)]
        rows: usize,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", cli.config))?;
    if let Some(column) = &cli.column {
        config.comment_column = column.clone();
    }
    if cli.tokens {
        config.phrase_matching = PhraseMatching::Tokens;
    }
    Ok(config)
}

fn load_table(path: &Path) -> Result<Table> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let table = if ext.eq_ignore_ascii_case("json") {
        let f = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        Table::from_json_reader(f)?
    } else {
        Table::from_csv_path(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    info!(path = %path.display(), rows = table.len(), columns = table.headers().len(), "loaded table");
    Ok(table)
}

fn analyze_file(pipeline: &Pipeline, path: &Path) -> Result<AnalyzedTable> {
    let table = load_table(path)?;
    let pb = ProgressBar::new(table.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    pb.set_message("classifying comments");
    Ok(pipeline.analyze_with_progress(table, &pb)?)
}

fn write_summary<W: WriteColor>(out: &mut W, s: &Summary) -> std::io::Result<()> {
    writeln!(out, "{} comments", s.total)?;
    for (label, count, color) in [
        ("positive", s.positive, Color::Green),
        ("negative", s.negative, Color::Red),
        ("neutral", s.neutral, Color::Yellow),
    ] {
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "  {:<10}", label)?;
        out.reset()?;
        writeln!(out, "{:>6}  {}", count, percent(count, s.total))?;
    }
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(out, "  {:<10}", "to improve")?;
    out.reset()?;
    writeln!(out, "{:>6}  {}", s.opportunities, percent(s.opportunities, s.total))
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return String::from("-");
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

// Horizontal bars scaled to the most frequent word.
fn word_bars(words: &[(&str, usize)], width: usize) -> Vec<String> {
    let max = words.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = words.iter().map(|(w, _)| w.chars().count()).max().unwrap_or(0);
    words
        .iter()
        .map(|(word, count)| {
            let len = if max == 0 { 0 } else { (count * width + max - 1) / max };
            format!("{:<lw$}  {:>5}  {}", word, count, "#".repeat(len), lw = label_width)
        })
        .collect()
}

fn write_rows<W: WriteColor>(out: &mut W, title: &str, color: Color, rows: &[AnalyzedRow], limit: usize) -> std::io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    writeln!(out, "{} ({})", title, rows.len())?;
    out.reset()?;
    for row in rows.iter().take(limit) {
        writeln!(out, "  [{}] {}", row.index + 1, row.comment.trim())?;
    }
    if rows.len() > limit {
        writeln!(out, "  ... {} more", rows.len() - limit)?;
    }
    Ok(())
}

fn describe_line(stats: &ColumnStats) -> String {
    match stats {
        ColumnStats::Numeric(s) => format!(
            "{}: count={} mean={:.3} std={} min={} 25%={} 50%={} 75%={} max={}",
            s.name,
            s.count,
            s.mean,
            s.std.map(|v| format!("{:.3}", v)).unwrap_or_else(|| String::from("NaN")),
            s.min,
            s.q25,
            s.median,
            s.q75,
            s.max
        ),
        ColumnStats::Text(s) => format!(
            "{}: count={} unique={} top={:?} freq={}",
            s.name,
            s.count,
            s.unique,
            s.top.as_deref().unwrap_or_default(),
            s.freq
        ),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let pipeline = Pipeline::from_config(&config)?;
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    match cli.command {
        Commands::Analyze { input, out } => {
            let analyzed = analyze_file(&pipeline, &input)?;
            write_csv_file(&analyzed, &out).with_context(|| format!("failed to write {}", out.display()))?;
            write_summary(&mut stdout, &summary(&analyzed))?;
            println!("Wrote augmented table to {}", out.display());
        }
        Commands::Words { input, sentiment, top } => {
            let analyzed = analyze_file(&pipeline, &input)?;
            let freq = match sentiment {
                Some(s) => rows_word_frequency(&by_sentiment(&analyzed, s)),
                None => word_frequency(analyzed.analyses().iter().map(|a| a.normalized_text.as_str())),
            };
            let top_words = freq.top(top.unwrap_or(config.top_words));
            if top_words.is_empty() {
                println!("(no words)");
            }
            for line in word_bars(&top_words, 40) {
                println!("{}", line);
            }
        }
        Commands::Opportunities { input, limit } => {
            let analyzed = analyze_file(&pipeline, &input)?;
            let partition = opportunity_partition(&analyzed);
            write_rows(&mut stdout, "Positive comments with a suggestion", Color::Green, &partition.positive, limit)?;
            write_rows(
                &mut stdout,
                "Negative or neutral comments with a suggestion",
                Color::Red,
                &partition.negative_or_neutral,
                limit,
            )?;
        }
        Commands::Report { input, out, top } => {
            let analyzed = analyze_file(&pipeline, &input)?;
            let report = Report::build(&analyzed, top.unwrap_or(config.top_words));
            match out {
                Some(path) => {
                    let f = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
                    report.write_json(f)?;
                    println!("Wrote report to {}", path.display());
                }
                None => {
                    report.write_json(std::io::stdout().lock())?;
                    println!();
                }
            }
        }
        Commands::Preview { input, rows } => {
            let table = load_table(&input)?;
            let head = table.head(rows);
            println!("{}", head.headers().join(" | "));
            for row in head.rows() {
                println!("{}", row.join(" | "));
            }
            println!();
            for stats in table.describe() {
                println!("{}", describe_line(&stats));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(pe) if pe.is_user_facing() => {
                    error!("{}", pe);
                    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
                    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
                    let _ = writeln!(stderr, "error: {}", pe);
                    let _ = stderr.reset();
                    ExitCode::from(2)
                }
                _ => {
                    eprintln!("error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avislens::Lexicon;
    use tempfile::TempDir;
    use termcolor::Buffer;

    const SAMPLE: &str = "id,Commentaire\n\
                          1,\"J'adore ce produit, il est excellent !\"\n\
                          2,\"Produit horrible, très déçu, trop lent.\"\n\
                          3,Il faudrait améliorer la vitesse.\n\
                          4,\"Super appli, mais il faudrait un mode sombre\"\n";

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("avislens").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let parsed = cli(&["words", "-i", "in.csv", "--sentiment", "negative", "-n", "3", "--tokens", "-vv"]);
        assert!(parsed.tokens);
        assert_eq!(parsed.verbose, 2);
        match parsed.command {
            Commands::Words { sentiment, top, .. } => {
                assert_eq!(sentiment, Some(Sentiment::Negative));
                assert_eq!(top, Some(3));
            }
            _ => panic!("expected words command"),
        }
    }

    #[test]
    fn test_cli_analyze_default_out() {
        match cli(&["analyze", "--input", "in.csv"]).command {
            Commands::Analyze { out, .. } => assert_eq!(out, PathBuf::from("données_analyse.csv")),
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn test_load_config_overrides() -> Result<()> {
        let config = load_config(&cli(&["--column", "avis", "--tokens", "preview", "-i", "x.csv"]))?;
        assert_eq!(config.comment_column, "avis");
        assert_eq!(config.phrase_matching, PhraseMatching::Tokens);
        Ok(())
    }

    #[test]
    fn test_load_table_csv_and_json() -> Result<()> {
        let dir = TempDir::new()?;
        let csv_path = dir.path().join("comments.csv");
        std::fs::write(&csv_path, SAMPLE)?;
        assert_eq!(load_table(&csv_path)?.len(), 4);

        let json_path = dir.path().join("comments.json");
        std::fs::write(&json_path, r#"[{"Commentaire": "super"}, {"Commentaire": 3}]"#)?;
        let table = load_table(&json_path)?;
        assert_eq!(table.column("Commentaire")?, vec!["super", "3"]);
        Ok(())
    }

    #[test]
    fn test_analyze_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("comments.csv");
        std::fs::write(&path, SAMPLE)?;
        let analyzed = analyze_file(&Pipeline::new(Lexicon::french()), &path)?;
        let s = summary(&analyzed);
        assert_eq!(s.total, 4);
        assert_eq!(s.positive, 2);
        assert_eq!(s.negative, 1);
        assert_eq!(s.opportunities, 2);
        Ok(())
    }

    #[test]
    fn test_missing_column_is_user_facing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("comments.csv");
        std::fs::write(&path, "id,texte\n1,bon\n")?;
        let err = analyze_file(&Pipeline::new(Lexicon::french()), &path).unwrap_err();
        let pe = err.downcast_ref::<PipelineError>().expect("pipeline error");
        assert!(pe.is_user_facing());
        Ok(())
    }

    #[test]
    fn test_run_analyze_writes_csv() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("comments.csv");
        let out = dir.path().join("out.csv");
        std::fs::write(&input, SAMPLE)?;
        run(cli(&["analyze", "-i", input.to_str().unwrap(), "-o", out.to_str().unwrap()]))?;
        let written = Table::from_csv_path(&out)?;
        assert_eq!(written.len(), 4);
        assert_eq!(written.column("has_opportunity")?, vec!["false", "false", "true", "true"]);
        Ok(())
    }

    #[test]
    fn test_write_summary() -> Result<()> {
        let mut buf = Buffer::no_color();
        let s = Summary { total: 4, positive: 2, negative: 1, neutral: 1, opportunities: 2 };
        write_summary(&mut buf, &s)?;
        let text = String::from_utf8(buf.into_inner())?;
        assert!(text.starts_with("4 comments\n"));
        assert!(text.contains("positive"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("25.0%"));
        Ok(())
    }

    #[test]
    fn test_describe_line() -> Result<()> {
        let table = Table::from_csv_reader("note,Commentaire\n5,bien\n3,lent\n".as_bytes())?;
        let lines: Vec<String> = table.describe().iter().map(describe_line).collect();
        assert_eq!(lines, vec!["note: count=2 mean=4.000 std=1.414 min=3 25%=3.5 50%=4 75%=4.5 max=5"]);

        let table = Table::from_csv_reader("Commentaire\nbien\n".as_bytes())?;
        let lines: Vec<String> = table.describe().iter().map(describe_line).collect();
        assert_eq!(lines, vec!["Commentaire: count=1 unique=1 top=\"bien\" freq=1"]);
        Ok(())
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 3), "33.3%");
        assert_eq!(percent(0, 0), "-");
    }

    #[test]
    fn test_word_bars() {
        let lines = word_bars(&[("produit", 4), ("lent", 2), ("cher", 1)], 8);
        assert_eq!(lines[0], "produit      4  ########");
        assert_eq!(lines[1], "lent         2  ####");
        assert_eq!(lines[2], "cher         1  ##");
        assert!(word_bars(&[], 8).is_empty());
    }

    #[test]
    fn test_write_rows_truncates() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("comments.csv");
        std::fs::write(&path, SAMPLE)?;
        let analyzed = analyze_file(&Pipeline::new(Lexicon::french()), &path)?;
        let rows: Vec<AnalyzedRow> = analyzed.rows().collect();
        let mut buf = Buffer::no_color();
        write_rows(&mut buf, "All", Color::White, &rows, 2)?;
        let text = String::from_utf8(buf.into_inner())?;
        assert!(text.starts_with("All (4)\n"));
        assert!(text.contains("  [1] J'adore ce produit, il est excellent !\n"));
        assert!(text.contains("  ... 2 more\n"));
        Ok(())
    }
}
