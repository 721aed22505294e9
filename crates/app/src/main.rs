use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use doc_keywords_core::{
    discover_documents, parse_discovered, parse_document, rank, IngestionReport, KeywordConfig,
    KeywordRanker, ParseReport, ParseStatus, StopwordFilter, EMPTY_TEXT_MESSAGE,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "doc-keywords", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Maximum number of keywords per document.
    #[arg(long, env = "DOC_KEYWORDS_TOP_N", default_value = "30")]
    top_n: usize,

    /// Maximum number of distinct terms kept per document.
    #[arg(long, env = "DOC_KEYWORDS_MAX_VOCABULARY", default_value = "2000")]
    max_vocabulary: usize,

    /// Stopword file (whitespace separated words) replacing the English list.
    #[arg(long, env = "DOC_KEYWORDS_STOPWORDS")]
    stopwords: Option<PathBuf>,

    /// Print JSON instead of plain text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Rank keywords of raw text (stdin when neither --text nor --input is given).
    Keywords {
        /// Text to rank.
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,
        /// Plain-text file to rank.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print the weight next to each keyword.
        #[arg(long, default_value_t = false)]
        scores: bool,
    },
    /// Extract text from a PDF, DOCX or TXT file and rank its keywords.
    Parse {
        /// Document to parse.
        #[arg(long)]
        file: PathBuf,
    },
    /// Parse every supported document below a folder.
    Batch {
        /// Folder searched recursively.
        #[arg(long)]
        folder: PathBuf,
        /// Documents parsed at the same time.
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        top_n = config.top_n,
        max_vocabulary = config.max_vocabulary,
        stopwords = config.stopwords.len(),
        "doc-keywords boot"
    );

    match cli.command {
        Command::Keywords {
            text,
            input,
            scores,
        } => {
            let text = match (text, input) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => {
                    let mut buffer = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut buffer)
                        .await
                        .context("reading stdin")?;
                    buffer
                }
            };

            if text.trim().is_empty() {
                if cli.json {
                    let empty = serde_json::json!({
                        "status": ParseStatus::EmptyText,
                        "error": EMPTY_TEXT_MESSAGE,
                        "entries": [],
                        "vocabulary_size": 0,
                    });
                    println!("{}", serde_json::to_string_pretty(&empty)?);
                } else {
                    println!("{EMPTY_TEXT_MESSAGE}");
                }
                return Ok(());
            }

            let keywords = rank(&text, &config)?;

            if cli.json {
                let ranked = serde_json::json!({
                    "status": keywords.status(),
                    "entries": keywords.entries,
                    "vocabulary_size": keywords.vocabulary_size,
                });
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else if keywords.is_empty() {
                println!("no keywords ({:?})", keywords.status());
            } else if scores {
                for entry in &keywords.entries {
                    println!("{:.4}\t{}", entry.weight, entry.term);
                }
            } else {
                for term in keywords.terms() {
                    println!("{term}");
                }
            }
        }
        Command::Parse { file } => {
            let report = parse_document(&file, &config)?;
            print_report(&report, cli.json)?;
        }
        Command::Batch {
            folder,
            concurrency,
        } => {
            let files = discover_documents(&folder)?;
            info!(folder = %folder.display(), documents = files.len(), "parsing folder");

            let ranker = KeywordRanker::new(&config)?;
            let report = parse_concurrently(files, ranker, concurrency).await?;

            for skipped in &report.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
            }

            for parsed in &report.reports {
                if let Some(error) = &parsed.error {
                    warn!(path = %parsed.document.source_path, reason = %error, "document not ranked");
                }
                print_report(parsed, cli.json)?;
            }

            let parsed = report.parsed_count();
            println!(
                "{} documents parsed, {} not ranked, {} skipped at {}",
                parsed,
                report.reports.len() - parsed,
                report.skipped_files.len(),
                Utc::now().to_rfc3339()
            );
        }
    }

    Ok(())
}

async fn load_config(cli: &Cli) -> anyhow::Result<KeywordConfig> {
    let mut config = KeywordConfig::default()
        .with_top_n(cli.top_n)
        .with_max_vocabulary(cli.max_vocabulary);

    if let Some(path) = &cli.stopwords {
        let words = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading stopwords from {}", path.display()))?;
        let stopwords = StopwordFilter::from_text(&words);
        if stopwords.is_empty() {
            warn!(path = %path.display(), "stopword file is empty, no words will be filtered");
        }
        config = config.with_stopwords(stopwords);
    }

    config.validate()?;
    Ok(config)
}

// blocking pool; outcomes come back in input order
async fn parse_concurrently(
    files: Vec<PathBuf>,
    ranker: KeywordRanker,
    concurrency: usize,
) -> anyhow::Result<IngestionReport> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let ranker = Arc::new(ranker);
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let permit = permits.clone().acquire_owned().await?;
        let ranker = ranker.clone();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, parse_discovered(path, &ranker))
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined?);
    }

    outcomes.sort_by_key(|(index, _)| *index);
    Ok(IngestionReport::from_outcomes(
        outcomes.into_iter().map(|(_, outcome)| outcome),
    ))
}

fn print_report(report: &ParseReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!(
        "[{:?}] {} keywords={}",
        report.status,
        report.document.source_path,
        report.keywords.len()
    );
    if let Some(error) = &report.error {
        println!("  error: {error}");
    }
    for keyword in &report.keywords {
        println!("  {keyword}");
    }
    Ok(())
}
