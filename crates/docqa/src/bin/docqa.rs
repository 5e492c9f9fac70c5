//! docqa command-line interface
//!
//! Run with: cargo run -p docqa -- chat path/to/document.pdf

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa::providers::{self, probe};
use docqa::{Answer, QaPipeline, RagConfig};

/// Characters of each source chunk shown under an answer
const SOURCE_PREVIEW_CHARS: usize = 400;

/// Ask questions about a document and get answers grounded in its text.
#[derive(Parser, Debug)]
#[command(name = "docqa", version, about = "Question answering over a PDF or text document")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a document and persist its index
    Ingest {
        /// Document to process (.pdf, .txt, .md)
        file: PathBuf,
        /// Index directory (defaults to the configured one)
        #[arg(long)]
        persist_dir: Option<PathBuf>,
    },
    /// Answer one question from a persisted index
    Ask {
        /// The question
        question: String,
        /// Index directory (defaults to the configured one)
        #[arg(long)]
        index: Option<PathBuf>,
        /// Number of chunks to retrieve
        #[arg(short)]
        k: Option<usize>,
        /// Print the chunks the answer was grounded on
        #[arg(long)]
        show_sources: bool,
    },
    /// Process a document, then answer questions read from stdin
    Chat {
        /// Document to process (.pdf, .txt, .md)
        file: PathBuf,
        /// Number of chunks to retrieve
        #[arg(short)]
        k: Option<usize>,
    },
    /// Check which completion models answer with the current credentials
    Probe {
        /// Models to try in order (defaults to a per-provider list)
        models: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "docqa=warn",
        1 => "docqa=info",
        _ => "docqa=debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = RagConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::info!("Embedding model: {}", config.embeddings.model);
    tracing::info!("LLM: {} / {}", config.llm.provider.name(), config.llm.model_name());

    match cli.command {
        Commands::Ingest { file, persist_dir } => {
            config.index.persist = true;
            if let Some(dir) = persist_dir {
                config.index.directory = dir;
            }
            ingest(config, file).await
        }
        Commands::Ask {
            question,
            index,
            k,
            show_sources,
        } => {
            let dir = index.unwrap_or_else(|| config.index.directory.clone());
            ask(config, dir, &question, k, show_sources).await
        }
        Commands::Chat { file, k } => chat(config, file, k).await,
        Commands::Probe { models } => run_probe(config, models).await,
    }
}

async fn ingest(config: RagConfig, file: PathBuf) -> Result<()> {
    let mut pipeline = QaPipeline::from_config(config)?;

    let spinner = spinner(format!("Processing {}...", file.display()))?;
    let result = pipeline.process_document(&file).await;
    spinner.finish_and_clear();
    let session = result?;

    println!(
        "{} Processed {} into {} chunks",
        style("✓").green(),
        session.source.display(),
        session.chunk_count
    );
    if let Some(path) = &session.persisted_to {
        println!("  Index saved to {}", path.display());
    }
    Ok(())
}

async fn ask(
    config: RagConfig,
    dir: PathBuf,
    question: &str,
    k: Option<usize>,
    show_sources: bool,
) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    let mut pipeline = QaPipeline::from_config(config)?;
    pipeline.open_existing(&dir).await?;

    let spinner = spinner("Thinking...".to_string())?;
    let result = pipeline.ask_with_k(question, k).await;
    spinner.finish_and_clear();
    let answer = result?;

    print_answer(&answer, show_sources);
    Ok(())
}

async fn chat(config: RagConfig, file: PathBuf, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(config.retrieval.top_k);
    let mut pipeline = QaPipeline::from_config(config)?;

    let spinner = spinner(format!("Processing {}...", file.display()))?;
    let result = pipeline.process_document(&file).await;
    spinner.finish_and_clear();
    let session = result?;

    println!(
        "{} Document processed: {} chunks. Ask away (type 'exit' to quit).",
        style("✓").green(),
        session.chunk_count
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n{} ", style("Question:").cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let spinner = self::spinner("Thinking...".to_string())?;
        let result = pipeline.ask_with_k(question, k).await;
        spinner.finish_and_clear();

        // A failed question does not end the session
        match result {
            Ok(answer) => print_answer(&answer, true),
            Err(e) => report_error(&e.into()),
        }
    }

    Ok(())
}

async fn run_probe(config: RagConfig, models: Vec<String>) -> Result<()> {
    let llm_config = providers::llm_config_for(&config);
    let candidates = if models.is_empty() {
        probe::default_candidates(llm_config.provider)
    } else {
        models
    };

    println!(
        "Probing {} models on {}",
        candidates.len(),
        style(llm_config.provider.name()).bold()
    );

    let report = probe::probe_models(&candidates, |model| {
        providers::completion_for_model(&llm_config, model)
    })
    .await;

    for attempt in &report.attempts {
        match &attempt.outcome {
            Ok(reply) => println!(
                "{} {}: {}",
                style("✓").green(),
                attempt.model,
                reply.trim()
            ),
            Err(e) => println!("{} {}: {}", style("✗").red(), attempt.model, e),
        }
    }

    match report.working_model() {
        Some(model) => {
            println!("\nUse {} (set DOCQA_LLM_MODEL={})", style(model).bold(), model);
            Ok(())
        }
        None => anyhow::bail!("none of the {} candidate models answered", candidates.len()),
    }
}

fn print_answer(answer: &Answer, show_sources: bool) {
    println!("\n{}", style("Answer").green().bold());
    println!("{}", answer.text);

    if !show_sources || answer.supporting_chunks.is_empty() {
        return;
    }

    println!("\n{}", style("Sources").yellow().bold());
    for (i, hit) in answer.supporting_chunks.hits().iter().enumerate() {
        let meta = &hit.chunk.metadata;
        println!(
            "{} page {}/{}, similarity {:.3}",
            style(format!("[{}]", i + 1)).bold(),
            meta.page,
            meta.total_pages,
            hit.similarity()
        );
        println!("{}\n", style(hit.chunk.preview(SOURCE_PREVIEW_CHARS)).dim());
    }
}

fn spinner(message: String) -> Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn report_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", style("Error:").red().bold(), error);

    if let Some(hint) = error
        .downcast_ref::<docqa::Error>()
        .and_then(docqa::Error::remediation)
    {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }
}
