//! Sumi-Index main entry point
//!
//! This is the command-line interface for the Sumi-Index crawler and indexer.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use sumi_index::config::{load_config_with_hash, Config};
use sumi_index::crawler::{crawl, current_timestamp, seed_frontier};
use sumi_index::index::{page_text, IndexBuilder, TokenFilter};
use sumi_index::output::{load_statistics, print_statistics};
use sumi_index::storage::{open_storage, Storage};
use tracing_subscriber::EnvFilter;

/// Number of pages a run handles when the prompt gets no usable answer
const DEFAULT_RUN_SIZE: u32 = 10;

/// Sumi-Index: a resumable wiki crawler and inverted word index
///
/// Sumi-Index grows a link graph from seed titles, stores each page's text,
/// and indexes the words of crawled pages. Every command can be interrupted
/// and re-run; work resumes from the last commit.
#[derive(Parser, Debug)]
#[command(name = "sumi-index")]
#[command(version = "1.0.0")]
#[command(about = "A resumable wiki crawler and inverted word index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add titles to the crawl frontier
    Seed {
        /// Page titles to start from
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Crawl pages from the frontier
    Crawl {
        /// Number of pages to attempt (prompts if omitted)
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },

    /// Index crawled pages
    Index {
        /// Number of pages to index (prompts if omitted)
        #[arg(short = 'n', long)]
        count: Option<u32>,
    },

    /// Show statistics from the database
    Stats,

    /// Show a stored page, its links and its text
    Show {
        /// Page ID
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Seed { titles } => handle_seed(&config, &titles),
        Command::Crawl { count } => {
            let count = count.unwrap_or_else(|| prompt_count("Crawl how many pages?"));
            handle_crawl(&config, count).await
        }
        Command::Index { count } => {
            let count = count.unwrap_or_else(|| prompt_count("Index how many pages?"));
            handle_index(&config, count)
        }
        Command::Stats => handle_stats(&config),
        Command::Show { id } => handle_show(&config, id),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_index=info,warn"),
            1 => EnvFilter::new("sumi_index=debug,info"),
            2 => EnvFilter::new("sumi_index=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Asks for a page count on stdin; anything unparseable means the default
fn prompt_count(question: &str) -> u32 {
    print!("{} ({}) ", question, DEFAULT_RUN_SIZE);
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return DEFAULT_RUN_SIZE;
    }
    parse_count(&answer)
}

fn parse_count(answer: &str) -> u32 {
    answer
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_RUN_SIZE)
}

fn handle_seed(config: &Config, titles: &[String]) -> anyhow::Result<()> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let added = seed_frontier(&mut storage, titles, current_timestamp())?;
    println!("Seeded {} new titles ({} given)", added, titles.len());
    Ok(())
}

async fn handle_crawl(config: &Config, count: u32) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    match crawl(config, storage, count).await {
        Ok(report) => {
            println!(
                "Crawled {} pages: {} stored, {} still fresh, {} failed, {} skipped",
                report.attempted, report.stored, report.fresh, report.failed, report.skipped
            );
            if report.exhausted {
                println!("Frontier is empty; seed more titles to continue.");
            }
            Ok(())
        }
        Err(e) if e.is_exhaustion() => {
            println!("Frontier is empty; seed more titles to continue.");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

fn handle_index(config: &Config, count: u32) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    let filter = match &config.indexer.stop_words_path {
        Some(path) => TokenFilter::load(Path::new(path))
            .with_context(|| format!("Failed to read stop words from {}", path))?,
        None => TokenFilter::empty(),
    };
    tracing::info!("Loaded {} stop words", filter.len());

    let mut builder = IndexBuilder::new(storage, filter, config.indexer.clone());
    match builder.run(count) {
        Ok(report) => {
            println!(
                "Indexed {} pages ({} new postings)",
                report.indexed, report.postings
            );
            Ok(())
        }
        Err(e) if e.is_exhaustion() => {
            println!("No crawled pages are waiting to be indexed.");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Indexing failed: {}", e);
            Err(e.into())
        }
    }
}

fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

fn handle_show(config: &Config, id: i64) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    let Some(page) = storage.get_page(id)? else {
        println!("No page with ID {}", id);
        return Ok(());
    };

    let crawled = chrono::DateTime::from_timestamp(page.crawled_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| page.crawled_at.to_string());

    println!("=== {} ({}) ===\n", page.title, page.id);
    println!("State: {}", page.state());
    println!("Crawled: {}", crawled);
    println!("Outgoing links: {}", storage.outgoing_links(id)?.len());
    println!("Incoming links: {}", storage.incoming_links(id)?.len());
    println!("Indexed words: {}", storage.words_for_page(id)?.len());
    println!();

    if let Some(text) = page_text(&storage, id)? {
        println!("{}", text);
    }

    Ok(())
}
