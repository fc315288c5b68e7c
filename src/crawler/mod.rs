//! Crawler module for fetching pages and growing the link graph
//!
//! This module contains the core crawling logic, including:
//! - The document source abstraction and its MediaWiki client
//! - API response parsing and HTML-to-text conversion
//! - Frontier selection and the circuit breaker
//! - Resolving fetched documents into pages and links
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod resolver;
mod scheduler;

pub use coordinator::{current_timestamp, Coordinator, CrawlOutcome, CrawlReport};
pub use fetcher::{build_http_client, Document, DocumentSource, MediaWikiSource, SourceError};
pub use parser::{html_to_text, is_disambiguation, parse_response};
pub use resolver::{resolve_fetched, ResolveOutcome};
pub use scheduler::{seed_frontier, CircuitBreaker, CrawlCandidate, Frontier};

use crate::config::Config;
use crate::storage::Storage;
use crate::SumiError;

/// Runs a crawl of up to `count` pages against the configured MediaWiki API
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `storage` - An open store handle
/// * `count` - Number of crawl attempts to make
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed or the frontier ran dry
/// * `Err(SumiError)` - Crawl aborted
pub async fn crawl<S: Storage>(
    config: &Config,
    storage: S,
    count: u32,
) -> Result<CrawlReport, SumiError> {
    let source = MediaWikiSource::new(&config.source, &config.user_agent)?;
    let mut coordinator = Coordinator::new(storage, source, config.crawler.clone());
    coordinator.run(count).await
}
