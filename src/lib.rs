//! Sumi-Index: an incremental link-graph crawler and inverted word index
//!
//! This crate crawls a hyperlinked document corpus (a MediaWiki wiki) from a
//! persistent frontier of open links, maintains the resolved link graph, and
//! turns each crawled document into postings of an inverted word index. All
//! progress lives in SQLite with explicit completion markers, so every run can
//! be interrupted and resumed.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Sumi-Index operations
#[derive(Debug, Error)]
pub enum SumiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Document source error: {0}")]
    Source(#[from] crawler::SourceError),

    /// Neither open links nor stale pages are available to crawl
    #[error("Frontier is empty: no open links or stale pages to crawl")]
    EmptyFrontier,

    /// No crawled page is waiting to be indexed
    #[error("No pages are waiting to be indexed")]
    NoWorkAvailable,

    /// Too many consecutive fetch failures; the run was aborted
    #[error("Circuit breaker tripped after {failures} consecutive fetch failures")]
    CircuitBreakerTripped { failures: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SumiError {
    /// Returns true for batch-level exhaustion signals
    ///
    /// These tell the caller to stop scheduling work in the current run; they
    /// are not failures of already-committed work.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, Self::EmptyFrontier | Self::NoWorkAvailable)
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

// Re-export commonly used types
pub use config::Config;
pub use state::PageState;
