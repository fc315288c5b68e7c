//! Storage module for persisting crawl and index data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Page rows and their raw or compacted text
//! - Resolved links and the open-link frontier
//! - The word dictionary and inverted index postings
//! - Checkpoint commits for crash-resumable batch runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::PageState;
use crate::SumiError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(SumiError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SumiError> {
    SqliteStorage::new(path)
}

/// Represents a page in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: i64,
    pub title: String,
    pub raw_text: Option<String>,
    pub compressed_text: Option<Vec<u8>>,
    pub crawled_at: i64,
}

impl PageRecord {
    /// Derives the lifecycle state from which text columns are populated
    pub fn state(&self) -> PageState {
        PageState::from_columns(self.raw_text.is_some(), self.compressed_text.is_some())
    }

    /// Returns true if the page was crawled within `window` seconds of `now`
    pub fn is_fresh(&self, now: i64, window: i64) -> bool {
        self.crawled_at > now - window
    }
}

/// A pending frontier entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenLinkRecord {
    pub title: String,
    pub added_at: i64,
    /// `None` when the title was seeded by an operator
    pub from_id: Option<i64>,
}

/// Represents a resolved link between two pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRecord {
    pub from_id: i64,
    pub to_id: i64,
}
