//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::PageState;
use crate::storage::{LinkRecord, OpenLinkRecord, PageRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Invalid state transition for page {page_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        page_id: i64,
        from: PageState,
        to: PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every write is duplicate-tolerant: inserting an edge, open link, word or
/// mention that already exists is a no-op. Durability is controlled by the
/// caller through `checkpoint` and `flush`.
pub trait Storage {
    // ===== Checkpoints =====

    /// Commits all work since the previous checkpoint and opens a new one
    fn checkpoint(&mut self) -> StorageResult<()>;

    /// Commits all pending work without opening a new checkpoint
    fn flush(&mut self) -> StorageResult<()>;

    /// Runs `f` so that either all or none of its writes take effect
    ///
    /// Nests inside an open checkpoint.
    fn atomically<T, F>(&mut self, f: F) -> StorageResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> StorageResult<T>;

    // ===== Page Store =====

    /// Inserts or replaces the crawled body of a page
    ///
    /// Clears any compressed text, so the page goes back to `Crawled`.
    fn upsert_page(
        &mut self,
        id: i64,
        title: &str,
        raw_text: &str,
        crawled_at: i64,
    ) -> StorageResult<()>;

    /// Gets a page by ID
    fn get_page(&self, id: i64) -> StorageResult<Option<PageRecord>>;

    /// Finds the ID of the page with exactly this title
    ///
    /// If several rows share the title, the most recently crawled one wins.
    fn find_page_id_by_title(&self, title: &str) -> StorageResult<Option<i64>>;

    /// Gets `(id, title)` of pages crawled at or before `cutoff`, stalest first
    fn pages_due_for_recrawl(&self, cutoff: i64, limit: u32) -> StorageResult<Vec<(i64, String)>>;

    /// Gets pages with raw text but no compressed text, oldest crawl first
    fn pages_needing_index(&self, limit: u32) -> StorageResult<Vec<PageRecord>>;

    /// Replaces the raw text of a crawled page with its compressed encoding
    ///
    /// This is the durable "indexed" marker. Fails with `InvalidTransition`
    /// unless the page is currently `Crawled`.
    fn compact_page(&mut self, id: i64, compressed_text: &[u8]) -> StorageResult<()>;

    /// Moves a page's crawl timestamp without touching its text
    fn defer_recrawl(&mut self, id: i64, crawled_at: i64) -> StorageResult<()>;

    // ===== Link Graph Store =====

    /// Inserts a resolved edge; returns false if it already existed
    fn insert_link(&mut self, from_id: i64, to_id: i64) -> StorageResult<bool>;

    /// Gets all outgoing edges from a page
    fn outgoing_links(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Gets all incoming edges to a page
    fn incoming_links(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Inserts an open link unless `(title, from_id)` is already queued
    ///
    /// An existing row keeps its original `added_at`. Returns false if the
    /// row already existed.
    fn insert_open_link(
        &mut self,
        title: &str,
        added_at: i64,
        from_id: Option<i64>,
    ) -> StorageResult<bool>;

    /// Sets `added_at` on every open link row for a title
    ///
    /// Returns the number of rows updated.
    fn reschedule_open_link(&mut self, title: &str, added_at: i64) -> StorageResult<usize>;

    /// Gets the referrers of every open link row matching any of the titles
    fn open_link_referrers(&self, titles: &[&str]) -> StorageResult<Vec<Option<i64>>>;

    /// Deletes every open link row matching any of the titles
    fn delete_open_links(&mut self, titles: &[&str]) -> StorageResult<usize>;

    /// Gets distinct open link titles eligible at `now`, oldest first
    fn oldest_open_links(&self, now: i64, limit: u32) -> StorageResult<Vec<String>>;

    /// Gets all open link rows for a title
    fn open_links_for(&self, title: &str) -> StorageResult<Vec<OpenLinkRecord>>;

    // ===== Inverted Index =====

    /// Returns the ID of a word, creating it if needed
    fn word_id(&mut self, text: &str) -> StorageResult<i64>;

    /// Looks up a word without creating it
    fn find_word_id(&self, text: &str) -> StorageResult<Option<i64>>;

    /// Inserts a posting; returns false if it already existed
    fn insert_mention(&mut self, word_id: i64, page_id: i64) -> StorageResult<bool>;

    /// Gets the text of every word mentioned by a page, sorted
    fn words_for_page(&self, page_id: i64) -> StorageResult<Vec<String>>;

    // ===== Statistics =====

    /// Counts titles in a lifecycle state (`Open` counts distinct open link titles)
    fn count_pages_by_state(&self, state: PageState) -> StorageResult<u64>;

    /// Counts open link rows
    fn count_open_links(&self) -> StorageResult<u64>;

    /// Counts resolved edges
    fn count_links(&self) -> StorageResult<u64>;

    /// Counts dictionary words
    fn count_words(&self) -> StorageResult<u64>;

    /// Counts postings
    fn count_mentions(&self) -> StorageResult<u64>;
}
