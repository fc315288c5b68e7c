//! Inverted index builder
//!
//! Pulls crawled pages that still hold raw text, writes one posting per
//! distinct token, then compacts the page. Compaction doubles as the
//! completion marker: a page holding compressed text is never selected again,
//! while a page interrupted before compaction is simply re-indexed (posting
//! inserts are idempotent).

use crate::config::IndexerConfig;
use crate::index::compression::{compress_text, decompress_text};
use crate::index::tokenizer::{tokenize, TokenFilter};
use crate::state::PageState;
use crate::storage::{PageRecord, Storage, StorageError};
use crate::SumiError;

/// Result of indexing a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPage {
    pub page_id: i64,
    pub title: String,
    /// Distinct tokens that survived the filter
    pub tokens: usize,
    /// Postings that did not exist before
    pub new_postings: usize,
}

/// Totals for an index run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: u32,
    pub postings: u64,
    /// True if the run stopped because no more pages were waiting
    pub exhausted: bool,
}

/// Batch job turning crawled pages into postings
pub struct IndexBuilder<S: Storage> {
    storage: S,
    filter: TokenFilter,
    config: IndexerConfig,
}

impl<S: Storage> IndexBuilder<S> {
    /// Creates a builder over an explicit store handle
    pub fn new(storage: S, filter: TokenFilter, config: IndexerConfig) -> Self {
        Self {
            storage,
            filter,
            config,
        }
    }

    /// Borrows the underlying store
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the underlying store
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Indexes up to `limit` pages (capped by the configured batch size)
    ///
    /// Fails with `NoWorkAvailable` if nothing is waiting. Commits are left
    /// to the caller.
    pub fn index_batch(&mut self, limit: u32) -> Result<Vec<IndexedPage>, SumiError> {
        let pages = self.next_pages(limit)?;
        pages.iter().map(|page| self.index_page(page)).collect()
    }

    /// Indexes up to `count` pages, committing every `commit_frequency` pages
    ///
    /// Running out of work after at least one page ends the run normally;
    /// running out before any page propagates `NoWorkAvailable`.
    pub fn run(&mut self, count: u32) -> Result<IndexReport, SumiError> {
        let commit_frequency = self.config.commit_frequency.max(1);
        let mut report = IndexReport::default();

        while report.indexed < count {
            let pages = match self.next_pages(count - report.indexed) {
                Ok(pages) => pages,
                Err(SumiError::NoWorkAvailable) if report.indexed > 0 => {
                    tracing::info!("No more pages waiting to be indexed");
                    report.exhausted = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            for page in &pages {
                if report.indexed % commit_frequency == 0 {
                    self.storage.checkpoint()?;
                }

                let indexed = self.index_page(page)?;
                report.indexed += 1;
                report.postings += indexed.new_postings as u64;
            }
        }

        self.storage.flush()?;
        tracing::info!(
            "Indexed {} pages ({} new postings)",
            report.indexed,
            report.postings
        );
        Ok(report)
    }

    fn next_pages(&self, limit: u32) -> Result<Vec<PageRecord>, SumiError> {
        let batch = limit.clamp(1, self.config.batch_size.max(1));
        let pages = self.storage.pages_needing_index(batch)?;
        if pages.is_empty() {
            return Err(SumiError::NoWorkAvailable);
        }
        Ok(pages)
    }

    /// Writes postings for one page, then compacts it
    fn index_page(&mut self, page: &PageRecord) -> Result<IndexedPage, SumiError> {
        let state = page.state();
        let body = match page.raw_text.as_deref() {
            Some(body) if state.needs_indexing() => body,
            _ => {
                return Err(StorageError::InvalidTransition {
                    page_id: page.id,
                    from: state,
                    to: PageState::Indexed,
                }
                .into())
            }
        };

        tracing::debug!("Indexing {}: {}", page.id, page.title);

        let tokens = tokenize(body, &self.filter);
        let mut new_postings = 0;
        for token in &tokens {
            let word_id = self.storage.word_id(token)?;
            if self.storage.insert_mention(word_id, page.id)? {
                new_postings += 1;
            }
        }

        let compressed = compress_text(body)?;
        self.storage.compact_page(page.id, &compressed)?;

        tracing::info!(
            "Indexed {}: {} ({} tokens, {} new postings)",
            page.id,
            page.title,
            tokens.len(),
            new_postings
        );

        Ok(IndexedPage {
            page_id: page.id,
            title: page.title.clone(),
            tokens: tokens.len(),
            new_postings,
        })
    }
}

/// Returns the stored text of a page, decompressing it if already indexed
pub fn page_text(storage: &dyn Storage, page_id: i64) -> Result<Option<String>, SumiError> {
    let Some(page) = storage.get_page(page_id)? else {
        return Ok(None);
    };

    match (page.raw_text, page.compressed_text) {
        (_, Some(compressed)) => Ok(Some(decompress_text(&compressed)?)),
        (Some(raw), None) => Ok(Some(raw)),
        (None, None) => Ok(None),
    }
}
