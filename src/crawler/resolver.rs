//! Link resolution for fetched documents
//!
//! Resolving a fetched document turns every open link that pointed at it
//! (under the requested title or its canonical title) into a resolved edge,
//! stores the body unless the page is still fresh, and queues its outbound
//! links.

use crate::crawler::fetcher::Document;
use crate::storage::{Storage, StorageResult};

/// What resolving a fetched document did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The body was (re)stored and outbound links recorded
    Stored {
        /// Outbound links that hit an existing page
        direct_links: usize,
        /// Outbound links queued as open links
        open_links: usize,
    },
    /// The page was crawled within the freshness window; body untouched
    AlreadyFresh,
}

/// Applies a fetched document to the store
///
/// All writes happen inside one `Storage::atomically` block, so a failure
/// leaves the frontier as it was. Calling this twice with the same inputs
/// leaves the store unchanged the second time.
///
/// # Arguments
///
/// * `storage` - The store handle
/// * `requested_title` - The title the fetch was issued for
/// * `document` - The fetched document (canonical title and id)
/// * `now` - Current epoch seconds
/// * `recrawl_window` - Freshness window in seconds
pub fn resolve_fetched<S: Storage>(
    storage: &mut S,
    requested_title: &str,
    document: &Document,
    now: i64,
    recrawl_window: i64,
) -> StorageResult<ResolveOutcome> {
    storage.atomically(|storage| {
        let titles: Vec<&str> = if requested_title == document.title {
            vec![requested_title]
        } else {
            vec![requested_title, document.title.as_str()]
        };

        for from_id in storage.open_link_referrers(&titles)?.into_iter().flatten() {
            storage.insert_link(from_id, document.id)?;
        }
        let resolved = storage.delete_open_links(&titles)?;
        tracing::debug!(
            "Resolved {} open links for {} ({})",
            resolved,
            document.title,
            document.id
        );

        if let Some(existing) = storage.get_page(document.id)? {
            if existing.is_fresh(now, recrawl_window) {
                return Ok(ResolveOutcome::AlreadyFresh);
            }
        }

        storage.upsert_page(document.id, &document.title, &document.body, now)?;

        let mut direct_links = 0;
        let mut open_links = 0;
        for title in &document.links {
            match storage.find_page_id_by_title(title)? {
                Some(to_id) => {
                    storage.insert_link(document.id, to_id)?;
                    direct_links += 1;
                }
                None => {
                    storage.insert_open_link(title, now, Some(document.id))?;
                    open_links += 1;
                }
            }
        }

        Ok(ResolveOutcome::Stored {
            direct_links,
            open_links,
        })
    })
}
