//! Statistics generation from the index database
//!
//! This module provides functionality for extracting and displaying
//! crawl and index statistics from the storage layer.

use crate::state::PageState;
use crate::storage::Storage;
use crate::SumiError;
use std::collections::HashMap;

/// Crawl and index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Count of titles by lifecycle state
    ///
    /// `Open` counts distinct open-link titles; the others count page rows.
    pub pages_by_state: HashMap<PageState, u64>,

    /// Open link rows (one per referrer)
    pub open_link_rows: u64,

    /// Resolved links between stored pages
    pub total_links: u64,

    /// Distinct words in the dictionary
    pub words: u64,

    /// Word-to-page postings
    pub mentions: u64,
}

impl IndexStatistics {
    /// Number of pages with a stored body
    pub fn stored_pages(&self) -> u64 {
        PageState::all_states()
            .into_iter()
            .filter(PageState::is_crawled)
            .map(|state| self.count(state))
            .sum()
    }

    /// Number of titles in the given state
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(SumiError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<IndexStatistics, SumiError> {
    let mut pages_by_state = HashMap::new();
    for state in PageState::all_states() {
        pages_by_state.insert(state, storage.count_pages_by_state(state)?);
    }

    Ok(IndexStatistics {
        pages_by_state,
        open_link_rows: storage.count_open_links()?,
        total_links: storage.count_links()?,
        words: storage.count_words()?,
        mentions: storage.count_mentions()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &IndexStatistics) {
    println!("=== Index Statistics ===\n");

    println!("Frontier:");
    println!(
        "  Open titles: {} ({} referrer rows)",
        stats.count(PageState::Open),
        stats.open_link_rows
    );
    println!();

    println!("Pages:");
    println!("  Stored: {}", stats.stored_pages());
    for state in [PageState::Crawled, PageState::Indexed] {
        let count = stats.count(state);
        let percentage = if stats.stored_pages() > 0 {
            (count as f64 / stats.stored_pages() as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!("Link graph:");
    println!("  Resolved links: {}", stats.total_links);
    println!();

    println!("Inverted index:");
    println!("  Words: {}", stats.words);
    println!("  Mentions: {}", stats.mentions);
}
