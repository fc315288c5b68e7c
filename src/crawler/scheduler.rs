//! Scheduler for selecting the crawl frontier
//!
//! This module handles:
//! - Choosing the next batch of candidates from the store
//! - Preferring never-seen open links over stale pages
//! - Seeding the frontier with operator-supplied titles
//! - Tracking consecutive fetch failures (the circuit breaker)

use crate::config::CrawlerConfig;
use crate::storage::Storage;
use crate::SumiError;

/// A title selected for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlCandidate {
    /// Known page ID for a recrawl, `None` for an open link
    pub page_id: Option<i64>,

    /// Title to fetch (and to reschedule on failure)
    pub title: String,
}

impl CrawlCandidate {
    /// A candidate taken from the open-link frontier
    pub fn open(title: impl Into<String>) -> Self {
        Self {
            page_id: None,
            title: title.into(),
        }
    }

    /// A stored page whose crawl has gone stale
    pub fn recrawl(page_id: i64, title: impl Into<String>) -> Self {
        Self {
            page_id: Some(page_id),
            title: title.into(),
        }
    }

    /// Returns true if this candidate refers to an existing page
    pub fn is_recrawl(&self) -> bool {
        self.page_id.is_some()
    }
}

/// Frontier selection policy
///
/// Stateless apart from configuration: every call reads the current frontier
/// from the store, so a restarted run picks up exactly where the last
/// committed checkpoint left it.
#[derive(Debug, Clone)]
pub struct Frontier {
    batch_size: u32,
    recrawl_window: i64,
}

impl Frontier {
    /// Creates a frontier from crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            recrawl_window: config.recrawl_window,
        }
    }

    /// Effective batch size for a requested limit
    pub fn batch_limit(&self, limit: u32) -> u32 {
        limit.clamp(1, self.batch_size)
    }

    /// Selects the next candidates to crawl
    ///
    /// Open links eligible at `now` come first, oldest first. Remaining slots
    /// are filled with pages crawled at or before `now - recrawl_window`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<CrawlCandidate>)` - At least one candidate
    /// * `Err(SumiError::EmptyFrontier)` - Nothing is eligible
    pub fn next_batch<S: Storage + ?Sized>(
        &self,
        storage: &S,
        limit: u32,
        now: i64,
    ) -> Result<Vec<CrawlCandidate>, SumiError> {
        let cap = self.batch_limit(limit);

        let mut batch: Vec<CrawlCandidate> = storage
            .oldest_open_links(now, cap)?
            .into_iter()
            .map(CrawlCandidate::open)
            .collect();

        let remaining = cap.saturating_sub(batch.len() as u32);
        if remaining > 0 {
            let cutoff = now - self.recrawl_window;
            batch.extend(
                storage
                    .pages_due_for_recrawl(cutoff, remaining)?
                    .into_iter()
                    .map(|(id, title)| CrawlCandidate::recrawl(id, title)),
            );
        }

        if batch.is_empty() {
            return Err(SumiError::EmptyFrontier);
        }

        tracing::debug!("Selected {} crawl candidates", batch.len());
        Ok(batch)
    }
}

/// Counts consecutive fetch failures and trips at a threshold
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    threshold: u32,
    consecutive_failures: u32,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
        }
    }

    /// Records a failure; returns true if the breaker has tripped
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures += 1;
        self.consecutive_failures >= self.threshold
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.consecutive_failures
    }
}

/// Adds operator-supplied titles to the frontier
///
/// Seeds have no referrer. Blank titles are ignored and titles already
/// seeded keep their original position. Returns the number of new rows.
pub fn seed_frontier<S: Storage + ?Sized>(
    storage: &mut S,
    titles: &[String],
    now: i64,
) -> Result<usize, SumiError> {
    let mut added = 0;
    for title in titles.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if storage.insert_open_link(title, now, None)? {
            tracing::info!("Seeded {}", title);
            added += 1;
        } else {
            tracing::debug!("Already seeded: {}", title);
        }
    }
    Ok(added)
}
