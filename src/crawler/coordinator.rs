//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier, the document
//! source and the link resolver together:
//! - Pulling candidate batches from the store
//! - Fetching one candidate at a time
//! - Rescheduling failures and skipping disambiguation pages
//! - Committing at checkpoint boundaries
//! - Aborting when too many fetches fail in a row

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{DocumentSource, SourceError};
use crate::crawler::parser::is_disambiguation;
use crate::crawler::resolver::{resolve_fetched, ResolveOutcome};
use crate::crawler::scheduler::{CircuitBreaker, CrawlCandidate, Frontier};
use crate::storage::Storage;
use crate::SumiError;
use std::collections::VecDeque;
use std::time::Instant;

/// Result of a single crawl attempt
#[derive(Debug)]
pub enum CrawlOutcome {
    /// The page body was stored and its links recorded
    Stored {
        page_id: i64,
        title: String,
        direct_links: usize,
        open_links: usize,
    },
    /// The page was fetched but is still within its freshness window
    AlreadyFresh { page_id: i64, title: String },
    /// The fetch failed; the candidate was pushed back
    FetchFailed { error: SourceError },
    /// Disambiguation page; pushed back without fetching
    DisambiguationSkipped,
}

/// Totals for a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub attempted: u32,
    pub stored: u32,
    pub fresh: u32,
    pub failed: u32,
    pub skipped: u32,
    /// True if the run stopped because the frontier ran dry
    pub exhausted: bool,
}

/// Current time as epoch seconds
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Storage, D: DocumentSource> {
    storage: S,
    source: D,
    frontier: Frontier,
    breaker: CircuitBreaker,
    config: CrawlerConfig,
}

impl<S: Storage, D: DocumentSource> Coordinator<S, D> {
    /// Creates a new coordinator over an explicit store and source
    pub fn new(storage: S, source: D, config: CrawlerConfig) -> Self {
        Self {
            frontier: Frontier::new(&config),
            breaker: CircuitBreaker::new(config.max_consecutive_failures),
            storage,
            source,
            config,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Returns the store and source
    pub fn into_parts(self) -> (S, D) {
        (self.storage, self.source)
    }

    /// Crawls up to `count` candidates
    ///
    /// Every attempt counts toward `count`, whether it stored a page, failed
    /// or was skipped. Work is committed every `commit-frequency` attempts
    /// and once more at the end.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The run finished or the frontier ran dry
    /// * `Err(SumiError::CircuitBreakerTripped)` - Too many consecutive
    ///   failures; committed work is kept
    /// * `Err(SumiError)` - A store error
    pub async fn run(&mut self, count: u32) -> Result<CrawlReport, SumiError> {
        let commit_frequency = self.config.commit_frequency.max(1);
        let mut report = CrawlReport::default();
        let mut pending: VecDeque<CrawlCandidate> = VecDeque::new();
        let start_time = Instant::now();

        self.breaker.reset();
        tracing::info!("Starting crawl of up to {} pages", count);

        while report.attempted < count {
            if pending.is_empty() {
                let remaining = count - report.attempted;
                match self
                    .frontier
                    .next_batch(&self.storage, remaining, current_timestamp())
                {
                    Ok(batch) => pending.extend(batch),
                    Err(SumiError::EmptyFrontier) => {
                        tracing::info!("Frontier is empty, nothing left to crawl");
                        report.exhausted = true;
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }

            let Some(candidate) = pending.pop_front() else {
                break;
            };

            if report.attempted % commit_frequency == 0 {
                self.storage.checkpoint()?;
            }

            let outcome = self.crawl_one(&candidate, current_timestamp()).await?;
            report.attempted += 1;

            match outcome {
                CrawlOutcome::Stored { .. } => {
                    report.stored += 1;
                    self.breaker.record_success();
                }
                CrawlOutcome::AlreadyFresh { .. } => {
                    report.fresh += 1;
                    self.breaker.record_success();
                }
                CrawlOutcome::DisambiguationSkipped => {
                    report.skipped += 1;
                }
                CrawlOutcome::FetchFailed { .. } => {
                    report.failed += 1;
                    if self.breaker.record_failure() {
                        let failures = self.breaker.failures();
                        self.storage.flush()?;
                        tracing::error!(
                            "Stopping crawl after {} consecutive fetch failures",
                            failures
                        );
                        return Err(SumiError::CircuitBreakerTripped { failures });
                    }
                }
            }

            if report.attempted % 10 == 0 {
                let rate = report.attempted as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {}/{} attempted, {} stored, {:.2} pages/sec",
                    report.attempted,
                    count,
                    report.stored,
                    rate
                );
            }
        }

        self.storage.flush()?;
        tracing::info!(
            "Crawl finished: {} attempted, {} stored, {} fresh, {} failed, {} skipped",
            report.attempted,
            report.stored,
            report.fresh,
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    /// Processes a single candidate
    ///
    /// Fetch failures are not errors here: the candidate is rescheduled and
    /// the failure is reported as `CrawlOutcome::FetchFailed`. Only store
    /// errors propagate.
    pub async fn crawl_one(
        &mut self,
        candidate: &CrawlCandidate,
        now: i64,
    ) -> Result<CrawlOutcome, SumiError> {
        if is_disambiguation(&candidate.title) {
            tracing::info!("Skipping disambiguation page {}", candidate.title);
            self.reschedule(candidate, now)?;
            return Ok(CrawlOutcome::DisambiguationSkipped);
        }

        let fetched = match candidate.page_id {
            Some(id) => self.source.fetch_by_id(id).await,
            None => self.source.fetch_by_title(&candidate.title).await,
        };

        let document = match fetched {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!("Failed to fetch {}: {}", candidate.title, error);
                self.reschedule(candidate, now)?;
                return Ok(CrawlOutcome::FetchFailed { error });
            }
        };

        let resolved = resolve_fetched(
            &mut self.storage,
            &candidate.title,
            &document,
            now,
            self.config.recrawl_window,
        )?;

        Ok(match resolved {
            ResolveOutcome::Stored {
                direct_links,
                open_links,
            } => {
                tracing::info!(
                    "Stored {}: {} ({} direct links, {} open links)",
                    document.id,
                    document.title,
                    direct_links,
                    open_links
                );
                CrawlOutcome::Stored {
                    page_id: document.id,
                    title: document.title,
                    direct_links,
                    open_links,
                }
            }
            ResolveOutcome::AlreadyFresh => {
                tracing::debug!("{} is still fresh", document.title);
                CrawlOutcome::AlreadyFresh {
                    page_id: document.id,
                    title: document.title,
                }
            }
        })
    }

    /// Pushes a candidate back after a failure or skip
    ///
    /// Open links become eligible again after the failure penalty. A stored
    /// page has its crawl time moved to `now`, so it waits a full recrawl
    /// window.
    fn reschedule(&mut self, candidate: &CrawlCandidate, now: i64) -> Result<(), SumiError> {
        match candidate.page_id {
            Some(id) => self.storage.defer_recrawl(id, now)?,
            None => {
                let added_at = now.saturating_add(self.config.failure_penalty);
                let rows = self.storage.reschedule_open_link(&candidate.title, added_at)?;
                tracing::debug!(
                    "Rescheduled {} ({} rows) until {}",
                    candidate.title,
                    rows,
                    added_at
                );
            }
        }
        Ok(())
    }
}
