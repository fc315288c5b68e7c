use std::time::{Duration, Instant};

/// Tracks request spacing against a single document source
///
/// The source owns its own politeness: every call waits until at least
/// `min_interval` has passed since the previous call started.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    /// Minimum time between two requests
    pub min_interval: Duration,

    /// Timestamp of the last request
    pub last_request_time: Option<Instant>,

    /// Number of requests made through this pacer
    pub request_count: u64,
}

impl RequestPacer {
    /// Creates a pacer enforcing the given minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request_time: None,
            request_count: 0,
        }
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        if let Some(last) = self.last_request_time {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                return Some(self.min_interval - elapsed);
            }
        }
        None
    }

    /// Records that a request was made
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Waits until the next request is allowed, then records it
    pub async fn wait_turn(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Pacing document source, sleeping {:?}", wait);
            tokio::time::sleep(wait).await;
        }
        self.record_request(Instant::now());
    }
}
