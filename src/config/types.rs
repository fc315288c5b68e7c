use serde::Deserialize;

/// Main configuration structure for Sumi-Index
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Frontier and crawl-loop behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of candidates pulled from the store per batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Consecutive fetch failures that abort a run
    #[serde(
        rename = "max-consecutive-failures",
        default = "default_max_consecutive_failures"
    )]
    pub max_consecutive_failures: u32,

    /// Seconds before a crawled page may be fetched again
    #[serde(rename = "recrawl-window", default = "default_day_secs")]
    pub recrawl_window: i64,

    /// Seconds a failed or skipped open link is pushed back
    #[serde(rename = "failure-penalty", default = "default_day_secs")]
    pub failure_penalty: i64,

    /// Number of attempts between commits
    #[serde(rename = "commit-frequency", default = "default_commit_frequency")]
    pub commit_frequency: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_consecutive_failures: default_max_consecutive_failures(),
            recrawl_window: default_day_secs(),
            failure_penalty: default_day_secs(),
            commit_frequency: default_commit_frequency(),
        }
    }
}

/// Index builder behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerConfig {
    /// Maximum number of pages pulled from the store per batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Number of indexed pages between commits
    #[serde(rename = "commit-frequency", default = "default_commit_frequency")]
    pub commit_frequency: u32,

    /// Optional path to a stop-word list, one word per line
    #[serde(rename = "stop-words-path", default)]
    pub stop_words_path: Option<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            commit_frequency: default_commit_frequency(),
            stop_words_path: None,
        }
    }
}

/// Document source (MediaWiki API) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Endpoint of the MediaWiki action API
    #[serde(rename = "api-url", default = "default_api_url")]
    pub api_url: String,

    /// Minimum time between two API requests (milliseconds)
    #[serde(
        rename = "minimum-request-interval",
        default = "default_request_interval"
    )]
    pub minimum_request_interval: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            minimum_request_interval: default_request_interval(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_batch_size() -> u32 {
    10
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_day_secs() -> i64 {
    86_400
}

fn default_commit_frequency() -> u32 {
    1
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_request_interval() -> u64 {
    1000
}
