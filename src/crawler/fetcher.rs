//! Document source implementation
//!
//! This module handles all requests for documents, including:
//! - The `DocumentSource` trait the crawl loop depends on
//! - Building HTTP clients with proper user agent strings
//! - A MediaWiki API client that resolves redirects and paces its requests
//! - Error classification

use crate::config::{SourceConfig, UserAgentConfig};
use crate::crawler::parser::parse_response;
use crate::state::RequestPacer;
use crate::{ConfigError, SumiError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A fetched document in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable page id assigned by the source
    pub id: i64,
    /// Canonical title (differs from the requested title after a redirect)
    pub title: String,
    /// Plain body text
    pub body: String,
    /// Titles of outbound article links, deduplicated
    pub links: Vec<String>,
}

/// Errors reported by a document source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("HTTP error for {target}: {source}")]
    Http {
        target: String,
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {target}")]
    Status { target: String, status: u16 },

    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("Malformed API response: {0}")]
    Decode(String),
}

/// Anything that can produce documents by id or title
///
/// Implementations are responsible for their own request pacing and for
/// resolving redirects to the canonical title.
#[async_trait]
pub trait DocumentSource: Send {
    /// Fetches a previously seen page by its stable id
    async fn fetch_by_id(&mut self, id: i64) -> Result<Document, SourceError>;

    /// Fetches a page by title, following redirects
    async fn fetch_by_title(&mut self, title: &str) -> Result<Document, SourceError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_index::config::UserAgentConfig;
/// use sumi_index::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiIndex".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Document source backed by the MediaWiki `action=parse` API
pub struct MediaWikiSource {
    client: Client,
    api_url: Url,
    pacer: RequestPacer,
}

impl MediaWikiSource {
    /// Creates a source from configuration
    pub fn new(source: &SourceConfig, user_agent: &UserAgentConfig) -> Result<Self, SumiError> {
        let api_url = Url::parse(&source.api_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_url: {}", e)))?;

        let client = build_http_client(user_agent).map_err(|e| SourceError::Http {
            target: source.api_url.clone(),
            source: e,
        })?;

        Ok(Self {
            client,
            api_url,
            pacer: RequestPacer::new(Duration::from_millis(source.minimum_request_interval)),
        })
    }

    /// Number of API requests made so far
    pub fn request_count(&self) -> u64 {
        self.pacer.request_count
    }

    fn parse_url(&self, key: &str, value: &str) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "parse")
            .append_pair("format", "json")
            .append_pair("formatversion", "2")
            .append_pair("redirects", "1")
            .append_pair("prop", "text|links")
            .append_pair("disableeditsection", "1")
            .append_pair(key, value);
        url
    }

    async fn request(&mut self, key: &str, value: &str) -> Result<Document, SourceError> {
        let url = self.parse_url(key, value);
        self.pacer.wait_turn().await;

        tracing::debug!("Requesting {}={} from {}", key, value, self.api_url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Http {
                target: value.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                target: value.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| SourceError::Http {
            target: value.to_string(),
            source: e,
        })?;

        parse_response(&body, value)
    }
}

#[async_trait]
impl DocumentSource for MediaWikiSource {
    async fn fetch_by_id(&mut self, id: i64) -> Result<Document, SourceError> {
        self.request("pageid", &id.to_string()).await
    }

    async fn fetch_by_title(&mut self, title: &str) -> Result<Document, SourceError> {
        self.request("page", title).await
    }
}
