//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use sumi_index::config::CrawlerConfig;
use sumi_index::crawler::{Coordinator, Document, DocumentSource, SourceError};
use sumi_index::storage::SqliteStorage;

pub const DAY: i64 = 86_400;

/// In-process document source serving a fixed set of pages
///
/// Titles not in the table are reported as not found. A failing source
/// answers every request with HTTP 503.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    by_title: HashMap<String, Document>,
    failing: bool,
    pub title_calls: Vec<String>,
    pub id_calls: Vec<i64>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn page(mut self, id: i64, title: &str, body: &str, links: &[&str]) -> Self {
        self.by_title.insert(
            title.to_string(),
            Document {
                id,
                title: title.to_string(),
                body: body.to_string(),
                links: links.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// Makes `from` resolve to the already registered page `to`
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        if let Some(doc) = self.by_title.get(to).cloned() {
            self.by_title.insert(from.to_string(), doc);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.title_calls.len() + self.id_calls.len()
    }

    fn unavailable(&self, target: String) -> SourceError {
        SourceError::Status {
            target,
            status: 503,
        }
    }
}

#[async_trait]
impl DocumentSource for ScriptedSource {
    async fn fetch_by_id(&mut self, id: i64) -> Result<Document, SourceError> {
        self.id_calls.push(id);
        if self.failing {
            return Err(self.unavailable(id.to_string()));
        }
        self.by_title
            .values()
            .find(|doc| doc.id == id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }

    async fn fetch_by_title(&mut self, title: &str) -> Result<Document, SourceError> {
        self.title_calls.push(title.to_string());
        if self.failing {
            return Err(self.unavailable(title.to_string()));
        }
        self.by_title
            .get(title)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(title.to_string()))
    }
}

pub fn memory_coordinator(source: ScriptedSource) -> Coordinator<SqliteStorage, ScriptedSource> {
    Coordinator::new(
        SqliteStorage::open_in_memory().expect("in-memory database"),
        source,
        CrawlerConfig::default(),
    )
}

pub fn disk_coordinator(
    path: &Path,
    source: ScriptedSource,
    config: CrawlerConfig,
) -> Coordinator<SqliteStorage, ScriptedSource> {
    Coordinator::new(
        SqliteStorage::new(path).expect("on-disk database"),
        source,
        config,
    )
}
