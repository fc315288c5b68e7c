//! Integration tests for the MediaWiki document source
//!
//! These tests use wiremock to stand in for the MediaWiki action API.

use std::time::{Duration, Instant};
use sumi_index::config::{SourceConfig, UserAgentConfig};
use sumi_index::crawler::{DocumentSource, MediaWikiSource, SourceError};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/w/api.php";

fn source_for(server: &MockServer, interval_ms: u64) -> MediaWikiSource {
    let source = SourceConfig {
        api_url: format!("{}{}", server.uri(), API_PATH),
        minimum_request_interval: interval_ms,
    };
    let user_agent = UserAgentConfig {
        crawler_name: "TestIndexer".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    MediaWikiSource::new(&source, &user_agent).expect("Failed to build source")
}

const CAT_RESPONSE: &str = r##"{
    "parse": {
        "title": "Cat",
        "pageid": 6678,
        "redirects": [{"from": "Felis catus", "to": "Cat"}],
        "text": "<div class=\"mw-parser-output\"><p>The <b>cat</b> is a small mammal.<sup class=\"reference\"><a href=\"#cite1\">[1]</a></sup></p>\n<p>See also <a href=\"/wiki/Dog\">dogs</a>.</p></div>",
        "links": [
            {"ns": 0, "title": "Dog", "exists": true},
            {"ns": 4, "title": "Wikipedia:About", "exists": true},
            {"ns": 0, "title": "Mammal", "exists": true}
        ]
    }
}"##;

#[tokio::test]
async fn test_fetch_by_title_follows_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "parse"))
        .and(query_param("format", "json"))
        .and(query_param("redirects", "1"))
        .and(query_param("page", "Felis catus"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAT_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let mut source = source_for(&server, 100);
    let doc = source.fetch_by_title("Felis catus").await.unwrap();

    assert_eq!(doc.id, 6678);
    assert_eq!(doc.title, "Cat");
    assert_eq!(doc.body, "The cat is a small mammal.\nSee also dogs.");
    assert_eq!(doc.links, vec!["Dog".to_string(), "Mammal".to_string()]);
}

#[tokio::test]
async fn test_fetch_by_id_uses_pageid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("pageid", "6678"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAT_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let mut source = source_for(&server, 100);
    let doc = source.fetch_by_id(6678).await.unwrap();

    assert_eq!(doc.id, 6678);
    assert_eq!(doc.title, "Cat");
}

#[tokio::test]
async fn test_missing_title_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}}"#,
        ))
        .mount(&server)
        .await;

    let mut source = source_for(&server, 100);
    let result = source.fetch_by_title("No Such Page").await;

    assert!(matches!(result, Err(SourceError::NotFound(title)) if title == "No Such Page"));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut source = source_for(&server, 100);
    let result = source.fetch_by_title("Cat").await;

    assert!(matches!(
        result,
        Err(SourceError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_requests_are_paced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAT_RESPONSE))
        .expect(2)
        .mount(&server)
        .await;

    let mut source = source_for(&server, 300);
    let start = Instant::now();
    source.fetch_by_title("Cat").await.unwrap();
    source.fetch_by_title("Cat").await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(source.request_count(), 2);
}
