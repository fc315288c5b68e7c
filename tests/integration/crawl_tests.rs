//! Integration tests for the crawler
//!
//! These tests drive the coordinator against a scripted in-process document
//! source and check the resulting link graph and frontier.

mod common;

use common::{disk_coordinator, memory_coordinator, ScriptedSource, DAY};
use sumi_index::config::CrawlerConfig;
use sumi_index::crawler::{
    current_timestamp, resolve_fetched, seed_frontier, CrawlCandidate, CrawlOutcome, Document,
    ResolveOutcome,
};
use sumi_index::state::PageState;
use sumi_index::storage::{LinkRecord, OpenLinkRecord, SqliteStorage, Storage};
use sumi_index::SumiError;

#[tokio::test]
async fn test_open_links_resolve_to_fetched_page() {
    let source = ScriptedSource::new().page(42, "Cat", "Cats purr.", &["Dog"]);
    let mut coordinator = memory_coordinator(source);

    let storage = coordinator.storage_mut();
    storage.upsert_page(1, "Lion", "Lions roar.", 0).unwrap();
    storage.upsert_page(2, "Tiger", "Tigers swim.", 0).unwrap();
    storage.insert_open_link("Cat", 1_000, Some(1)).unwrap();
    storage.insert_open_link("Cat", 1_000, Some(2)).unwrap();

    let start = current_timestamp();
    let report = coordinator.run(1).await.unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.stored, 1);

    let storage = coordinator.storage();
    assert!(storage.open_links_for("Cat").unwrap().is_empty());
    assert_eq!(
        storage.incoming_links(42).unwrap(),
        vec![
            LinkRecord { from_id: 1, to_id: 42 },
            LinkRecord { from_id: 2, to_id: 42 },
        ]
    );

    let cat = storage.get_page(42).unwrap().unwrap();
    assert_eq!(cat.title, "Cat");
    assert_eq!(cat.raw_text.as_deref(), Some("Cats purr."));
    assert!(cat.crawled_at >= start);

    let dog = storage.open_links_for("Dog").unwrap();
    assert_eq!(dog.len(), 1);
    assert_eq!(dog[0].from_id, Some(42));
    assert_eq!(dog[0].added_at, cat.crawled_at);
}

#[tokio::test]
async fn test_crawl_follows_links_until_exhausted() {
    let source = ScriptedSource::new()
        .page(1, "Cat", "Cats purr.", &["Dog", "Mouse"])
        .page(2, "Dog", "Dogs bark.", &["Cat"]);
    let mut coordinator = memory_coordinator(source);
    seed_frontier(coordinator.storage_mut(), &["Cat".to_string()], 0).unwrap();

    let report = coordinator.run(10).await.unwrap();

    // Mouse is not in the source, so its fetch fails and it is pushed back.
    assert_eq!(report.attempted, 3);
    assert_eq!(report.stored, 2);
    assert_eq!(report.failed, 1);
    assert!(report.exhausted);

    let storage = coordinator.storage();
    assert_eq!(
        storage.outgoing_links(1).unwrap(),
        vec![LinkRecord { from_id: 1, to_id: 2 }]
    );
    assert_eq!(
        storage.outgoing_links(2).unwrap(),
        vec![LinkRecord { from_id: 2, to_id: 1 }]
    );
    assert_eq!(storage.count_pages_by_state(PageState::Crawled).unwrap(), 2);
    assert_eq!(storage.count_pages_by_state(PageState::Open).unwrap(), 1);
}

#[tokio::test]
async fn test_redirect_stores_canonical_title() {
    let source = ScriptedSource::new()
        .page(6678, "Cat", "Cats purr.", &[])
        .redirect("Felis catus", "Cat");
    let mut coordinator = memory_coordinator(source);

    let storage = coordinator.storage_mut();
    storage.upsert_page(1, "Felidae", "Family.", 0).unwrap();
    storage.insert_open_link("Felis catus", 0, Some(1)).unwrap();

    coordinator.run(1).await.unwrap();

    let storage = coordinator.storage();
    assert_eq!(storage.find_page_id_by_title("Cat").unwrap(), Some(6678));
    assert_eq!(storage.find_page_id_by_title("Felis catus").unwrap(), None);
    assert_eq!(storage.count_open_links().unwrap(), 0);
    assert_eq!(
        storage.incoming_links(6678).unwrap(),
        vec![LinkRecord { from_id: 1, to_id: 6678 }]
    );
}

#[test]
fn test_resolving_twice_changes_nothing() {
    let mut storage = SqliteStorage::open_in_memory().unwrap();
    storage.upsert_page(1, "Lion", "Lions roar.", 0).unwrap();
    storage.insert_open_link("Cat", 0, Some(1)).unwrap();
    let cat = Document {
        id: 42,
        title: "Cat".to_string(),
        body: "Cats purr.".to_string(),
        links: vec!["Dog".to_string(), "Lion".to_string()],
    };

    resolve_fetched(&mut storage, "Cat", &cat, 500, DAY).unwrap();
    let links = storage.count_links().unwrap();
    let open_links = storage.count_open_links().unwrap();
    let page = storage.get_page(42).unwrap();

    let second = resolve_fetched(&mut storage, "Cat", &cat, 500, DAY).unwrap();
    assert_eq!(second, ResolveOutcome::AlreadyFresh);
    assert_eq!(storage.count_links().unwrap(), links);
    assert_eq!(storage.count_open_links().unwrap(), open_links);
    assert_eq!(storage.get_page(42).unwrap(), page);
}

#[tokio::test]
async fn test_fresh_page_keeps_body_and_timestamp() {
    let source = ScriptedSource::new().page(7, "Cat", "New body.", &["Dog"]);
    let mut coordinator = memory_coordinator(source);
    let now = current_timestamp();
    let crawled_at = now - (DAY - 1);

    let storage = coordinator.storage_mut();
    storage.upsert_page(7, "Cat", "Old body.", crawled_at).unwrap();
    storage.insert_open_link("Cat", 0, None).unwrap();

    let outcome = coordinator
        .crawl_one(&CrawlCandidate::open("Cat"), now)
        .await
        .unwrap();
    assert!(matches!(outcome, CrawlOutcome::AlreadyFresh { page_id: 7, .. }));

    let page = coordinator.storage().get_page(7).unwrap().unwrap();
    assert_eq!(page.raw_text.as_deref(), Some("Old body."));
    assert_eq!(page.crawled_at, crawled_at);
    assert!(coordinator.storage().open_links_for("Dog").unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_is_pushed_back_by_penalty() {
    let mut coordinator = memory_coordinator(ScriptedSource::failing());
    let old_added_at = 1_000;
    coordinator
        .storage_mut()
        .insert_open_link("Ghost", old_added_at, Some(3))
        .unwrap();

    let start = current_timestamp();
    let report = coordinator.run(1).await.unwrap();
    assert_eq!(report.failed, 1);

    let rows = coordinator.storage().open_links_for("Ghost").unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].added_at > old_added_at);
    assert!(rows[0].added_at >= start + DAY);
    assert_eq!(rows[0].from_id, Some(3));

    // Not eligible again until the penalty has elapsed.
    let report = coordinator.run(1).await.unwrap();
    assert_eq!(report.attempted, 0);
    assert!(report.exhausted);
}

#[tokio::test]
async fn test_circuit_breaker_stops_run_and_keeps_reschedules() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.sqlite");
    let titles: Vec<String> = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .map(|t| t.to_string())
        .collect();

    let mut coordinator = disk_coordinator(
        &db_path,
        ScriptedSource::failing(),
        CrawlerConfig::default(),
    );
    for (i, title) in titles.iter().enumerate() {
        coordinator
            .storage_mut()
            .insert_open_link(title, i as i64, None)
            .unwrap();
    }

    let start = current_timestamp();
    let result = coordinator.run(10).await;
    assert!(matches!(
        result,
        Err(SumiError::CircuitBreakerTripped { failures: 5 })
    ));

    let (storage, source) = coordinator.into_parts();
    assert_eq!(source.calls(), 5);
    drop(storage);

    let reopened = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(reopened.count_pages_by_state(PageState::Crawled).unwrap(), 0);

    let mut rescheduled = 0;
    for title in &titles {
        for row in reopened.open_links_for(title).unwrap() {
            if row.added_at >= start + DAY {
                rescheduled += 1;
            }
        }
    }
    assert_eq!(rescheduled, 5);
    assert_eq!(
        reopened.open_links_for("F").unwrap(),
        vec![OpenLinkRecord {
            title: "F".to_string(),
            added_at: 5,
            from_id: None,
        }]
    );
}

#[tokio::test]
async fn test_disambiguation_is_skipped_without_tripping_breaker() {
    let source = ScriptedSource::new().page(9, "Venus", "Second planet.", &[]);
    let mut coordinator = memory_coordinator(source);

    let storage = coordinator.storage_mut();
    for (i, title) in ["Mercury (disambiguation)", "Mars (disambiguation)"]
        .iter()
        .enumerate()
    {
        storage.insert_open_link(title, i as i64, None).unwrap();
    }
    storage.insert_open_link("Venus", 10, None).unwrap();

    let report = coordinator.run(10).await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.stored, 1);
    assert_eq!(report.failed, 0);
    assert!(report.exhausted);
    assert_eq!(coordinator.source().title_calls, vec!["Venus".to_string()]);

    let rows = coordinator
        .storage()
        .open_links_for("Mercury (disambiguation)")
        .unwrap();
    assert!(rows[0].added_at > current_timestamp());
}

#[tokio::test]
async fn test_stale_page_is_recrawled_by_id() {
    let source = ScriptedSource::new().page(5, "Cat", "Updated body.", &[]);
    let mut coordinator = memory_coordinator(source);
    coordinator
        .storage_mut()
        .upsert_page(5, "Cat", "Original body.", 0)
        .unwrap();
    coordinator.storage_mut().compact_page(5, b"zstd").unwrap();

    let start = current_timestamp();
    let report = coordinator.run(1).await.unwrap();
    assert_eq!(report.stored, 1);
    assert_eq!(coordinator.source().id_calls, vec![5]);
    assert!(coordinator.source().title_calls.is_empty());

    let page = coordinator.storage().get_page(5).unwrap().unwrap();
    assert_eq!(page.state(), PageState::Crawled);
    assert_eq!(page.raw_text.as_deref(), Some("Updated body."));
    assert!(page.crawled_at >= start);
}

#[tokio::test]
async fn test_empty_frontier_ends_run() {
    let mut coordinator = memory_coordinator(ScriptedSource::new());

    let report = coordinator.run(5).await.unwrap();

    assert_eq!(report.attempted, 0);
    assert!(report.exhausted);
    assert_eq!(coordinator.source().calls(), 0);
}

#[tokio::test]
async fn test_crawl_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.sqlite");
    let source = || {
        ScriptedSource::new()
            .page(1, "Cat", "Cats purr.", &["Dog"])
            .page(2, "Dog", "Dogs bark.", &["Cat"])
    };

    let mut first = disk_coordinator(&db_path, source(), CrawlerConfig::default());
    seed_frontier(first.storage_mut(), &["Cat".to_string()], 0).unwrap();
    let report = first.run(1).await.unwrap();
    assert_eq!(report.stored, 1);
    drop(first);

    let mut second = disk_coordinator(&db_path, source(), CrawlerConfig::default());
    let report = second.run(1).await.unwrap();
    assert_eq!(report.stored, 1);
    assert_eq!(second.source().title_calls, vec!["Dog".to_string()]);

    let storage = second.storage();
    assert_eq!(storage.count_links().unwrap(), 2);
    assert_eq!(storage.count_open_links().unwrap(), 0);
}
