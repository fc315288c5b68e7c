//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sumi-Index database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawled documents; raw_text until indexed, compressed_text afterwards
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    raw_text TEXT,
    compressed_text BLOB,
    crawled_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_title ON pages(title);
CREATE INDEX IF NOT EXISTS idx_pages_crawled ON pages(crawled_at);

-- Crawl frontier: titles seen as links but not yet resolved to a page
CREATE TABLE IF NOT EXISTS open_links (
    title TEXT NOT NULL,
    added_at INTEGER NOT NULL,
    from_id INTEGER
);

-- One row per (title, referrer); all seeded rows share the NULL referrer
CREATE UNIQUE INDEX IF NOT EXISTS idx_open_links_unique
    ON open_links(title, IFNULL(from_id, -1));
CREATE INDEX IF NOT EXISTS idx_open_links_added ON open_links(added_at);

-- Resolved page graph
CREATE TABLE IF NOT EXISTS links (
    from_id INTEGER NOT NULL,
    to_id INTEGER NOT NULL,
    UNIQUE(from_id, to_id)
);

CREATE INDEX IF NOT EXISTS idx_links_to ON links(to_id);

-- Word dictionary
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY,
    text TEXT NOT NULL UNIQUE
);

-- Inverted index postings
CREATE TABLE IF NOT EXISTS mentions (
    word_id INTEGER NOT NULL,
    page_id INTEGER NOT NULL,
    UNIQUE(word_id, page_id)
);

CREATE INDEX IF NOT EXISTS idx_mentions_page ON mentions(page_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
