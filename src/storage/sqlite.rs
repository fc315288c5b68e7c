//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::PageState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LinkRecord, OpenLinkRecord, PageRecord};
use crate::SumiError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(20);

const PAGE_COLUMNS: &str = "id, title, raw_text, compressed_text, crawled_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SumiError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SumiError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and dry runs)
    pub fn open_in_memory() -> Result<Self, SumiError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        raw_text: row.get(2)?,
        compressed_text: row.get(3)?,
        crawled_at: row.get(4)?,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        from_id: row.get(0)?,
        to_id: row.get(1)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Checkpoints =====

    fn checkpoint(&mut self) -> StorageResult<()> {
        self.flush()?;
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn atomically<T, F>(&mut self, f: F) -> StorageResult<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> StorageResult<T>,
    {
        self.conn.execute_batch("SAVEPOINT sumi_atomic")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("RELEASE sumi_atomic")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch("ROLLBACK TO sumi_atomic; RELEASE sumi_atomic")
                {
                    tracing::error!("Failed to roll back savepoint: {}", rollback);
                }
                Err(e)
            }
        }
    }

    // ===== Page Store =====

    fn upsert_page(
        &mut self,
        id: i64,
        title: &str,
        raw_text: &str,
        crawled_at: i64,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO pages (id, title, raw_text, compressed_text, crawled_at)
             VALUES (?1, ?2, ?3, NULL, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                raw_text = excluded.raw_text,
                compressed_text = NULL,
                crawled_at = excluded.crawled_at",
            params![id, title, raw_text, crawled_at],
        )?;
        Ok(())
    }

    fn get_page(&self, id: i64) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
                params![id],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn find_page_id_by_title(&self, title: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE title = ?1
                 ORDER BY crawled_at DESC, id DESC LIMIT 1",
                params![title],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn pages_due_for_recrawl(&self, cutoff: i64, limit: u32) -> StorageResult<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title FROM pages WHERE crawled_at <= ?1
             ORDER BY crawled_at ASC, id ASC LIMIT ?2",
        )?;

        let pages = stmt
            .query_map(params![cutoff, limit], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn pages_needing_index(&self, limit: u32) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages
             WHERE raw_text IS NOT NULL AND compressed_text IS NULL
             ORDER BY crawled_at ASC, id ASC LIMIT ?1",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![limit], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn compact_page(&mut self, id: i64, compressed_text: &[u8]) -> StorageResult<()> {
        let page = self.get_page(id)?.ok_or(StorageError::PageNotFound(id))?;
        let from = page.state();
        if !from.can_transition_to(PageState::Indexed) {
            return Err(StorageError::InvalidTransition {
                page_id: id,
                from,
                to: PageState::Indexed,
            });
        }

        self.conn.execute(
            "UPDATE pages SET compressed_text = ?1, raw_text = NULL WHERE id = ?2",
            params![compressed_text, id],
        )?;
        Ok(())
    }

    fn defer_recrawl(&mut self, id: i64, crawled_at: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE pages SET crawled_at = ?1 WHERE id = ?2",
            params![crawled_at, id],
        )?;
        if updated == 0 {
            return Err(StorageError::PageNotFound(id));
        }
        Ok(())
    }

    // ===== Link Graph Store =====

    fn insert_link(&mut self, from_id: i64, to_id: i64) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO links (from_id, to_id) VALUES (?1, ?2)",
            params![from_id, to_id],
        )?;
        Ok(inserted > 0)
    }

    fn outgoing_links(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT from_id, to_id FROM links WHERE from_id = ?1 ORDER BY to_id")?;

        let links = stmt
            .query_map(params![page_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn incoming_links(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT from_id, to_id FROM links WHERE to_id = ?1 ORDER BY from_id")?;

        let links = stmt
            .query_map(params![page_id], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn insert_open_link(
        &mut self,
        title: &str,
        added_at: i64,
        from_id: Option<i64>,
    ) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO open_links (title, added_at, from_id) VALUES (?1, ?2, ?3)",
            params![title, added_at, from_id],
        )?;
        Ok(inserted > 0)
    }

    fn reschedule_open_link(&mut self, title: &str, added_at: i64) -> StorageResult<usize> {
        let updated = self.conn.execute(
            "UPDATE open_links SET added_at = ?1 WHERE title = ?2",
            params![added_at, title],
        )?;
        Ok(updated)
    }

    fn open_link_referrers(&self, titles: &[&str]) -> StorageResult<Vec<Option<i64>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT from_id FROM open_links WHERE title = ?1 ORDER BY from_id")?;

        let mut referrers = Vec::new();
        let mut seen_titles: Vec<&str> = Vec::new();
        for &title in titles {
            if seen_titles.contains(&title) {
                continue;
            }
            seen_titles.push(title);

            let rows = stmt.query_map(params![title], |row| row.get::<_, Option<i64>>(0))?;
            for row in rows {
                referrers.push(row?);
            }
        }

        Ok(referrers)
    }

    fn delete_open_links(&mut self, titles: &[&str]) -> StorageResult<usize> {
        let mut deleted = 0;
        for title in titles {
            deleted += self
                .conn
                .execute("DELETE FROM open_links WHERE title = ?1", params![title])?;
        }
        Ok(deleted)
    }

    fn oldest_open_links(&self, now: i64, limit: u32) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT title FROM open_links WHERE added_at <= ?1
             GROUP BY title ORDER BY MIN(added_at) ASC, title ASC LIMIT ?2",
        )?;

        let titles = stmt
            .query_map(params![now, limit], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(titles)
    }

    fn open_links_for(&self, title: &str) -> StorageResult<Vec<OpenLinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, added_at, from_id FROM open_links WHERE title = ?1 ORDER BY from_id",
        )?;

        let links = stmt
            .query_map(params![title], |row| {
                Ok(OpenLinkRecord {
                    title: row.get(0)?,
                    added_at: row.get(1)?,
                    from_id: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Inverted Index =====

    fn word_id(&mut self, text: &str) -> StorageResult<i64> {
        // A concurrent writer may insert the same word first; the IGNORE
        // makes that a no-op and the SELECT sees whichever row won.
        self.conn.execute(
            "INSERT OR IGNORE INTO words (text) VALUES (?1)",
            params![text],
        )?;
        let id = self
            .conn
            .query_row("SELECT id FROM words WHERE text = ?1", params![text], |row| {
                row.get(0)
            })?;
        Ok(id)
    }

    fn find_word_id(&self, text: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM words WHERE text = ?1", params![text], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    fn insert_mention(&mut self, word_id: i64, page_id: i64) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO mentions (word_id, page_id) VALUES (?1, ?2)",
            params![word_id, page_id],
        )?;
        Ok(inserted > 0)
    }

    fn words_for_page(&self, page_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.text FROM mentions m JOIN words w ON w.id = m.word_id
             WHERE m.page_id = ?1 ORDER BY w.text",
        )?;

        let words = stmt
            .query_map(params![page_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(words)
    }

    // ===== Statistics =====

    fn count_pages_by_state(&self, state: PageState) -> StorageResult<u64> {
        match state {
            PageState::Open => self.count("SELECT COUNT(DISTINCT title) FROM open_links"),
            PageState::Crawled => self.count(
                "SELECT COUNT(*) FROM pages WHERE raw_text IS NOT NULL AND compressed_text IS NULL",
            ),
            PageState::Indexed => {
                self.count("SELECT COUNT(*) FROM pages WHERE compressed_text IS NOT NULL")
            }
        }
    }

    fn count_open_links(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM open_links")
    }

    fn count_links(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM links")
    }

    fn count_words(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM words")
    }

    fn count_mentions(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM mentions")
    }
}
