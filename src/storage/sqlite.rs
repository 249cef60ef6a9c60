//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore
//! trait.

use crate::model::Post;
use crate::state::{Frontier, Layer, Page, PageStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use crate::storage::{CrawlRecord, CrawlStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a store at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn has_frontier(&self, crawl_id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM frontier_pages WHERE crawl_id = ?1 LIMIT 1",
                params![crawl_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn load_frontier(&self, crawl_id: &str) -> StorageResult<Frontier> {
        let mut stmt = self.conn.prepare(
            "SELECT url, depth, status, attempted_at FROM frontier_pages
             WHERE crawl_id = ?1 ORDER BY depth, position",
        )?;
        let rows = stmt.query_map(params![crawl_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut layers: Vec<Layer> = Vec::new();
        for row in rows {
            let (url, depth, status, attempted_at) = row?;
            let status = PageStatus::from_db_string(&status)
                .ok_or_else(|| StorageError::Corrupt(format!("page status '{}'", status)))?;
            let timestamp = attempted_at.as_deref().map(parse_timestamp).transpose()?;

            if layers.last().map(|layer| layer.depth) != Some(depth) {
                layers.push(Layer::new(depth));
            }
            if let Some(layer) = layers.last_mut() {
                layer.pages.push(Page {
                    url,
                    status,
                    timestamp,
                });
            }
        }

        let mut stmt = self
            .conn
            .prepare("SELECT url FROM seen_identifiers WHERE crawl_id = ?1")?;
        let seen = stmt
            .query_map(params![crawl_id], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Frontier::from_parts(layers, seen))
    }

    fn count(&self, sql: &str, crawl_id: &str) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row(sql, params![crawl_id], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("timestamp '{}': {}", value, e)))
}

fn crawl_from_row(row: &Row<'_>) -> rusqlite::Result<(CrawlRecord, String)> {
    let status: String = row.get(4)?;
    Ok((
        CrawlRecord {
            crawl_id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            config_hash: row.get(3)?,
            status: CrawlStatus::Running,
        },
        status,
    ))
}

fn with_status((mut record, status): (CrawlRecord, String)) -> StorageResult<CrawlRecord> {
    record.status = CrawlStatus::from_db_string(&status)
        .ok_or_else(|| StorageError::Corrupt(format!("crawl status '{}'", status)))?;
    Ok(record)
}

impl FrontierStore for SqliteStore {
    // ===== Crawl Management =====

    fn begin_crawl(&mut self, crawl_id: &str, config_hash: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawls (crawl_id, started_at, config_hash, status)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(crawl_id) DO UPDATE SET status = excluded.status, finished_at = NULL",
            params![crawl_id, now, config_hash, CrawlStatus::Running.to_db_string()],
        )?;
        Ok(())
    }

    fn get_crawl(&self, crawl_id: &str) -> StorageResult<CrawlRecord> {
        let row = self
            .conn
            .query_row(
                "SELECT crawl_id, started_at, finished_at, config_hash, status
                 FROM crawls WHERE crawl_id = ?1",
                params![crawl_id],
                crawl_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::CrawlNotFound(crawl_id.to_string()))?;
        with_status(row)
    }

    fn latest_crawl(&self) -> StorageResult<Option<CrawlRecord>> {
        self.conn
            .query_row(
                "SELECT crawl_id, started_at, finished_at, config_hash, status
                 FROM crawls ORDER BY crawl_id DESC LIMIT 1",
                [],
                crawl_from_row,
            )
            .optional()?
            .map(with_status)
            .transpose()
    }

    fn latest_unfinished_crawl(&self) -> StorageResult<Option<CrawlRecord>> {
        self.conn
            .query_row(
                "SELECT crawl_id, started_at, finished_at, config_hash, status
                 FROM crawls WHERE status != ?1 ORDER BY crawl_id DESC LIMIT 1",
                params![CrawlStatus::Completed.to_db_string()],
                crawl_from_row,
            )
            .optional()?
            .map(with_status)
            .transpose()
    }

    fn finish_crawl(&mut self, crawl_id: &str, status: CrawlStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE crawls SET status = ?1, finished_at = ?2 WHERE crawl_id = ?3",
            params![status.to_db_string(), now, crawl_id],
        )?;
        if updated == 0 {
            return Err(StorageError::CrawlNotFound(crawl_id.to_string()));
        }
        Ok(())
    }

    // ===== Frontier =====

    fn load_or_seed(&mut self, crawl_id: &str, seeds: &[String]) -> StorageResult<Frontier> {
        self.get_crawl(crawl_id)?;

        if self.has_frontier(crawl_id)? {
            let frontier = self.load_frontier(crawl_id)?;
            tracing::info!(
                crawl_id,
                layers = frontier.layers().len(),
                pending = frontier.pending_count(),
                "Resuming persisted frontier"
            );
            return Ok(frontier);
        }

        let frontier = Frontier::seeded(seeds.iter().cloned());
        self.save_layers(crawl_id, &frontier)?;
        tracing::info!(crawl_id, seeds = frontier.page_count(), "Seeded layer 0");
        Ok(frontier)
    }

    fn save_layers(&mut self, crawl_id: &str, frontier: &Frontier) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM frontier_pages WHERE crawl_id = ?1",
            params![crawl_id],
        )?;

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO frontier_pages (crawl_id, url, depth, position, status, attempted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for layer in frontier.checkpoint_layers() {
                for (position, page) in layer.pages.iter().enumerate() {
                    insert_page.execute(params![
                        crawl_id,
                        page.url,
                        layer.depth,
                        position as i64,
                        page.status.to_db_string(),
                        page.timestamp.map(|ts| ts.to_rfc3339()),
                    ])?;
                }
            }

            let mut insert_seen = tx.prepare(
                "INSERT OR IGNORE INTO seen_identifiers (crawl_id, url) VALUES (?1, ?2)",
            )?;
            for url in frontier.seen() {
                insert_seen.execute(params![crawl_id, url])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    // ===== Records =====

    fn store_record(&mut self, crawl_id: &str, channel: &str, post: &Post) -> StorageResult<()> {
        let payload = serde_json::to_string(post)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO posts
             (crawl_id, post_uid, channel_name, published_at, payload, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                crawl_id,
                post.post_uid,
                channel,
                post.published_at.to_rfc3339(),
                payload,
                now
            ],
        )?;
        Ok(())
    }

    fn get_record(&self, crawl_id: &str, post_uid: &str) -> StorageResult<Option<Post>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM posts WHERE crawl_id = ?1 AND post_uid = ?2",
                params![crawl_id, post_uid],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|payload| serde_json::from_str(&payload).map_err(StorageError::from))
            .transpose()
    }

    fn load_records(&self, crawl_id: &str) -> StorageResult<Vec<Post>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM posts WHERE crawl_id = ?1 ORDER BY post_uid")?;
        let payloads = stmt
            .query_map(params![crawl_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(StorageError::from))
            .collect()
    }

    // ===== Statistics =====

    fn count_pages_by_status(&self, crawl_id: &str, status: PageStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frontier_pages WHERE crawl_id = ?1 AND status = ?2",
            params![crawl_id, status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_layers(&self, crawl_id: &str) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(DISTINCT depth) FROM frontier_pages WHERE crawl_id = ?1",
            crawl_id,
        )
    }

    fn count_seen(&self, crawl_id: &str) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM seen_identifiers WHERE crawl_id = ?1",
            crawl_id,
        )
    }

    fn count_records(&self, crawl_id: &str) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM posts WHERE crawl_id = ?1", crawl_id)
    }

    fn get_depth_breakdown(&self, crawl_id: &str) -> StorageResult<HashMap<u32, usize>> {
        let mut stmt = self.conn.prepare(
            "SELECT depth, COUNT(*) FROM frontier_pages
             WHERE crawl_id = ?1 GROUP BY depth ORDER BY depth",
        )?;
        let rows = stmt.query_map(params![crawl_id], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut breakdown = HashMap::new();
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count as usize);
        }
        Ok(breakdown)
    }

    fn get_channel_breakdown(&self, crawl_id: &str) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT channel_name, COUNT(*) FROM posts
             WHERE crawl_id = ?1 GROUP BY channel_name ORDER BY channel_name",
        )?;
        let rows = stmt.query_map(params![crawl_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut breakdown = Vec::new();
        for row in rows {
            let (channel, count) = row?;
            breakdown.push((channel, count as u64));
        }
        Ok(breakdown)
    }
}
