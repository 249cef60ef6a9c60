//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawls
CREATE TABLE IF NOT EXISTS crawls (
    crawl_id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawls_started ON crawls(started_at);

-- Layered frontier, one row per page
CREATE TABLE IF NOT EXISTS frontier_pages (
    crawl_id TEXT NOT NULL REFERENCES crawls(crawl_id),
    url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    position INTEGER NOT NULL,
    status TEXT NOT NULL,
    attempted_at TEXT,
    PRIMARY KEY (crawl_id, url)
);

CREATE INDEX IF NOT EXISTS idx_frontier_depth ON frontier_pages(crawl_id, depth, position);
CREATE INDEX IF NOT EXISTS idx_frontier_status ON frontier_pages(crawl_id, status);

-- Every identifier ever placed into a layer
CREATE TABLE IF NOT EXISTS seen_identifiers (
    crawl_id TEXT NOT NULL REFERENCES crawls(crawl_id),
    url TEXT NOT NULL,
    PRIMARY KEY (crawl_id, url)
);

-- Extracted posts, stored as JSON documents
CREATE TABLE IF NOT EXISTS posts (
    crawl_id TEXT NOT NULL REFERENCES crawls(crawl_id),
    post_uid TEXT NOT NULL,
    channel_name TEXT NOT NULL,
    published_at TEXT NOT NULL,
    payload TEXT NOT NULL,
    stored_at TEXT NOT NULL,
    PRIMARY KEY (crawl_id, post_uid)
);

CREATE INDEX IF NOT EXISTS idx_posts_channel ON posts(crawl_id, channel_name);
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
    conn.execute_batch(SCHEMA_SQL)
}
