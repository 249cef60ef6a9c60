//! Storage traits and error types
//!
//! This module defines the trait interface for the frontier store and its
//! associated error types.

use crate::model::Post;
use crate::state::{Frontier, PageStatus};
use crate::storage::{CrawlRecord, CrawlStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned: {0}")]
    Lock(String),

    #[error("Crawl not found: {0}")]
    CrawlNotFound(String),

    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for crawls, their frontier and extracted records
///
/// Every operation is scoped by crawl id, so one store can hold many crawls.
pub trait FrontierStore {
    // ===== Crawl Management =====

    /// Registers a crawl as running
    ///
    /// Registering an existing crawl id again marks it running without
    /// touching its frontier, which is how a resumed crawl restarts.
    fn begin_crawl(&mut self, crawl_id: &str, config_hash: &str) -> StorageResult<()>;

    /// Gets a crawl by id
    fn get_crawl(&self, crawl_id: &str) -> StorageResult<CrawlRecord>;

    /// Gets the most recently started crawl
    fn latest_crawl(&self) -> StorageResult<Option<CrawlRecord>>;

    /// Gets the most recently started crawl that has not completed
    fn latest_unfinished_crawl(&self) -> StorageResult<Option<CrawlRecord>>;

    /// Marks a crawl finished with the given status
    fn finish_crawl(&mut self, crawl_id: &str, status: CrawlStatus) -> StorageResult<()>;

    // ===== Frontier =====

    /// Loads the persisted frontier, or seeds layer 0 if none exists
    ///
    /// # Arguments
    ///
    /// * `crawl_id` - The crawl to load
    /// * `seeds` - Identifiers for layer 0, ignored when a frontier exists
    ///
    /// # Returns
    ///
    /// The frontier the crawl should continue from
    fn load_or_seed(&mut self, crawl_id: &str, seeds: &[String]) -> StorageResult<Frontier>;

    /// Replaces the persisted frontier with the given one
    ///
    /// Staged pages are persisted with their target layer.
    fn save_layers(&mut self, crawl_id: &str, frontier: &Frontier) -> StorageResult<()>;

    // ===== Records =====

    /// Stores a post, replacing any earlier record with the same uid
    fn store_record(&mut self, crawl_id: &str, channel: &str, post: &Post) -> StorageResult<()>;

    /// Gets a stored post by uid
    fn get_record(&self, crawl_id: &str, post_uid: &str) -> StorageResult<Option<Post>>;

    /// Gets every post stored for a crawl, ordered by uid
    fn load_records(&self, crawl_id: &str) -> StorageResult<Vec<Post>>;

    // ===== Statistics =====

    /// Counts frontier pages with the given status
    fn count_pages_by_status(&self, crawl_id: &str, status: PageStatus) -> StorageResult<u64>;

    /// Counts persisted layers
    fn count_layers(&self, crawl_id: &str) -> StorageResult<u64>;

    /// Counts identifiers in the seen set
    fn count_seen(&self, crawl_id: &str) -> StorageResult<u64>;

    /// Counts stored posts
    fn count_records(&self, crawl_id: &str) -> StorageResult<u64>;

    /// Gets page count breakdown by depth
    fn get_depth_breakdown(&self, crawl_id: &str) -> StorageResult<HashMap<u32, usize>>;

    /// Gets stored post counts per channel, sorted by channel
    fn get_channel_breakdown(&self, crawl_id: &str) -> StorageResult<Vec<(String, u64)>>;
}
