//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Crawl tracking and resumption support
//! - Per-page frontier checkpoints
//! - Extracted post records

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{FrontierStore, StorageError, StorageResult};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A store shared between the orchestrator and the extractor
pub type SharedStore = Arc<Mutex<dyn FrontierStore + Send>>;

/// Opens a store database and wraps it for sharing
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_store(path: &Path) -> StorageResult<SharedStore> {
    Ok(share(SqliteStore::new(path)?))
}

/// Wraps a store for sharing
pub fn share<S: FrontierStore + Send + 'static>(store: S) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Locks a shared store, mapping poisoning to a storage error
pub fn lock_store(
    store: &SharedStore,
) -> StorageResult<MutexGuard<'_, dyn FrontierStore + Send + 'static>> {
    store
        .lock()
        .map_err(|e| StorageError::Lock(e.to_string()))
}

/// Represents one crawl
#[derive(Debug, Clone)]
pub struct CrawlRecord {
    pub crawl_id: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: CrawlStatus,
}

/// Status of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    Running,
    Completed,
    Interrupted,
}

impl CrawlStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}
