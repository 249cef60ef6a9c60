//! Channel-Harvest: a resumable, layered channel crawler
//!
//! This crate crawls channels on a source platform breadth-first by discovery
//! depth, extracts every message into a normalized post record, offloads media
//! to durable blob storage, and checkpoints the frontier after every page so a
//! crawl can resume after a crash instead of restarting.

pub mod blob;
pub mod config;
pub mod crawler;
pub mod extractor;
pub mod model;
pub mod output;
pub mod platform;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Channel-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Platform error: {0}")]
    Platform(#[from] platform::PlatformError),

    #[error("Blob storage error: {0}")]
    Blob(#[from] blob::BlobError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extractor::ExtractError),

    #[error("Visit of {url} panicked: {message}")]
    VisitPanicked { url: String, message: String },

    #[error("Platform bootstrap timed out after {0}s")]
    BootstrapTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No seeds provided. Use --urls or --url-file to specify channels to crawl")]
    NoSeeds,
}

/// Result type alias for Channel-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{generate_crawl_id, ChannelVisitor, CrawlReport, Crawler, PageVisitor};
pub use extractor::{ContentExtractor, Extraction};
pub use model::{Comment, ContentKind, Post};
pub use state::{Frontier, Layer, Page, PageStatus};
