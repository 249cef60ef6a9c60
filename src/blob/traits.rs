//! Blob sink trait and error types

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while offloading media
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Source file missing: {0}")]
    MissingSource(PathBuf),

    #[error("Invalid blob key component: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Durable media storage
///
/// Implementations take ownership of a local file: on success the local copy
/// is gone and the returned reference is the only handle to the content.
#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Uploads a local file and removes it
    ///
    /// # Arguments
    ///
    /// * `crawl_id` - The crawl the media was collected in
    /// * `channel` - Crawl identifier of the channel
    /// * `source_link` - Permalink of the message the media belongs to
    /// * `local_path` - Downloaded file to upload
    ///
    /// # Returns
    ///
    /// An opaque blob reference, never a local filesystem path
    async fn upload_and_delete(
        &self,
        crawl_id: &str,
        channel: &str,
        source_link: &str,
        local_path: &Path,
    ) -> BlobResult<String>;
}
