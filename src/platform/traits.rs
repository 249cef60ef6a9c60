//! Platform client trait and error types
//!
//! The crawler never talks to a platform directly. Everything it needs from
//! one (message batches, comment threads, counters and media files) goes
//! through [`PlatformClient`]. Session handling is the client's concern.

use crate::model::Comment;
use crate::platform::{ChannelBatch, Message, RemoteFile};
use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors a platform client can report
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Not connected: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed platform data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Runs a platform call under a time limit
///
/// An elapsed limit becomes [`PlatformError::Timeout`] naming the operation.
pub async fn with_timeout<T, F>(operation: &'static str, limit: Duration, call: F) -> PlatformResult<T>
where
    F: Future<Output = PlatformResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PlatformError::Timeout {
            operation,
            secs: limit.as_secs(),
        }),
    }
}

/// Source platform collaborator
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Name stamped on every post ("Telegram", ...)
    fn platform_name(&self) -> &str;

    /// Establishes the platform session
    async fn connect(&self) -> PlatformResult<()>;

    /// Tears the platform session down
    async fn disconnect(&self) -> PlatformResult<()>;

    /// Fetches the message batch, context and counters for one identifier
    async fn fetch_messages(&self, identifier: &str) -> PlatformResult<ChannelBatch>;

    /// Fetches the reply thread of a message
    async fn fetch_comments(&self, chat_id: i64, message_id: i64) -> PlatformResult<Vec<Comment>>;

    /// Fetches the current view count of a message
    async fn fetch_view_count(&self, message: &Message) -> PlatformResult<i64>;

    /// Fetches how often a message was shared
    async fn fetch_share_count(&self, chat_id: i64, message_id: i64) -> PlatformResult<i64>;

    /// Resolves a remote file id to downloadable file metadata
    async fn fetch_remote_file(&self, remote_id: &str) -> PlatformResult<RemoteFile>;

    /// Downloads a file and returns the local path of the copy
    async fn download_file(&self, file_id: i64) -> PlatformResult<PathBuf>;
}
