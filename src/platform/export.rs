//! Platform client backed by a directory of channel exports
//!
//! Each crawl identifier maps to `<export-root>/<identifier>.json`. Media
//! referenced by an export is resolved through its `files` table (remote id
//! to a path relative to the export root) and copied into the download
//! directory on download, so uploads that delete the local copy never touch
//! the export itself.
//!
//! Only the most recently fetched export is held in memory. Visits are
//! sequential, so comment, counter and file lookups always target it.

use crate::model::Comment;
use crate::platform::traits::{PlatformClient, PlatformError, PlatformResult};
use crate::platform::{ChannelBatch, ChannelStats, ConversationContext, Message, RemoteFile};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// On-disk shape of one channel export
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelExport {
    pub context: ConversationContext,
    #[serde(default)]
    pub stats: ChannelStats,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub linked_channels: Vec<String>,

    /// Message id -> reply thread
    #[serde(default)]
    pub comments: HashMap<i64, Vec<Comment>>,

    /// Remote file id -> path relative to the export root
    #[serde(default)]
    pub files: HashMap<String, String>,
}

impl ChannelExport {
    fn batch(&self) -> ChannelBatch {
        ChannelBatch {
            context: self.context.clone(),
            stats: self.stats.clone(),
            messages: self.messages.clone(),
            linked_channels: self.linked_channels.clone(),
        }
    }
}

/// Reads channels from JSON exports
pub struct ExportClient {
    platform_name: String,
    export_root: PathBuf,
    download_dir: PathBuf,
    connected: AtomicBool,
    current: Mutex<Option<Arc<ChannelExport>>>,

    /// Resolved but not yet downloaded files
    files: Mutex<HashMap<i64, PathBuf>>,
    next_file_id: AtomicI64,
}

impl ExportClient {
    /// Creates a client over `export_root`, downloading into `download_dir`
    pub fn new(
        platform_name: impl Into<String>,
        export_root: impl Into<PathBuf>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform_name: platform_name.into(),
            export_root: export_root.into(),
            download_dir: download_dir.into(),
            connected: AtomicBool::new(false),
            current: Mutex::new(None),
            files: Mutex::new(HashMap::new()),
            next_file_id: AtomicI64::new(0),
        }
    }

    fn ensure_connected(&self) -> PlatformResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(PlatformError::Connection(
                "export client is not connected".to_string(),
            ))
        }
    }

    fn export_path(&self, identifier: &str) -> PlatformResult<PathBuf> {
        if identifier.is_empty()
            || identifier.contains(['/', '\\'])
            || identifier.starts_with('.')
        {
            return Err(PlatformError::NotFound(format!(
                "invalid channel identifier '{}'",
                identifier
            )));
        }
        Ok(self.export_root.join(format!("{}.json", identifier)))
    }

    fn current_export(&self) -> PlatformResult<Option<Arc<ChannelExport>>> {
        let current = self
            .current
            .lock()
            .map_err(|e| PlatformError::Request(format!("export slot poisoned: {}", e)))?;
        Ok(current.clone())
    }

    fn find_export_for_chat(&self, chat_id: i64) -> PlatformResult<Arc<ChannelExport>> {
        self.current_export()?
            .filter(|export| export.context.chat_id == chat_id)
            .ok_or_else(|| PlatformError::NotFound(format!("chat {}", chat_id)))
    }

    async fn load_export(&self, identifier: &str) -> PlatformResult<Arc<ChannelExport>> {
        let path = self.export_path(identifier)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PlatformError::NotFound(format!("channel '{}'", identifier)));
            }
            Err(e) => return Err(e.into()),
        };

        let export: Arc<ChannelExport> = Arc::new(serde_json::from_str(&content)?);
        let mut current = self
            .current
            .lock()
            .map_err(|e| PlatformError::Request(format!("export slot poisoned: {}", e)))?;
        *current = Some(Arc::clone(&export));
        Ok(export)
    }

    /// Removes leftover downloads, typically copies whose upload failed
    ///
    /// # Returns
    ///
    /// The number of files removed
    async fn clear_download_dir(&self) -> PlatformResult<usize> {
        let mut entries = match tokio::fs::read_dir(&self.download_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl PlatformClient for ExportClient {
    fn platform_name(&self) -> &str {
        &self.platform_name
    }

    async fn connect(&self) -> PlatformResult<()> {
        let metadata = tokio::fs::metadata(&self.export_root).await.map_err(|e| {
            PlatformError::Connection(format!(
                "export root {} unavailable: {}",
                self.export_root.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(PlatformError::Connection(format!(
                "export root {} is not a directory",
                self.export_root.display()
            )));
        }

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let stale = self.clear_download_dir().await?;
        if stale > 0 {
            tracing::info!(
                dir = %self.download_dir.display(),
                removed = stale,
                "Removed leftover downloads"
            );
        }

        self.connected.store(true, Ordering::Release);
        tracing::debug!(root = %self.export_root.display(), "Export client connected");
        Ok(())
    }

    async fn disconnect(&self) -> PlatformResult<()> {
        self.connected.store(false, Ordering::Release);
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
        if let Ok(mut files) = self.files.lock() {
            files.clear();
        }

        let removed = self.clear_download_dir().await?;
        tracing::debug!(removed, "Export client disconnected");
        Ok(())
    }

    async fn fetch_messages(&self, identifier: &str) -> PlatformResult<ChannelBatch> {
        self.ensure_connected()?;
        let export = self.load_export(identifier).await?;
        Ok(export.batch())
    }

    async fn fetch_comments(&self, chat_id: i64, message_id: i64) -> PlatformResult<Vec<Comment>> {
        self.ensure_connected()?;
        let export = self.find_export_for_chat(chat_id)?;
        Ok(export
            .comments
            .get(&message_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_view_count(&self, message: &Message) -> PlatformResult<i64> {
        self.ensure_connected()?;
        Ok(message
            .interaction
            .as_ref()
            .map(|info| info.view_count)
            .unwrap_or(0))
    }

    async fn fetch_share_count(&self, chat_id: i64, message_id: i64) -> PlatformResult<i64> {
        self.ensure_connected()?;
        let export = self.find_export_for_chat(chat_id)?;
        let message = export
            .messages
            .iter()
            .find(|message| message.id == message_id)
            .ok_or_else(|| PlatformError::NotFound(format!("message {}", message_id)))?;
        Ok(message
            .interaction
            .as_ref()
            .map(|info| info.forward_count)
            .unwrap_or(0))
    }

    async fn fetch_remote_file(&self, remote_id: &str) -> PlatformResult<RemoteFile> {
        self.ensure_connected()?;
        let relative = self
            .current_export()?
            .and_then(|export| export.files.get(remote_id).cloned())
            .ok_or_else(|| PlatformError::NotFound(format!("remote file '{}'", remote_id)))?;

        let id = self.next_file_id.fetch_add(1, Ordering::Relaxed);
        let mut files = self
            .files
            .lock()
            .map_err(|e| PlatformError::Request(format!("file table poisoned: {}", e)))?;
        files.insert(id, self.export_root.join(relative));

        Ok(RemoteFile {
            id,
            remote_id: remote_id.to_string(),
        })
    }

    async fn download_file(&self, file_id: i64) -> PlatformResult<PathBuf> {
        self.ensure_connected()?;
        // A resolved file is downloaded at most once
        let source = self
            .files
            .lock()
            .map_err(|e| PlatformError::Request(format!("file table poisoned: {}", e)))?
            .remove(&file_id)
            .ok_or_else(|| PlatformError::NotFound(format!("file id {}", file_id)))?;

        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let target = self.download_dir.join(format!("{}-{}", file_id, file_name));

        tokio::fs::copy(&source, &target).await?;
        tracing::debug!(path = %target.display(), "Downloaded file");
        Ok(target)
    }
}

/// Writes an export document to `<root>/<identifier>.json`
///
/// Used to prepare fixtures and hand-built exports.
pub fn write_export(root: &Path, identifier: &str, export: &serde_json::Value) -> std::io::Result<()> {
    let content = serde_json::to_string_pretty(export)?;
    std::fs::write(root.join(format!("{}.json", identifier)), content)
}
