//! Blob sink backed by a local directory tree
//!
//! Files land under `<root>/<crawl_id>/<channel>/<link-key>/<file>` and the
//! reference handed back is the key relative to the root, so records never
//! carry machine-specific paths.

use crate::blob::traits::{BlobError, BlobResult, BlobSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Moves media into a directory tree
#[derive(Debug, Clone)]
pub struct FilesystemBlobSink {
    root: PathBuf,
}

impl FilesystemBlobSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a blob reference back to its location under the root
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

/// Reduces a permalink or channel identifier to a single path component
///
/// Anything outside `[A-Za-z0-9_]` becomes an underscore, so
/// `https://t.me/chan/42` maps to `https___t_me_chan_42`.
pub fn link_key(source_link: &str) -> String {
    source_link
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn checked_component(value: &str) -> BlobResult<&str> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(BlobError::InvalidKey(value.to_string()));
    }
    Ok(value)
}

#[async_trait]
impl BlobSink for FilesystemBlobSink {
    async fn upload_and_delete(
        &self,
        crawl_id: &str,
        channel: &str,
        source_link: &str,
        local_path: &Path,
    ) -> BlobResult<String> {
        if !tokio::fs::try_exists(local_path).await? {
            return Err(BlobError::MissingSource(local_path.to_path_buf()));
        }

        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| BlobError::InvalidKey(local_path.display().to_string()))?;

        let key = format!(
            "{}/{}/{}/{}",
            checked_component(crawl_id)?,
            checked_component(&link_key(channel))?,
            link_key(source_link),
            checked_component(&file_name)?
        );
        let target = self.root.join(&key);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Rename fails across filesystems
        if tokio::fs::rename(local_path, &target).await.is_err() {
            tokio::fs::copy(local_path, &target).await?;
            tokio::fs::remove_file(local_path).await?;
        }

        tracing::debug!(key = %key, "Stored blob");
        Ok(key)
    }
}
