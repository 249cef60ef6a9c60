//! Media offload
//!
//! Resolves a remote file, downloads it and hands the local copy to the blob
//! sink. Every step is allowed to fail; a failure leaves the media reference
//! empty and is logged.

use crate::blob::BlobSink;
use crate::platform::{with_timeout, PlatformClient};
use std::time::Duration;

/// Moves one message's media from the platform into the blob sink
pub struct MediaOffload<'a> {
    pub client: &'a dyn PlatformClient,
    pub sink: &'a dyn BlobSink,
    pub call_timeout: Duration,
    pub crawl_id: &'a str,
    pub channel: &'a str,
    pub source_link: &'a str,
}

impl MediaOffload<'_> {
    /// Offloads a thumbnail and a media body concurrently
    ///
    /// # Returns
    ///
    /// Blob references for the thumbnail and the body, in that order
    pub async fn offload_pair(
        &self,
        thumbnail: Option<&str>,
        media: Option<&str>,
    ) -> (Option<String>, Option<String>) {
        tokio::join!(self.offload(thumbnail), self.offload(media))
    }

    /// Offloads one remote file, returning its blob reference
    pub async fn offload(&self, remote_id: Option<&str>) -> Option<String> {
        let remote_id = remote_id.filter(|id| !id.is_empty())?;

        let remote = match with_timeout(
            "fetch_remote_file",
            self.call_timeout,
            self.client.fetch_remote_file(remote_id),
        )
        .await
        {
            Ok(remote) => remote,
            Err(e) => {
                tracing::warn!(remote_id, error = %e, "Error fetching remote file");
                return None;
            }
        };

        let local_path = match with_timeout(
            "download_file",
            self.call_timeout,
            self.client.download_file(remote.id),
        )
        .await
        {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(file_id = remote.id, error = %e, "Error downloading file");
                return None;
            }
        };

        match self
            .sink
            .upload_and_delete(self.crawl_id, self.channel, self.source_link, &local_path)
            .await
        {
            Ok(reference) => Some(reference),
            Err(e) => {
                tracing::error!(
                    path = %local_path.display(),
                    error = %e,
                    "Blob upload failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::fakes::{FakeClient, RecordingSink};
    use tempfile::TempDir;

    fn offload<'a>(client: &'a FakeClient, sink: &'a RecordingSink) -> MediaOffload<'a> {
        MediaOffload {
            client,
            sink,
            call_timeout: Duration::from_secs(5),
            crawl_id: "20240101000000",
            channel: "chan",
            source_link: "https://t.me/chan/7",
        }
    }

    #[tokio::test]
    async fn test_offload_pair_uploads_both_files() {
        let downloads = TempDir::new().unwrap();
        let client = FakeClient {
            download_dir: Some(downloads.path().to_path_buf()),
            ..FakeClient::default()
        };
        let sink = RecordingSink::default();

        let (thumb, body) = offload(&client, &sink)
            .offload_pair(Some("thumb-1"), Some("body-1"))
            .await;

        assert_eq!(thumb.as_deref(), Some("blob:20240101000000/chan/thumb-1.bin"));
        assert_eq!(body.as_deref(), Some("blob:20240101000000/chan/body-1.bin"));

        let uploads = sink.uploads();
        assert_eq!(uploads.len(), 2);
        assert!(uploads.iter().all(|u| u.source_link == "https://t.me/chan/7"));
        assert!(uploads.iter().all(|u| !u.local_path.exists()));
    }

    #[tokio::test]
    async fn test_missing_or_empty_id_skips_platform() {
        let client = FakeClient::default();
        let sink = RecordingSink::default();
        let media = offload(&client, &sink);

        assert_eq!(media.offload(None).await, None);
        assert_eq!(media.offload(Some("")).await, None);
        assert!(client.remote_files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_leaves_reference_empty() {
        let client = FakeClient {
            fail_downloads: true,
            ..FakeClient::default()
        };
        let sink = RecordingSink::default();

        assert_eq!(offload(&client, &sink).offload(Some("thumb-1")).await, None);
        assert!(sink.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_reference_empty() {
        let downloads = TempDir::new().unwrap();
        let client = FakeClient {
            download_dir: Some(downloads.path().to_path_buf()),
            ..FakeClient::default()
        };
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };

        assert_eq!(offload(&client, &sink).offload(Some("thumb-1")).await, None);
    }
}
