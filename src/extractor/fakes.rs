//! In-memory platform client and blob sink for unit tests

use crate::blob::{BlobError, BlobResult, BlobSink};
use crate::model::Comment;
use crate::platform::{
    ChannelBatch, Message, MessageContent, PlatformClient, PlatformError, PlatformResult,
    RemoteFile,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 2024-01-01T00:00:00Z
pub const JAN_2024: i64 = 1_704_067_200;

pub fn text_message(id: i64, permalink: &str, text: &str) -> Message {
    Message {
        id,
        chat_id: 100,
        date: JAN_2024,
        edit_date: 0,
        permalink: permalink.to_string(),
        content: MessageContent::Text {
            text: text.to_string(),
        },
        interaction: None,
        forwarded_from: None,
    }
}

#[derive(Default)]
pub struct FakeClient {
    pub batches: HashMap<String, ChannelBatch>,
    pub comments: Vec<Comment>,
    pub share_count: i64,
    pub download_dir: Option<PathBuf>,
    pub fail_comments: bool,
    pub panic_comments: bool,
    pub fail_counters: bool,
    pub fail_downloads: bool,
    pub panic_views: bool,
    pub comment_calls: AtomicUsize,
    pub remote_files: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn comment_calls(&self) -> usize {
        self.comment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformClient for FakeClient {
    fn platform_name(&self) -> &str {
        "Telegram"
    }

    async fn connect(&self) -> PlatformResult<()> {
        Ok(())
    }

    async fn disconnect(&self) -> PlatformResult<()> {
        Ok(())
    }

    async fn fetch_messages(&self, identifier: &str) -> PlatformResult<ChannelBatch> {
        self.batches
            .get(identifier)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(identifier.to_string()))
    }

    async fn fetch_comments(&self, _chat_id: i64, _message_id: i64) -> PlatformResult<Vec<Comment>> {
        self.comment_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_comments {
            panic!("comment thread exploded");
        }
        if self.fail_comments {
            return Err(PlatformError::Request("comments unavailable".to_string()));
        }
        Ok(self.comments.clone())
    }

    async fn fetch_view_count(&self, message: &Message) -> PlatformResult<i64> {
        if self.panic_views {
            panic!("view counter exploded");
        }
        if self.fail_counters {
            return Err(PlatformError::Request("views unavailable".to_string()));
        }
        Ok(message
            .interaction
            .as_ref()
            .map(|info| info.view_count)
            .unwrap_or(0))
    }

    async fn fetch_share_count(&self, _chat_id: i64, _message_id: i64) -> PlatformResult<i64> {
        if self.fail_counters {
            return Err(PlatformError::Request("shares unavailable".to_string()));
        }
        Ok(self.share_count)
    }

    async fn fetch_remote_file(&self, remote_id: &str) -> PlatformResult<RemoteFile> {
        let mut files = self.remote_files.lock().unwrap();
        files.push(remote_id.to_string());
        Ok(RemoteFile {
            id: (files.len() - 1) as i64,
            remote_id: remote_id.to_string(),
        })
    }

    async fn download_file(&self, file_id: i64) -> PlatformResult<PathBuf> {
        if self.fail_downloads {
            return Err(PlatformError::Request("download failed".to_string()));
        }
        let dir = self
            .download_dir
            .as_ref()
            .ok_or_else(|| PlatformError::NotFound("no download dir".to_string()))?;
        let remote_id = self.remote_files.lock().unwrap()[file_id as usize].clone();
        let path = dir.join(format!("{}.bin", remote_id));
        std::fs::write(&path, remote_id.as_bytes())?;
        Ok(path)
    }
}

/// One call to [`RecordingSink::upload_and_delete`]
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub crawl_id: String,
    pub channel: String,
    pub source_link: String,
    pub local_path: PathBuf,
}

#[derive(Default)]
pub struct RecordingSink {
    pub fail: bool,
    pub uploads: Mutex<Vec<Upload>>,
}

impl RecordingSink {
    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobSink for RecordingSink {
    async fn upload_and_delete(
        &self,
        crawl_id: &str,
        channel: &str,
        source_link: &str,
        local_path: &Path,
    ) -> BlobResult<String> {
        if self.fail {
            return Err(BlobError::MissingSource(local_path.to_path_buf()));
        }
        std::fs::remove_file(local_path)?;

        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.uploads.lock().unwrap().push(Upload {
            crawl_id: crawl_id.to_string(),
            channel: channel.to_string(),
            source_link: source_link.to_string(),
            local_path: local_path.to_path_buf(),
        });
        Ok(format!("blob:{}/{}/{}", crawl_id, channel, file_name))
    }
}
