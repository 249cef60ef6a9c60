//! The content extractor
//!
//! Turns one platform message into at most one [`Post`]. Messages older than
//! the cutoff year and messages without a usable permalink are filtered, not
//! failed. Sub-steps (comments, media, counters) degrade on their own, so the
//! only failures are a malformed publish date and a panic somewhere inside.

use crate::blob::BlobSink;
use crate::config::CrawlerConfig;
use crate::extractor::content::extract_content;
use crate::extractor::engagement::{
    aggregate_reactions, fetch_comments, fetch_share_count, fetch_view_count,
};
use crate::extractor::media::MediaOffload;
use crate::extractor::{panic_message, ExtractError, Extraction, SkipReason};
use crate::model::{ChannelData, EngagementData, Post};
use crate::platform::{ChannelStats, ConversationContext, Message, PlatformClient};
use crate::storage::{lock_store, SharedStore};
use chrono::{DateTime, Datelike, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Extraction policy knobs
#[derive(Debug, Clone, Copy)]
pub struct ExtractorConfig {
    /// Messages published before this year are filtered
    pub cutoff_year: i32,

    /// Limit on every platform call
    pub call_timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            cutoff_year: 2018,
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&CrawlerConfig> for ExtractorConfig {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            cutoff_year: config.cutoff_year,
            call_timeout: Duration::from_secs(config.call_timeout_secs),
        }
    }
}

/// Maps platform messages onto post records
pub struct ContentExtractor {
    client: Arc<dyn PlatformClient>,
    sink: Arc<dyn BlobSink>,
    store: SharedStore,
    config: ExtractorConfig,
}

impl ContentExtractor {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        sink: Arc<dyn BlobSink>,
        store: SharedStore,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            client,
            sink,
            store,
            config,
        }
    }

    /// The platform client the extractor reads from
    pub fn client(&self) -> &Arc<dyn PlatformClient> {
        &self.client
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts and stores one message
    ///
    /// # Arguments
    ///
    /// * `crawl_id` - The crawl the record belongs to
    /// * `channel` - Crawl identifier of the channel being visited
    /// * `message` - The message to extract
    /// * `context` - The conversation the message was fetched from
    /// * `stats` - Channel-wide counters
    ///
    /// # Returns
    ///
    /// * `Ok(Extraction::Extracted)` - A record was built and handed to the store
    /// * `Ok(Extraction::Filtered)` - Nothing to extract from this message
    /// * `Err(ExtractError)` - The message could not be extracted
    pub async fn extract(
        &self,
        crawl_id: &str,
        channel: &str,
        message: &Message,
        context: &ConversationContext,
        stats: &ChannelStats,
    ) -> Result<Extraction, ExtractError> {
        let extraction = self.extract_message(crawl_id, channel, message, context, stats);
        match AssertUnwindSafe(extraction).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message_text = panic_message(&panic);
                tracing::error!(
                    channel,
                    message_id = message.id,
                    panic = %message_text,
                    "Recovered from panic while parsing message"
                );
                Err(ExtractError::Panicked(message_text))
            }
        }
    }

    async fn extract_message(
        &self,
        crawl_id: &str,
        channel: &str,
        message: &Message,
        context: &ConversationContext,
        stats: &ChannelStats,
    ) -> Result<Extraction, ExtractError> {
        let published_at = DateTime::<Utc>::from_timestamp(message.date, 0)
            .ok_or(ExtractError::InvalidTimestamp(message.date))?;
        if published_at.year() < self.config.cutoff_year {
            tracing::debug!(channel, message_id = message.id, "Message before cutoff year");
            return Ok(Extraction::Filtered(SkipReason::BeforeCutoff));
        }

        let Some(number) = message_number(&message.permalink) else {
            tracing::debug!(
                channel,
                permalink = %message.permalink,
                "Cannot determine message number"
            );
            return Ok(Extraction::Filtered(SkipReason::UnparseablePermalink));
        };

        let client = self.client.as_ref();
        let timeout = self.config.call_timeout;

        let comments = fetch_comments(client, timeout, message, channel).await;
        let parts = extract_content(&message.content);

        let offload = MediaOffload {
            client,
            sink: self.sink.as_ref(),
            call_timeout: timeout,
            crawl_id,
            channel,
            source_link: &message.permalink,
        };
        let (thumb_url, media_url) = offload
            .offload_pair(
                parts.thumbnail_remote.as_deref(),
                parts.media_remote.as_deref(),
            )
            .await;

        let reactions = message
            .interaction
            .as_ref()
            .map(|info| aggregate_reactions(&info.reactions))
            .unwrap_or_default();
        let view_count = fetch_view_count(client, timeout, message).await;
        let share_count = fetch_share_count(client, timeout, message).await;

        let edited_at = if message.edit_date > 0 {
            DateTime::<Utc>::from_timestamp(message.edit_date, 0)
        } else {
            None
        };

        let post = Post {
            post_uid: format!("{}-{}", number, channel),
            post_link: message.permalink.clone(),
            channel_id: message.chat_id,
            channel_name: context.title.clone(),
            published_at,
            edited_at,
            platform_name: client.platform_name().to_string(),
            post_type: message.content.kind(),
            description: parts.description,
            thumb_url,
            media_url,
            view_count,
            like_count: 0,
            share_count,
            comment_count: comments.len() as i64,
            channel_data: ChannelData {
                channel_id: message.chat_id,
                channel_name: context.title.clone(),
                channel_url_external: channel_url_external(channel),
                engagement: EngagementData {
                    follower_count: stats.member_count,
                    post_count: stats.post_count,
                    views_count: stats.view_count,
                },
            },
            comments,
            reactions,
        };

        let stored = lock_store(&self.store)
            .and_then(|mut store| store.store_record(crawl_id, channel, &post));
        if let Err(e) = stored {
            tracing::error!(crawl_id, post_uid = %post.post_uid, error = %e, "Store record error");
        }

        Ok(Extraction::Extracted(Box::new(post)))
    }
}

/// Public URL of a channel
pub fn channel_url_external(channel: &str) -> String {
    format!("https://t.me/c/{}", channel)
}

/// Message number: the last path segment of a permalink
///
/// Returns None when the permalink has no non-empty last segment.
pub fn message_number(permalink: &str) -> Option<String> {
    let segment = match Url::parse(permalink) {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => permalink
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };
    segment.filter(|segment| !segment.is_empty())
}
