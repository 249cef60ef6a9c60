//! Page visitors
//!
//! A visitor performs the unit of work for one frontier page and reports the
//! identifiers it discovered. [`ChannelVisitor`] is the production visitor:
//! it fetches a channel's messages, extracts each one and follows linked and
//! forwarded-from channels.

use crate::extractor::{ContentExtractor, Extraction};
use crate::platform::with_timeout;
use crate::state::Page;
use crate::HarvestError;
use async_trait::async_trait;

/// The unit of work performed for one frontier page
#[async_trait]
pub trait PageVisitor: Send + Sync {
    /// Visits a page and returns the identifiers discovered on it
    async fn visit(&self, page: &Page) -> Result<Vec<String>, HarvestError>;
}

/// Visits channels through a content extractor
pub struct ChannelVisitor {
    crawl_id: String,
    extractor: ContentExtractor,
}

impl ChannelVisitor {
    pub fn new(crawl_id: impl Into<String>, extractor: ContentExtractor) -> Self {
        Self {
            crawl_id: crawl_id.into(),
            extractor,
        }
    }
}

#[async_trait]
impl PageVisitor for ChannelVisitor {
    /// Fetches and extracts every message of a channel
    ///
    /// All messages are attempted. Records from healthy messages are stored
    /// even when another message fails; the first failure is returned so the
    /// page is retried on the next run.
    async fn visit(&self, page: &Page) -> Result<Vec<String>, HarvestError> {
        let channel = page.url.as_str();
        let client = self.extractor.client();
        let batch = with_timeout(
            "fetch_messages",
            self.extractor.config().call_timeout,
            client.fetch_messages(channel),
        )
        .await?;

        let mut outlinks = batch.linked_channels.clone();
        let mut extracted = 0usize;
        let mut filtered = 0usize;
        let mut first_error = None;

        for message in &batch.messages {
            if let Some(source) = &message.forwarded_from {
                outlinks.push(source.clone());
            }

            match self
                .extractor
                .extract(&self.crawl_id, channel, message, &batch.context, &batch.stats)
                .await
            {
                Ok(Extraction::Extracted(_)) => extracted += 1,
                Ok(Extraction::Filtered(reason)) => {
                    tracing::debug!(channel, message_id = message.id, %reason, "Message filtered");
                    filtered += 1;
                }
                Err(e) => {
                    tracing::warn!(channel, message_id = message.id, error = %e, "Message extraction failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        tracing::info!(
            channel,
            messages = batch.messages.len(),
            extracted,
            filtered,
            outlinks = outlinks.len(),
            "Visited channel"
        );

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(outlinks),
        }
    }
}
