//! Engagement sub-steps: comments, reactions and counters
//!
//! None of these can fail an extraction. Platform errors, timeouts and
//! panics in the comment fetch all degrade to an empty or zero value.

use crate::extractor::panic_message;
use crate::model::Comment;
use crate::platform::{with_timeout, Message, PlatformClient, Reaction, ReactionType};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Sums reaction counts per emoji
///
/// Custom-emoji and paid reactions are not emoji and are skipped, as are
/// untyped buckets and negative counts.
pub fn aggregate_reactions(reactions: &[Reaction]) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for reaction in reactions {
        match &reaction.reaction {
            Some(ReactionType::Emoji { emoji }) if reaction.total_count >= 0 => {
                *totals.entry(emoji.clone()).or_insert(0) += reaction.total_count;
            }
            Some(ReactionType::Emoji { emoji }) => {
                tracing::debug!(emoji = %emoji, count = reaction.total_count, "Skipping malformed reaction");
            }
            _ => {}
        }
    }
    totals
}

/// Fetches a message's reply thread when it reports replies
pub async fn fetch_comments(
    client: &dyn PlatformClient,
    call_timeout: Duration,
    message: &Message,
    channel: &str,
) -> Vec<Comment> {
    if message.reply_count() <= 0 {
        return Vec::new();
    }

    let call = with_timeout(
        "fetch_comments",
        call_timeout,
        client.fetch_comments(message.chat_id, message.id),
    );
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(comments)) => comments,
        Ok(Err(e)) => {
            tracing::error!(channel, message_id = message.id, error = %e, "Fetch comments error");
            Vec::new()
        }
        Err(panic) => {
            tracing::error!(
                channel,
                message_id = message.id,
                panic = %panic_message(&panic),
                "Recovered from panic while fetching comments"
            );
            Vec::new()
        }
    }
}

/// Fetches a message's view count, 0 on failure
pub async fn fetch_view_count(
    client: &dyn PlatformClient,
    call_timeout: Duration,
    message: &Message,
) -> i64 {
    with_timeout("fetch_view_count", call_timeout, client.fetch_view_count(message))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(message_id = message.id, error = %e, "View count unavailable");
            0
        })
}

/// Fetches a message's share count, 0 on failure
pub async fn fetch_share_count(
    client: &dyn PlatformClient,
    call_timeout: Duration,
    message: &Message,
) -> i64 {
    with_timeout(
        "fetch_share_count",
        call_timeout,
        client.fetch_share_count(message.chat_id, message.id),
    )
    .await
    .unwrap_or_else(|e| {
        tracing::warn!(message_id = message.id, error = %e, "Share count unavailable");
        0
    })
}
