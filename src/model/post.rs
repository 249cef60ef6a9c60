use crate::model::ContentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized record for one source message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Stable id: `<message-number>-<channel>`
    pub post_uid: String,

    /// Permalink of the source message
    pub post_link: String,

    pub channel_id: i64,
    pub channel_name: String,

    pub published_at: DateTime<Utc>,

    /// Last edit time, if the message was ever edited
    pub edited_at: Option<DateTime<Utc>>,

    pub platform_name: String,

    /// Content kind tag
    pub post_type: ContentKind,

    pub description: String,

    /// Blob reference of the uploaded thumbnail
    pub thumb_url: Option<String>,

    /// Blob reference of the uploaded media body
    pub media_url: Option<String>,

    pub view_count: i64,
    pub like_count: i64,
    pub share_count: i64,
    pub comment_count: i64,

    pub channel_data: ChannelData,

    pub comments: Vec<Comment>,

    /// Emoji -> total reaction count
    pub reactions: HashMap<String, i64>,
}

/// Identity and aggregate counters of the channel a post belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelData {
    pub channel_id: i64,
    pub channel_name: String,
    pub channel_url_external: String,
    pub engagement: EngagementData,
}

/// Channel-level engagement counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementData {
    pub follower_count: i64,
    pub post_count: i64,
    pub views_count: i64,
}

/// A reply in a post's comment thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}
