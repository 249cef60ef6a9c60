//! Platform message model
//!
//! Messages arrive as a closed tagged union over the content shapes the
//! platform supports. Optional file references model what the platform may
//! omit on a corrupt or partially delivered message.

use crate::model::ContentKind;
use serde::{Deserialize, Serialize};

/// One message as delivered by the platform client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chat_id: i64,

    /// Publish time, unix seconds
    pub date: i64,

    /// Last edit time, unix seconds (0 when never edited)
    #[serde(default)]
    pub edit_date: i64,

    /// Public permalink, e.g. `https://t.me/channel/42`
    pub permalink: String,

    pub content: MessageContent,

    #[serde(default)]
    pub interaction: Option<InteractionInfo>,

    /// Handle of the channel this message was forwarded from
    #[serde(default)]
    pub forwarded_from: Option<String>,
}

impl Message {
    /// Reply count reported by the platform (0 when unknown)
    pub fn reply_count(&self) -> i64 {
        self.interaction
            .as_ref()
            .map(|info| info.reply_count)
            .unwrap_or(0)
    }
}

/// Interaction counters attached to a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionInfo {
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub forward_count: i64,
    #[serde(default)]
    pub reply_count: i64,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

/// One reaction bucket on a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(default)]
    pub reaction: Option<ReactionType>,
    pub total_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactionType {
    Emoji { emoji: String },
    CustomEmoji { custom_emoji_id: i64 },
    Paid,
}

/// A single resolution of a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub remote_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GiveawayPrize {
    Premium { month_count: i32 },
    Stars { star_count: i64 },
}

impl GiveawayPrize {
    /// Human readable prize type
    pub fn label(&self) -> &'static str {
        match self {
            Self::Premium { .. } => "premium",
            Self::Stars { .. } => "stars",
        }
    }
}

/// Message content, exactly one shape per message
///
/// File fields hold the platform's remote file ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    Photo {
        caption: Option<String>,
        #[serde(default)]
        sizes: Vec<PhotoSize>,
    },
    Video {
        caption: Option<String>,
        thumbnail: Option<String>,
        video: Option<String>,
    },
    VideoNote {
        thumbnail: Option<String>,
        video: Option<String>,
    },
    Animation {
        caption: Option<String>,
        thumbnail: Option<String>,
        animation: Option<String>,
    },
    Document {
        caption: Option<String>,
        #[serde(default)]
        file_name: String,
        thumbnail: Option<String>,
        document: Option<String>,
    },
    Sticker {
        emoji: Option<String>,
        sticker: Option<String>,
    },
    AnimatedEmoji {
        emoji: String,
    },
    Poll {
        question: String,
    },
    Giveaway {
        prize: GiveawayPrize,
    },
    GiveawayWinners {
        #[serde(default)]
        winner_count: i64,
    },
    GiveawayCompleted {
        #[serde(default)]
        winner_count: i64,
    },
    PaidMedia {
        caption: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl MessageContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text { .. } => ContentKind::Text,
            Self::Photo { .. } => ContentKind::Photo,
            Self::Video { .. } => ContentKind::Video,
            Self::VideoNote { .. } => ContentKind::VideoNote,
            Self::Animation { .. } => ContentKind::Animation,
            Self::Document { .. } => ContentKind::Document,
            Self::Sticker { .. } => ContentKind::Sticker,
            Self::AnimatedEmoji { .. } => ContentKind::AnimatedEmoji,
            Self::Poll { .. } => ContentKind::Poll,
            Self::Giveaway { .. } => ContentKind::Giveaway,
            Self::GiveawayWinners { .. } => ContentKind::GiveawayWinners,
            Self::GiveawayCompleted { .. } => ContentKind::GiveawayCompleted,
            Self::PaidMedia { .. } => ContentKind::PaidMedia,
            Self::Unknown => ContentKind::Unknown,
        }
    }
}

/// The conversation a batch of messages belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub chat_id: i64,

    /// Display title of the channel
    pub title: String,
}

/// Channel-wide counters reported alongside a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    #[serde(default)]
    pub member_count: i64,
    #[serde(default)]
    pub post_count: i64,
    #[serde(default)]
    pub view_count: i64,
}

/// Everything fetched for one crawl identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelBatch {
    pub context: ConversationContext,
    #[serde(default)]
    pub stats: ChannelStats,
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Channel identifiers the platform reports as related to this one
    #[serde(default)]
    pub linked_channels: Vec<String>,
}

/// Metadata of a remote file, resolved before download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Client-local file id used for download
    pub id: i64,
    pub remote_id: String,
}
