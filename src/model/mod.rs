//! Canonical output records
//!
//! Every platform message, whatever its content shape, becomes one [`Post`].

mod post;

pub use post::{ChannelData, Comment, EngagementData, Post};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The mutually exclusive content shapes a message can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Photo,
    Video,
    VideoNote,
    Animation,
    Document,
    Sticker,
    AnimatedEmoji,
    Poll,
    Giveaway,
    GiveawayWinners,
    GiveawayCompleted,
    PaidMedia,
    Unknown,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::VideoNote => "video_note",
            Self::Animation => "animation",
            Self::Document => "document",
            Self::Sticker => "sticker",
            Self::AnimatedEmoji => "animated_emoji",
            Self::Poll => "poll",
            Self::Giveaway => "giveaway",
            Self::GiveawayWinners => "giveaway_winners",
            Self::GiveawayCompleted => "giveaway_completed",
            Self::PaidMedia => "paid_media",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
