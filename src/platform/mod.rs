//! Source platform collaborator
//!
//! This module defines the contract the crawler consumes from a platform
//! (`PlatformClient`), the message model that flows through it, and an
//! export-directory backed implementation.

mod export;
mod message;
mod traits;

pub use export::{write_export, ChannelExport, ExportClient};
pub use message::{
    ChannelBatch, ChannelStats, ConversationContext, GiveawayPrize, InteractionInfo, Message,
    MessageContent, PhotoSize, Reaction, ReactionType, RemoteFile,
};
pub use traits::{with_timeout, PlatformClient, PlatformError, PlatformResult};
