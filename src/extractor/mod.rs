//! Content extraction pipeline
//!
//! This module maps platform messages onto canonical post records:
//! - Per-kind content rules dispatched through a lookup table
//! - Media offload from the platform into the blob sink
//! - Comment, reaction and counter collection that degrades instead of failing
//! - Panic isolation around each message

mod content;
mod engagement;
mod extract;
mod media;

#[cfg(test)]
pub(crate) mod fakes;

pub use content::{extract_content, rule_for, ContentParts, ContentRule, CONTENT_RULES};
pub use engagement::aggregate_reactions;
pub use extract::{channel_url_external, message_number, ContentExtractor, ExtractorConfig};
pub use media::MediaOffload;

use crate::model::{ContentKind, Post};
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Errors that fail the extraction of a message
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Extraction panicked: {0}")]
    Panicked(String),

    #[error("Invalid publish timestamp: {0}")]
    InvalidTimestamp(i64),

    #[error("Content rule for {expected} applied to {actual} content")]
    ContentMismatch {
        expected: ContentKind,
        actual: ContentKind,
    },

    #[error("{0} message carries no media")]
    MissingMedia(ContentKind),
}

/// Why a message produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Published before the cutoff year
    BeforeCutoff,

    /// No message number in the permalink
    UnparseablePermalink,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeCutoff => f.write_str("before cutoff"),
            Self::UnparseablePermalink => f.write_str("unparseable permalink"),
        }
    }
}

/// Successful outcome of extracting one message
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Filtered(SkipReason),
    Extracted(Box<Post>),
}

impl Extraction {
    /// The extracted post, if any
    pub fn post(&self) -> Option<&Post> {
        match self {
            Self::Extracted(post) => Some(post),
            Self::Filtered(_) => None,
        }
    }
}

/// Extracts a human-readable message from a panic payload
pub(crate) fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(&static_str), "boom");
        assert_eq!(panic_message(&owned), "bang");
        assert_eq!(panic_message(&other), "unknown panic");
    }
}
