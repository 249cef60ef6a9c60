//! Per-kind content rules
//!
//! Each content kind has exactly one rule that pulls the description and the
//! remote file ids worth uploading out of a message. Rules are looked up in
//! [`CONTENT_RULES`] by kind.

use crate::extractor::ExtractError;
use crate::model::ContentKind;
use crate::platform::MessageContent;

/// What a content rule extracts from a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentParts {
    pub description: String,

    /// Remote id of the preview image
    pub thumbnail_remote: Option<String>,

    /// Remote id of the media body
    pub media_remote: Option<String>,
}

impl ContentParts {
    fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Extraction rule for one content kind
pub type ContentRule = fn(&MessageContent) -> Result<ContentParts, ExtractError>;

/// Rule table, one entry per content kind
pub const CONTENT_RULES: &[(ContentKind, ContentRule)] = &[
    (ContentKind::Text, text_rule),
    (ContentKind::Photo, photo_rule),
    (ContentKind::Video, video_rule),
    (ContentKind::VideoNote, video_note_rule),
    (ContentKind::Animation, animation_rule),
    (ContentKind::Document, document_rule),
    (ContentKind::Sticker, sticker_rule),
    (ContentKind::AnimatedEmoji, animated_emoji_rule),
    (ContentKind::Poll, poll_rule),
    (ContentKind::Giveaway, giveaway_rule),
    (ContentKind::GiveawayWinners, giveaway_result_rule),
    (ContentKind::GiveawayCompleted, giveaway_result_rule),
    (ContentKind::PaidMedia, paid_media_rule),
    (ContentKind::Unknown, unknown_rule),
];

/// Looks up the rule for a content kind
pub fn rule_for(kind: ContentKind) -> Option<ContentRule> {
    CONTENT_RULES
        .iter()
        .find(|(rule_kind, _)| *rule_kind == kind)
        .map(|(_, rule)| *rule)
}

/// Applies the rule for the message's kind
///
/// A content shape the rule cannot read degrades to empty parts.
pub fn extract_content(content: &MessageContent) -> ContentParts {
    let kind = content.kind();
    let Some(rule) = rule_for(kind) else {
        tracing::warn!(kind = %kind, "No content rule registered");
        return ContentParts::default();
    };

    match rule(content) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Malformed message content");
            ContentParts::default()
        }
    }
}

fn mismatch(expected: ContentKind, content: &MessageContent) -> ExtractError {
    ExtractError::ContentMismatch {
        expected,
        actual: content.kind(),
    }
}

fn caption_text(caption: &Option<String>) -> String {
    caption.clone().unwrap_or_default()
}

fn text_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Text { text } => Ok(ContentParts::described(text.clone())),
        other => Err(mismatch(ContentKind::Text, other)),
    }
}

fn photo_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Photo { caption, sizes } => {
            if sizes.is_empty() {
                return Err(ExtractError::MissingMedia(ContentKind::Photo));
            }
            Ok(ContentParts {
                description: caption_text(caption),
                thumbnail_remote: sizes.first().map(|size| size.remote_id.clone()),
                media_remote: None,
            })
        }
        other => Err(mismatch(ContentKind::Photo, other)),
    }
}

fn video_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Video {
            caption,
            thumbnail,
            video,
        } => {
            // A video without a thumbnail is how a corrupt message shows up
            if thumbnail.is_none() {
                return Err(ExtractError::MissingMedia(ContentKind::Video));
            }
            Ok(ContentParts {
                description: caption_text(caption),
                thumbnail_remote: thumbnail.clone(),
                media_remote: video.clone(),
            })
        }
        other => Err(mismatch(ContentKind::Video, other)),
    }
}

fn video_note_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::VideoNote { thumbnail, video } => Ok(ContentParts {
            description: String::new(),
            thumbnail_remote: thumbnail.clone(),
            media_remote: video.clone(),
        }),
        other => Err(mismatch(ContentKind::VideoNote, other)),
    }
}

fn animation_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Animation {
            caption, thumbnail, ..
        } => Ok(ContentParts {
            description: caption_text(caption),
            thumbnail_remote: thumbnail.clone(),
            media_remote: None,
        }),
        other => Err(mismatch(ContentKind::Animation, other)),
    }
}

fn document_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Document {
            caption,
            file_name,
            thumbnail,
            document,
        } => {
            let description = match caption {
                Some(caption) if !caption.is_empty() => caption.clone(),
                _ => file_name.clone(),
            };
            Ok(ContentParts {
                description,
                thumbnail_remote: thumbnail.clone(),
                media_remote: document.clone(),
            })
        }
        other => Err(mismatch(ContentKind::Document, other)),
    }
}

fn sticker_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Sticker { sticker, .. } => Ok(ContentParts {
            description: String::new(),
            thumbnail_remote: sticker.clone(),
            media_remote: None,
        }),
        other => Err(mismatch(ContentKind::Sticker, other)),
    }
}

fn animated_emoji_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::AnimatedEmoji { emoji } => Ok(ContentParts::described(emoji.clone())),
        other => Err(mismatch(ContentKind::AnimatedEmoji, other)),
    }
}

fn poll_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Poll { question } => Ok(ContentParts::described(question.clone())),
        other => Err(mismatch(ContentKind::Poll, other)),
    }
}

fn giveaway_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::Giveaway { prize } => Ok(ContentParts::described(prize.label())),
        other => Err(mismatch(ContentKind::Giveaway, other)),
    }
}

fn giveaway_result_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::GiveawayWinners { winner_count }
        | MessageContent::GiveawayCompleted { winner_count } => {
            tracing::debug!(kind = %content.kind(), winner_count, "Giveaway result message");
            Ok(ContentParts::default())
        }
        other => Err(mismatch(ContentKind::GiveawayWinners, other)),
    }
}

fn paid_media_rule(content: &MessageContent) -> Result<ContentParts, ExtractError> {
    match content {
        MessageContent::PaidMedia { caption } => Ok(ContentParts::described(caption_text(caption))),
        other => Err(mismatch(ContentKind::PaidMedia, other)),
    }
}

fn unknown_rule(_content: &MessageContent) -> Result<ContentParts, ExtractError> {
    tracing::debug!("Unknown message content type");
    Ok(ContentParts::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{GiveawayPrize, PhotoSize};

    #[test]
    fn test_every_kind_has_exactly_one_rule() {
        let kinds = [
            ContentKind::Text,
            ContentKind::Photo,
            ContentKind::Video,
            ContentKind::VideoNote,
            ContentKind::Animation,
            ContentKind::Document,
            ContentKind::Sticker,
            ContentKind::AnimatedEmoji,
            ContentKind::Poll,
            ContentKind::Giveaway,
            ContentKind::GiveawayWinners,
            ContentKind::GiveawayCompleted,
            ContentKind::PaidMedia,
            ContentKind::Unknown,
        ];
        for kind in kinds {
            let count = CONTENT_RULES.iter().filter(|(k, _)| *k == kind).count();
            assert_eq!(count, 1, "{} should have one rule", kind);
        }
        assert_eq!(CONTENT_RULES.len(), kinds.len());
    }

    #[test]
    fn test_text() {
        let parts = extract_content(&MessageContent::Text {
            text: "hello".to_string(),
        });
        assert_eq!(parts.description, "hello");
        assert!(parts.thumbnail_remote.is_none());
        assert!(parts.media_remote.is_none());
    }

    #[test]
    fn test_photo_uses_first_size() {
        let parts = extract_content(&MessageContent::Photo {
            caption: Some("sunset".to_string()),
            sizes: vec![
                PhotoSize {
                    remote_id: "small".to_string(),
                    width: 90,
                    height: 60,
                },
                PhotoSize {
                    remote_id: "large".to_string(),
                    width: 1280,
                    height: 853,
                },
            ],
        });
        assert_eq!(parts.description, "sunset");
        assert_eq!(parts.thumbnail_remote.as_deref(), Some("small"));
    }

    #[test]
    fn test_photo_without_sizes_degrades() {
        let parts = extract_content(&MessageContent::Photo {
            caption: Some("lost".to_string()),
            sizes: Vec::new(),
        });
        assert_eq!(parts, ContentParts::default());
    }

    #[test]
    fn test_video_note_carries_body() {
        let parts = extract_content(&MessageContent::VideoNote {
            thumbnail: Some("thumb".to_string()),
            video: Some("body".to_string()),
        });
        assert_eq!(parts.thumbnail_remote.as_deref(), Some("thumb"));
        assert_eq!(parts.media_remote.as_deref(), Some("body"));
    }

    #[test]
    fn test_document_falls_back_to_file_name() {
        let parts = extract_content(&MessageContent::Document {
            caption: None,
            file_name: "report.pdf".to_string(),
            thumbnail: None,
            document: Some("doc".to_string()),
        });
        assert_eq!(parts.description, "report.pdf");
        assert_eq!(parts.media_remote.as_deref(), Some("doc"));
    }

    #[test]
    fn test_descriptions_without_media() {
        let poll = extract_content(&MessageContent::Poll {
            question: "Tea or coffee?".to_string(),
        });
        assert_eq!(poll.description, "Tea or coffee?");

        let giveaway = extract_content(&MessageContent::Giveaway {
            prize: GiveawayPrize::Stars { star_count: 100 },
        });
        assert_eq!(giveaway.description, "stars");

        let winners = extract_content(&MessageContent::GiveawayWinners { winner_count: 3 });
        assert_eq!(winners, ContentParts::default());

        let unknown = extract_content(&MessageContent::Unknown);
        assert_eq!(unknown, ContentParts::default());
    }

    #[test]
    fn test_rule_rejects_foreign_content() {
        let rule = rule_for(ContentKind::Poll).unwrap();
        let result = rule(&MessageContent::Text {
            text: "x".to_string(),
        });
        assert!(matches!(
            result,
            Err(ExtractError::ContentMismatch {
                expected: ContentKind::Poll,
                actual: ContentKind::Text
            })
        ));
    }
}
