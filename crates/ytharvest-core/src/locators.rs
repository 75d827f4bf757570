//! Locator rule tables.
//!
//! Each logical [`Field`] maps to an ordered list of [`LocatorRule`]s tried
//! first to last. The built-in table targets the current watch-page markup;
//! a YAML file can replace the rules of individual fields so markup drift is
//! a configuration change.
//!
//! ```yaml
//! locators:
//!   comment_text:
//!     - selector: "#content-text"
//!   video_likes:
//!     - selector: "like-button-view-model button"
//!       attribute: aria-label
//!       pattern: "along with ([\\d,]+)"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Thread,
    CommentText,
    CommentAuthor,
    CommentTimestamp,
    CommentLikes,
    CommentsSection,
    ReplyAuthor,
    VideoTitle,
    ViewCount,
    VideoLikes,
    LikeButtonState,
    UploadDate,
    ChannelName,
    SubscriberCount,
    ChannelAvatar,
    StructuredData,
    OwnChannelName,
    OwnChannelLink,
    ReplyButton,
    ReplyInput,
    SubmitButton,
    CancelButton,
}

impl Field {
    pub const ALL: [Field; 22] = [
        Field::Thread,
        Field::CommentText,
        Field::CommentAuthor,
        Field::CommentTimestamp,
        Field::CommentLikes,
        Field::CommentsSection,
        Field::ReplyAuthor,
        Field::VideoTitle,
        Field::ViewCount,
        Field::VideoLikes,
        Field::LikeButtonState,
        Field::UploadDate,
        Field::ChannelName,
        Field::SubscriberCount,
        Field::ChannelAvatar,
        Field::StructuredData,
        Field::OwnChannelName,
        Field::OwnChannelLink,
        Field::ReplyButton,
        Field::ReplyInput,
        Field::SubmitButton,
        Field::CancelButton,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Thread => "thread",
            Field::CommentText => "comment_text",
            Field::CommentAuthor => "comment_author",
            Field::CommentTimestamp => "comment_timestamp",
            Field::CommentLikes => "comment_likes",
            Field::CommentsSection => "comments_section",
            Field::ReplyAuthor => "reply_author",
            Field::VideoTitle => "video_title",
            Field::ViewCount => "view_count",
            Field::VideoLikes => "video_likes",
            Field::LikeButtonState => "like_button_state",
            Field::UploadDate => "upload_date",
            Field::ChannelName => "channel_name",
            Field::SubscriberCount => "subscriber_count",
            Field::ChannelAvatar => "channel_avatar",
            Field::StructuredData => "structured_data",
            Field::OwnChannelName => "own_channel_name",
            Field::OwnChannelLink => "own_channel_link",
            Field::ReplyButton => "reply_button",
            Field::ReplyInput => "reply_input",
            Field::SubmitButton => "submit_button",
            Field::CancelButton => "cancel_button",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selection rule.
///
/// The derived value is the element's text content, or the named attribute
/// when `attribute` is set. `pattern`, when present, must match the value;
/// its first capture group (or the whole match) becomes the value. Values
/// listed in `reject` count as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorRule {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reject: Vec<String>,
}

impl LocatorRule {
    #[must_use]
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attribute: None,
            pattern: None,
            reject: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(selector: &str, attribute: &str) -> Self {
        Self {
            attribute: Some(attribute.to_string()),
            ..Self::text(selector)
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    #[must_use]
    pub fn rejecting(mut self, value: &str) -> Self {
        self.reject.push(value.to_string());
        self
    }
}

/// Rule lists for every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorTable {
    pub locators: BTreeMap<Field, Vec<LocatorRule>>,
}

impl LocatorTable {
    #[must_use]
    pub fn rules(&self, field: Field) -> &[LocatorRule] {
        self.locators.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Replaces the rules of every field present in `overrides`.
    pub fn merge(&mut self, overrides: LocatorTable) {
        self.locators.extend(overrides.locators);
    }
}

impl Default for LocatorTable {
    fn default() -> Self {
        use LocatorRule as R;

        let mut locators = BTreeMap::new();
        locators.insert(Field::Thread, vec![R::text("ytd-comment-thread-renderer")]);
        locators.insert(
            Field::CommentText,
            vec![
                R::text("#comment #content-text"),
                R::text("#content-text"),
            ],
        );
        locators.insert(
            Field::CommentAuthor,
            vec![R::text("#comment #author-text"), R::text("#author-text")],
        );
        locators.insert(
            Field::CommentTimestamp,
            vec![
                R::text(r#"a.yt-simple-endpoint[href*="lc="]"#),
                R::text("#published-time-text a"),
            ],
        );
        locators.insert(
            Field::CommentLikes,
            vec![
                R::text("#comment #vote-count-middle"),
                R::text("#vote-count-middle"),
            ],
        );
        locators.insert(
            Field::CommentsSection,
            vec![R::text("#comments"), R::text("ytd-comments")],
        );
        locators.insert(
            Field::ReplyAuthor,
            vec![
                R::text("#replies ytd-comment-view-model #author-text"),
                R::text("#replies ytd-comment-renderer #author-text"),
                R::text("#replies #author-text"),
            ],
        );
        locators.insert(
            Field::VideoTitle,
            vec![
                R::text("h1.ytd-video-primary-info-renderer"),
                R::text("h1.ytd-watch-metadata yt-formatted-string"),
                R::attr(r#"meta[name="title"]"#, "content"),
            ],
        );
        locators.insert(
            Field::ViewCount,
            vec![
                R::text("#count .ytd-video-view-count-renderer"),
                R::text("#info-container #info span"),
            ],
        );
        locators.insert(
            Field::VideoLikes,
            vec![
                R::attr(
                    "ytd-segmented-like-dislike-button-renderer #segmented-like-button button",
                    "aria-label",
                )
                .with_pattern(r"(?i)like this video along with ([\d,]+)"),
                R::attr(
                    r#"ytd-menu-renderer ytd-segmented-like-dislike-button-renderer button[aria-label*="like this video"]"#,
                    "aria-label",
                )
                .with_pattern(r"(?i)like this video along with ([\d,]+)"),
                R::attr(
                    r#"#top-level-buttons-computed button[aria-label*="like this video"]"#,
                    "aria-label",
                )
                .with_pattern(r"(?i)like this video along with ([\d,]+)"),
                R::text(
                    "ytd-segmented-like-dislike-button-renderer #segmented-like-button button #text",
                )
                .rejecting("Like"),
            ],
        );
        locators.insert(
            Field::LikeButtonState,
            vec![R::attr("ytd-watch-flexy", "like-button-state")],
        );
        locators.insert(
            Field::UploadDate,
            vec![
                R::text("#info-strings yt-formatted-string"),
                R::attr(r#"meta[itemprop="uploadDate"]"#, "content"),
            ],
        );
        locators.insert(
            Field::ChannelName,
            vec![
                R::text("#channel-name a"),
                R::text("ytd-video-owner-renderer #channel-name"),
                R::attr(r#"span[itemprop="author"] link[itemprop="name"]"#, "content"),
            ],
        );
        locators.insert(Field::SubscriberCount, vec![R::text("#owner-sub-count")]);
        locators.insert(
            Field::ChannelAvatar,
            vec![
                R::attr("#channel-thumbnail img.yt-img-shadow", "src"),
                R::attr("#owner #avatar img", "src"),
                R::attr("#owner-sub-count img", "src"),
                R::attr("ytd-video-owner-renderer img.yt-img-shadow", "src"),
            ],
        );
        locators.insert(
            Field::StructuredData,
            vec![R::text(r#"script[type="application/ld+json"]"#)],
        );
        locators.insert(
            Field::OwnChannelName,
            vec![
                R::text("ytd-active-account-header-renderer #account-name"),
                R::text("#account-name"),
                R::attr("#simplebox-placeholder", "data-channel-name"),
            ],
        );
        locators.insert(
            Field::OwnChannelLink,
            vec![
                R::attr("ytd-active-account-header-renderer #manage-account a", "href"),
                R::attr("a#channel-handle", "href"),
            ],
        );
        locators.insert(
            Field::ReplyButton,
            vec![
                R::text("#reply-button-end button"),
                R::text("#reply-button-end"),
            ],
        );
        locators.insert(
            Field::ReplyInput,
            vec![
                R::text("#reply-dialog #contenteditable-root"),
                R::text("#contenteditable-root"),
            ],
        );
        locators.insert(
            Field::SubmitButton,
            vec![
                R::text("#reply-dialog #submit-button button"),
                R::text("#submit-button button"),
                R::text("#submit-button"),
            ],
        );
        locators.insert(
            Field::CancelButton,
            vec![
                R::text("#reply-dialog #cancel-button button"),
                R::text("#cancel-button button"),
                R::text("#cancel-button"),
            ],
        );

        Self { locators }
    }
}

/// Load locator overrides from a YAML file and merge them over the built-in table.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_locators(path: &Path) -> Result<LocatorTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LocatorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let overrides: LocatorTable =
        serde_yaml::from_str(&content).map_err(ConfigError::LocatorsFileParse)?;
    validate_locators(&overrides)?;

    let mut table = LocatorTable::default();
    table.merge(overrides);
    Ok(table)
}

fn validate_locators(table: &LocatorTable) -> Result<(), ConfigError> {
    for (field, rules) in &table.locators {
        if rules.is_empty() {
            return Err(ConfigError::Validation(format!(
                "locator '{field}' must list at least one rule"
            )));
        }
        for (idx, rule) in rules.iter().enumerate() {
            if rule.selector.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "locator '{field}' rule {idx} has an empty selector"
                )));
            }
            if rule.attribute.as_deref().is_some_and(|a| a.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "locator '{field}' rule {idx} names an empty attribute"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "locators_test.rs"]
mod tests;
