//! Record extraction from the rendered page.
//!
//! Nothing here fails: absent optional fields take their defaults and a
//! thread without text yields no record.

use serde_json::Value;
use ytharvest_core::{CommentRecord, Field, VideoMetadata};

use crate::jsonld;
use crate::locator::LocatorSet;
use crate::page::Page;

const AVATAR_LOW_RES: &str = "s48-c-k";
const AVATAR_HIGH_RES: &str = "s100-c-k";

/// Build a [`CommentRecord`] from one thread element.
pub async fn extract_comment<P: Page>(
    page: &P,
    locators: &LocatorSet,
    thread: &P::Node,
) -> Option<CommentRecord> {
    let text = locators
        .value(page, Field::CommentText, Some(thread))
        .await?;
    let author = locators
        .value(page, Field::CommentAuthor, Some(thread))
        .await;
    let timestamp = locators
        .value(page, Field::CommentTimestamp, Some(thread))
        .await;
    let likes = locators
        .value(page, Field::CommentLikes, Some(thread))
        .await;
    CommentRecord::new(&text, author, timestamp, likes)
}

/// Read the video-level metadata once.
pub async fn extract_video_metadata<P: Page>(page: &P, locators: &LocatorSet) -> VideoMetadata {
    let defaults = VideoMetadata::default();
    let title = locators
        .value(page, Field::VideoTitle, None)
        .await
        .unwrap_or(defaults.title);
    let view_count = locators
        .value(page, Field::ViewCount, None)
        .await
        .unwrap_or(defaults.view_count);
    let upload_date = locators
        .value(page, Field::UploadDate, None)
        .await
        .unwrap_or(defaults.upload_date);
    let channel_subscriber_count = locators
        .value(page, Field::SubscriberCount, None)
        .await
        .unwrap_or(defaults.channel_subscriber_count);
    let channel_avatar_url = locators
        .value(page, Field::ChannelAvatar, None)
        .await
        .map(|src| src.replace(AVATAR_LOW_RES, AVATAR_HIGH_RES));

    let mut like_count = locators.value(page, Field::VideoLikes, None).await;
    if like_count.is_none() {
        like_count = locators
            .value(page, Field::LikeButtonState, None)
            .await
            .and_then(|raw| like_state_title(&raw));
    }
    let mut channel_name = locators.value(page, Field::ChannelName, None).await;

    if like_count.is_none() || channel_name.is_none() {
        let blocks = locators.values(page, Field::StructuredData, None).await;
        if like_count.is_none() {
            like_count = jsonld::interaction_count(&blocks, "LikeAction");
        }
        if channel_name.is_none() {
            channel_name = jsonld::author_name(&blocks);
        }
    }

    VideoMetadata {
        title,
        view_count,
        like_count: like_count.unwrap_or(defaults.like_count),
        upload_date,
        channel_name: channel_name.unwrap_or(defaults.channel_name),
        channel_subscriber_count,
        channel_avatar_url,
    }
}

/// `title` of the like button's serialized state, if it parses.
fn like_state_title(raw: &str) -> Option<String> {
    let state: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(err) => {
            tracing::debug!(error = %err, "unparseable like button state");
            return None;
        }
    };
    state
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Texts of every currently rendered thread, in document order, without
/// scrolling.
pub async fn extract_comment_texts<P: Page>(page: &P, locators: &LocatorSet) -> Vec<String> {
    let threads = match locators.nodes(page, Field::Thread, None).await {
        Ok(threads) => threads,
        Err(err) => {
            tracing::warn!(error = %err, "thread snapshot failed");
            return Vec::new();
        }
    };
    let mut texts = Vec::with_capacity(threads.len());
    for thread in &threads {
        if let Some(text) = locators
            .value(page, Field::CommentText, Some(thread))
            .await
        {
            texts.push(text);
        }
    }
    texts
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
