//! Records produced by collection and reply runs.
//!
//! Every type here is owned by whoever called the run; nothing is retained
//! by the engine between invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown author";
pub const UNKNOWN_TIME: &str = "Unknown time";
pub const ZERO_LIKES: &str = "0";

/// One extracted top-level comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub text: String,
    pub author: String,
    pub timestamp: String,
    pub like_count: String,
}

/// Dedup identity of a [`CommentRecord`]: the exact `(text, author, timestamp)` tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentKey {
    pub text: String,
    pub author: String,
    pub timestamp: String,
}

impl CommentRecord {
    /// Builds a record, substituting defaults for absent optional fields.
    ///
    /// Returns `None` when `text` is empty after trimming.
    #[must_use]
    pub fn new(
        text: &str,
        author: Option<String>,
        timestamp: Option<String>,
        like_count: Option<String>,
    ) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            author: author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            timestamp: timestamp.unwrap_or_else(|| UNKNOWN_TIME.to_string()),
            like_count: like_count.unwrap_or_else(|| ZERO_LIKES.to_string()),
        })
    }

    #[must_use]
    pub fn key(&self) -> CommentKey {
        CommentKey {
            text: self.text.clone(),
            author: self.author.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    pub view_count: String,
    pub like_count: String,
    pub upload_date: String,
    pub channel_name: String,
    pub channel_subscriber_count: String,
    pub channel_avatar_url: Option<String>,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Title".to_string(),
            view_count: "Unknown views".to_string(),
            like_count: "Unknown likes".to_string(),
            upload_date: "Unknown date".to_string(),
            channel_name: "Unknown channel".to_string(),
            channel_subscriber_count: "Unknown subscribers".to_string(),
            channel_avatar_url: None,
        }
    }
}

/// Which bound ended a collection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    TargetReached,
    Stagnated,
    AttemptsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResult {
    /// Discovery order, truncated to the requested count.
    pub items: Vec<CommentRecord>,
    /// Distinct records seen before truncation.
    pub total_seen: usize,
    pub exhausted_attempts: bool,
    pub attempts_used: u32,
    pub stop_reason: StopReason,
    pub metadata: Option<VideoMetadata>,
}

impl CollectionResult {
    /// Result of a run that was asked for nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_seen: 0,
            exhausted_attempts: false,
            attempts_used: 0,
            stop_reason: StopReason::TargetReached,
            metadata: None,
        }
    }

    /// One-line human summary of how the run ended.
    #[must_use]
    pub fn status_message(&self) -> String {
        if self.items.is_empty() {
            return "No comments found. The page might need to load more comments.".to_string();
        }
        let mut message = format!("Found {} comments", self.items.len());
        if self.exhausted_attempts {
            message.push_str(&format!(
                " (reached maximum scroll attempts after {} scrolls, found {} total comments)",
                self.attempts_used, self.total_seen
            ));
        } else if self.total_seen > self.items.len() {
            message.push_str(&format!(
                " (showing {} of {} found)",
                self.items.len(),
                self.total_seen
            ));
        }
        message
    }
}

/// Counters of a reply run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyOutcome {
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Candidate threads in the run's snapshot.
    pub requested_total: usize,
    /// Replies the caller asked for.
    pub limit: usize,
    pub errors: Vec<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReplyOutcome {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            successful: 0,
            failed: 0,
            skipped: 0,
            requested_total: 0,
            limit,
            errors: Vec::new(),
            completed: false,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn processed(&self) -> usize {
        self.successful + self.failed + self.skipped
    }

    #[must_use]
    pub fn progress(&self) -> ReplyProgressEvent {
        ReplyProgressEvent {
            current: self.successful,
            total: self.limit,
            successful: self.successful,
            failed: self.failed,
            skipped: self.skipped,
            checked: self.processed(),
        }
    }
}

/// Snapshot of reply counters, relayed outward after each processed thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyProgressEvent {
    pub current: usize,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub checked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub channel_name: String,
    pub channel_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
