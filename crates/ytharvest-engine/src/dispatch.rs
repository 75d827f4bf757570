//! Request/response boundary over the engine.
//!
//! Requests arrive as JSON objects tagged by `action`. Page-mutating runs
//! (detailed extraction and auto-reply) are serialized by a re-entrancy
//! guard; a second one while another is active is answered with `busy`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use ytharvest_core::{
    AppConfig, ChannelInfo, CollectionResult, CollectorConfig, CommentRecord, Field, ReplyConfig,
    ReplyOutcome, ReplyProgressEvent, StopReason, VideoMetadata,
};

use crate::collector::collect;
use crate::extract::extract_comment_texts;
use crate::locator::LocatorSet;
use crate::page::Page;
use crate::reply::reply_to_up_to_n;

pub const DEFAULT_EXTRACT_LIMIT: i64 = 10;
pub const MAX_EXTRACT_LIMIT: usize = 100;
pub const MIN_REPLY_LIMIT: i64 = 1;
pub const MAX_REPLY_LIMIT: i64 = 50;

const SITE_ORIGIN: &str = "https://www.youtube.com";
const UNKNOWN_CHANNEL: &str = "Unknown channel";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractFormat {
    Simple,
    #[default]
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    ExtractComments {
        #[serde(default)]
        limit: Option<i64>,
        #[serde(default)]
        format: ExtractFormat,
    },
    GetChannelInfo,
    #[serde(rename_all = "camelCase")]
    AutoReply {
        reply_limit: i64,
        reply_message: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SimpleComments {
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetailedComments {
    pub video_info: Option<VideoMetadata>,
    pub comments: Vec<CommentRecord>,
    pub total_found: usize,
    pub reached_limit: bool,
    pub attempts: u32,
    pub stop_reason: StopReason,
    pub message: String,
}

impl From<CollectionResult> for DetailedComments {
    fn from(result: CollectionResult) -> Self {
        let message = result.status_message();
        Self {
            video_info: result.metadata,
            comments: result.items,
            total_found: result.total_seen,
            reached_limit: result.exhausted_attempts,
            attempts: result.attempts_used,
            stop_reason: result.stop_reason,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidRequest,
    Busy,
    Timeout,
    Internal,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Response {
    Simple(SimpleComments),
    Detailed(Box<DetailedComments>),
    ChannelInfo(ChannelInfo),
    Reply(ReplyOutcome),
    Error(ErrorPayload),
}

impl Response {
    fn error(kind: ErrorKind, error: impl Into<String>) -> Self {
        Response::Error(ErrorPayload {
            error: error.into(),
            kind,
        })
    }
}

/// Fire-and-forget messages emitted while a request is running.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    UpdateReplyProgress { progress: ReplyProgressEvent },
}

/// Run parameters the dispatcher passes down to the engine.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub collector: CollectorConfig,
    pub reply: ReplyConfig,
    pub reply_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            collector: CollectorConfig::default(),
            reply: ReplyConfig::default(),
            reply_timeout: Duration::from_secs(300),
        }
    }
}

impl From<&AppConfig> for DispatchSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            collector: config.collector.clone(),
            reply: config.reply.clone(),
            reply_timeout: Duration::from_secs(config.reply_timeout_secs),
        }
    }
}

/// Held while a page-mutating run is active.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Dispatcher<P: Page> {
    page: P,
    locators: LocatorSet,
    settings: DispatchSettings,
    notifications: UnboundedSender<Notification>,
    active: AtomicBool,
}

impl<P: Page> Dispatcher<P> {
    pub fn new(
        page: P,
        locators: LocatorSet,
        settings: DispatchSettings,
        notifications: UnboundedSender<Notification>,
    ) -> Self {
        Self {
            page,
            locators,
            settings,
            notifications,
            active: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub(crate) fn page(&self) -> &P {
        &self.page
    }

    /// Parse one JSON request and handle it.
    pub async fn handle_json(&self, raw: &str) -> Response {
        match serde_json::from_str::<Request>(raw) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                tracing::warn!(error = %err, "rejected malformed request");
                Response::error(ErrorKind::InvalidRequest, format!("invalid request: {err}"))
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        tracing::debug!(?request, "handling request");
        match request {
            Request::ExtractComments { limit, format } => self.extract(limit, format).await,
            Request::GetChannelInfo => Response::ChannelInfo(self.channel_info().await),
            Request::AutoReply {
                reply_limit,
                reply_message,
            } => self.auto_reply(reply_limit, &reply_message).await,
        }
    }

    async fn extract(&self, limit: Option<i64>, format: ExtractFormat) -> Response {
        let target = clamp_extract_limit(limit);

        if format == ExtractFormat::Simple {
            let mut comments = extract_comment_texts(&self.page, &self.locators).await;
            comments.truncate(target);
            return Response::Simple(SimpleComments { comments });
        }

        let Some(_guard) = RunGuard::acquire(&self.active) else {
            return busy();
        };
        match collect(&self.page, &self.locators, target, &self.settings.collector).await {
            Ok(result) => Response::Detailed(Box::new(result.into())),
            Err(err) => {
                tracing::error!(error = %err, "collection failed");
                Response::error(ErrorKind::Internal, err.to_string())
            }
        }
    }

    async fn auto_reply(&self, limit: i64, message: &str) -> Response {
        let message = message.trim();
        if message.is_empty() {
            return Response::error(ErrorKind::InvalidRequest, "reply message must not be empty");
        }
        let limit = clamp_reply_limit(limit);

        let Some(_guard) = RunGuard::acquire(&self.active) else {
            return busy();
        };
        let notifications = &self.notifications;
        let run = reply_to_up_to_n(
            &self.page,
            &self.locators,
            &self.settings.reply,
            limit,
            message,
            |progress| {
                if notifications
                    .send(Notification::UpdateReplyProgress { progress })
                    .is_err()
                {
                    tracing::trace!("no progress listener");
                }
            },
        );
        match tokio::time::timeout(self.settings.reply_timeout, run).await {
            Ok(outcome) => Response::Reply(outcome),
            Err(_) => {
                let secs = self.settings.reply_timeout.as_secs();
                tracing::warn!(timeout_secs = secs, "reply run timed out");
                Response::error(
                    ErrorKind::Timeout,
                    format!("reply run did not finish within {secs}s"),
                )
            }
        }
    }

    async fn channel_info(&self) -> ChannelInfo {
        let name = self
            .locators
            .value(&self.page, Field::OwnChannelName, None)
            .await;
        let url = self
            .locators
            .value(&self.page, Field::OwnChannelLink, None)
            .await
            .map(|href| absolute_url(&href))
            .unwrap_or_default();
        match name {
            Some(channel_name) => ChannelInfo {
                channel_name,
                channel_url: url,
                error: None,
            },
            None => ChannelInfo {
                channel_name: UNKNOWN_CHANNEL.to_string(),
                channel_url: url,
                error: Some("channel name not found, is the account signed in?".to_string()),
            },
        }
    }
}

fn busy() -> Response {
    Response::error(ErrorKind::Busy, "another run is already in progress")
}

fn clamp_extract_limit(limit: Option<i64>) -> usize {
    let limit = limit.unwrap_or(DEFAULT_EXTRACT_LIMIT).max(0);
    usize::try_from(limit).map_or(MAX_EXTRACT_LIMIT, |l| l.min(MAX_EXTRACT_LIMIT))
}

fn clamp_reply_limit(limit: i64) -> usize {
    let clamped = limit.clamp(MIN_REPLY_LIMIT, MAX_REPLY_LIMIT);
    usize::try_from(clamped).unwrap_or(1)
}

fn absolute_url(href: &str) -> String {
    if href.starts_with('/') {
        format!("{SITE_ORIGIN}{href}")
    } else {
        href.to_string()
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
