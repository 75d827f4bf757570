//! Incremental collection of comment records from a lazily loading list.
//!
//! Each iteration snapshots the rendered threads, extracts and dedups
//! records, then scrolls to trigger more loading. The loop is bounded by
//! the target count, a stagnation counter and an attempt cap.

use uuid::Uuid;
use ytharvest_core::{CollectionResult, CollectorConfig, CommentRecord, Field};

use crate::dedup::DedupIndex;
use crate::error::EngineError;
use crate::extract::{extract_comment, extract_video_metadata};
use crate::locator::LocatorSet;
use crate::pacing::Pacer;
use crate::page::Page;
use crate::poll::{poll_until, PollPolicy, PollTarget};

struct CollectRun<'a, P: Page> {
    page: &'a P,
    locators: &'a LocatorSet,
    config: &'a CollectorConfig,
    pacer: Pacer,
    target: usize,
    items: Vec<CommentRecord>,
    index: DedupIndex,
    steps: u32,
}

impl<P: Page> PollTarget for CollectRun<'_, P> {
    type Error = EngineError;

    async fn sample(&mut self) -> Result<usize, EngineError> {
        let threads = self.locators.nodes(self.page, Field::Thread, None).await?;
        for thread in &threads {
            if self.items.len() >= self.target {
                break;
            }
            let Some(record) = extract_comment(self.page, self.locators, thread).await else {
                continue;
            };
            if self.index.record(record.key()) {
                self.items.push(record);
            }
        }
        tracing::debug!(
            rendered = threads.len(),
            collected = self.items.len(),
            "thread snapshot processed"
        );
        Ok(self.items.len())
    }

    fn satisfied(&self) -> bool {
        self.items.len() >= self.target
    }

    async fn advance(&mut self, attempt: u32) -> Result<(), EngineError> {
        let cfg = self.config;
        let dy = self
            .pacer
            .scroll_increment(cfg.scroll_min_px, cfg.scroll_max_px);
        self.page.scroll_by(dy).await?;
        self.pacer.pace(cfg.step_delay).await;

        if cfg.jitter_every > 0 && attempt % cfg.jitter_every == 0 {
            let px = i64::from(cfg.jitter_px);
            self.page.scroll_by(-px).await?;
            self.pacer.pause(cfg.jitter_pause_ms).await;
            self.page.scroll_by(px).await?;
            self.pacer.pause(cfg.jitter_pause_ms).await;
        }

        self.steps += 1;
        if cfg.batch_size > 0 && self.steps % cfg.batch_size == 0 {
            tracing::debug!(steps = self.steps, "batch pause");
            self.pacer.pause(cfg.batch_pause_ms).await;
        }

        if cfg.simulate_movement {
            self.pacer.simulate_movement(self.page).await;
        }
        Ok(())
    }
}

/// Collect up to `target` distinct comment records.
///
/// A `target` of zero returns an empty result without touching the page.
///
/// # Errors
///
/// Returns [`EngineError::Page`] if a scroll fails or every thread locator
/// rule fails outright. A thread that merely lacks fields is skipped.
pub async fn collect<P: Page>(
    page: &P,
    locators: &LocatorSet,
    target: usize,
    config: &CollectorConfig,
) -> Result<CollectionResult, EngineError> {
    if target == 0 {
        return Ok(CollectionResult::empty());
    }

    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, target, max_attempts = config.max_attempts, "collection started");

    let pacer = Pacer::new();
    let metadata = if config.capture_metadata {
        Some(extract_video_metadata(page, locators).await)
    } else {
        None
    };

    let origin = match page.scroll_position().await {
        Ok(y) => Some(y),
        Err(err) => {
            tracing::debug!(error = %err, "scroll position unavailable");
            None
        }
    };

    if let Some(section) = locators.element(page, Field::CommentsSection, None).await {
        if let Err(err) = page.scroll_into_view(&section).await {
            tracing::debug!(error = %err, "could not bring comments into view");
        }
        pacer.pause(config.initial_settle_ms).await;
    }

    let mut run = CollectRun {
        page,
        locators,
        config,
        pacer,
        target,
        items: Vec::new(),
        index: DedupIndex::new(),
        steps: 0,
    };
    let policy = PollPolicy {
        max_attempts: config.max_attempts,
        stagnation_threshold: config.stagnation_threshold,
    };
    let outcome = poll_until(&mut run, policy).await;

    if config.restore_scroll {
        if let Some(y) = origin {
            if let Err(err) = page.scroll_to(y, true).await {
                tracing::debug!(error = %err, "scroll restore failed");
            }
        }
    }

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!(%run_id, error = %err, "collection aborted");
            return Err(err);
        }
    };

    let mut items = run.items;
    let total_seen = items.len();
    items.truncate(target);

    let result = CollectionResult {
        items,
        total_seen,
        exhausted_attempts: report.attempts >= config.max_attempts,
        attempts_used: report.attempts,
        stop_reason: report.stop,
        metadata,
    };
    tracing::info!(
        %run_id,
        collected = result.items.len(),
        attempts = result.attempts_used,
        stop = ?result.stop_reason,
        "collection finished"
    );
    Ok(result)
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
