//! Randomized pacing and synthetic pointer activity.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use ytharvest_core::DelayRange;

use crate::page::Page;

/// Draws and sleeps randomized delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pacer;

impl Pacer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Uniform draw from `range`, in milliseconds.
    #[must_use]
    pub fn draw(&self, range: DelayRange) -> Duration {
        if range.min_ms >= range.max_ms {
            return Duration::from_millis(range.min_ms);
        }
        let ms = rand::rng().random_range(RangeInclusive::from(range));
        Duration::from_millis(ms)
    }

    /// Sleep for a draw from `range` and return how long that was.
    pub async fn pace(&self, range: DelayRange) -> Duration {
        let delay = self.draw(range);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Sleep exactly `ms` milliseconds; zero returns immediately.
    pub async fn pause(&self, ms: u64) {
        self.pace(DelayRange::fixed(ms)).await;
    }

    /// Scroll distance drawn from `[min_px, max_px]`.
    #[must_use]
    pub fn scroll_increment(&self, min_px: u32, max_px: u32) -> i64 {
        let px = if min_px >= max_px {
            min_px
        } else {
            rand::rng().random_range(min_px..=max_px)
        };
        i64::from(px)
    }

    /// Dispatch one pointer move at a random point inside the viewport.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn simulate_movement<P: Page>(&self, page: &P) {
        let (width, height) = match page.viewport().await {
            Ok(size) => size,
            Err(err) => {
                tracing::debug!(error = %err, "viewport unavailable, skipping pointer move");
                return;
            }
        };
        let (x, y) = {
            let mut rng = rand::rng();
            (
                rng.random_range(0..width.max(1)),
                rng.random_range(0..height.max(1)),
            )
        };
        if let Err(err) = page.pointer_move(x, y).await {
            tracing::debug!(error = %err, x, y, "pointer move failed");
        }
    }
}
