//! Tunables for collection and reply runs.
//!
//! Every threshold, attempt cap and pacing window lives here as a plain
//! parameter so call sites never carry their own constants.

/// Inclusive millisecond window a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange {
        min_ms: 0,
        max_ms: 0,
    };

    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A window that always yields exactly `ms`.
    #[must_use]
    pub const fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

impl From<DelayRange> for std::ops::RangeInclusive<u64> {
    fn from(range: DelayRange) -> Self {
        range.min_ms..=range.max_ms
    }
}

/// Parameters of one incremental collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub max_attempts: u32,
    /// Consecutive non-growing iterations after which the run gives up.
    pub stagnation_threshold: u32,
    pub scroll_min_px: u32,
    pub scroll_max_px: u32,
    /// Pacing delay awaited after every scroll step.
    pub step_delay: DelayRange,
    /// Scroll steps per batch; `0` disables batch pauses.
    pub batch_size: u32,
    pub batch_pause_ms: u64,
    /// Up-then-down jitter cadence in attempts; `0` disables it.
    pub jitter_every: u32,
    pub jitter_px: u32,
    pub jitter_pause_ms: u64,
    pub initial_settle_ms: u64,
    pub capture_metadata: bool,
    pub simulate_movement: bool,
    pub restore_scroll: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            stagnation_threshold: 5,
            scroll_min_px: 800,
            scroll_max_px: 1200,
            step_delay: DelayRange::new(1500, 2000),
            batch_size: 10,
            batch_pause_ms: 3000,
            jitter_every: 5,
            jitter_px: 500,
            jitter_pause_ms: 1000,
            initial_settle_ms: 2000,
            capture_metadata: true,
            simulate_movement: true,
            restore_scroll: true,
        }
    }
}

impl CollectorConfig {
    /// Same bounds as `self`, with every delay removed.
    #[must_use]
    pub fn without_pacing(mut self) -> Self {
        self.step_delay = DelayRange::ZERO;
        self.batch_pause_ms = 0;
        self.jitter_pause_ms = 0;
        self.initial_settle_ms = 0;
        self
    }
}

/// Parameters of one reply run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyConfig {
    pub open_settle_ms: u64,
    pub compose_settle_ms: u64,
    pub failure_cooldown_ms: u64,
    pub inter_reply_delay: DelayRange,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            open_settle_ms: 1000,
            compose_settle_ms: 500,
            failure_cooldown_ms: 1000,
            inter_reply_delay: DelayRange::new(2000, 4000),
        }
    }
}

impl ReplyConfig {
    #[must_use]
    pub fn without_pacing(mut self) -> Self {
        self.open_settle_ms = 0;
        self.compose_settle_ms = 0;
        self.failure_cooldown_ms = 0;
        self.inter_reply_delay = DelayRange::ZERO;
        self
    }
}
