//! Bounded sample-then-advance loop.
//!
//! The loop samples a growing count, stops once the target is satisfied,
//! once the count has not grown for `stagnation_threshold` consecutive
//! samples, or once `max_attempts` advances have been made.

use ytharvest_core::StopReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub stagnation_threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub stop: StopReason,
    /// Advances made before stopping.
    pub attempts: u32,
}

#[allow(async_fn_in_trait)]
pub trait PollTarget {
    type Error;

    /// Take one sample and return the current count.
    async fn sample(&mut self) -> Result<usize, Self::Error>;

    fn satisfied(&self) -> bool;

    /// Move forward so the next sample can see more. `attempt` is zero-based.
    async fn advance(&mut self, attempt: u32) -> Result<(), Self::Error>;
}

/// Drive `target` under `policy`.
///
/// # Errors
///
/// Propagates the first error returned by [`PollTarget::sample`] or
/// [`PollTarget::advance`].
pub async fn poll_until<T: PollTarget>(
    target: &mut T,
    policy: PollPolicy,
) -> Result<PollReport, T::Error> {
    let mut attempts = 0u32;
    let mut last_count = 0usize;
    let mut stagnant = 0u32;

    while !target.satisfied() && attempts < policy.max_attempts {
        let count = target.sample().await?;
        if count == last_count {
            stagnant += 1;
            if stagnant >= policy.stagnation_threshold {
                tracing::debug!(attempts, count, "no growth, stopping");
                return Ok(PollReport {
                    stop: StopReason::Stagnated,
                    attempts,
                });
            }
        } else {
            stagnant = 0;
            last_count = count;
        }

        if target.satisfied() {
            break;
        }

        target.advance(attempts).await?;
        attempts += 1;
    }

    let stop = if target.satisfied() {
        StopReason::TargetReached
    } else {
        StopReason::AttemptsExhausted
    };
    Ok(PollReport { stop, attempts })
}
