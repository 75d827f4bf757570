//! Posting one fixed reply to up to N comment threads.
//!
//! Threads the operator wrote or has already replied to are skipped. A failure on
//! one thread is recorded and the run moves on to the next candidate.

use chrono::Utc;
use uuid::Uuid;
use ytharvest_core::{Field, ReplyConfig, ReplyOutcome, ReplyProgressEvent};

use crate::error::ReplyFailure;
use crate::locator::LocatorSet;
use crate::pacing::Pacer;
use crate::page::Page;

/// Reply with `message` to candidate threads in document order until
/// `limit` replies have been posted or the candidates run out.
///
/// `on_progress` is called after every processed thread.
pub async fn reply_to_up_to_n<P, F>(
    page: &P,
    locators: &LocatorSet,
    config: &ReplyConfig,
    limit: usize,
    message: &str,
    mut on_progress: F,
) -> ReplyOutcome
where
    P: Page,
    F: FnMut(ReplyProgressEvent),
{
    let mut outcome = ReplyOutcome::new(limit);
    if limit == 0 {
        return finish(outcome);
    }

    let candidates = match locators.nodes(page, Field::Thread, None).await {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::error!(error = %err, "could not list comment threads");
            outcome.errors.push(format!("reply run aborted: {err}"));
            return outcome;
        }
    };
    outcome.requested_total = candidates.len();

    let own_channel = locators.value(page, Field::OwnChannelName, None).await;
    if own_channel.is_none() {
        tracing::warn!("own channel name not found, already-replied threads cannot be skipped");
    }
    let run_id = Uuid::new_v4();
    tracing::info!(
        %run_id,
        limit,
        candidates = candidates.len(),
        own_channel = own_channel.as_deref().unwrap_or_default(),
        "reply run started"
    );

    let pacer = Pacer::new();
    for (idx, thread) in candidates.iter().enumerate() {
        if outcome.successful >= limit {
            break;
        }
        let position = idx + 1;

        if let Some(own) = own_channel.as_deref() {
            if already_replied(page, locators, thread, own).await {
                outcome.skipped += 1;
                tracing::debug!(thread = position, "own thread or already replied, skipping");
                on_progress(outcome.progress());
                continue;
            }
        }

        match post_reply(page, locators, config, &pacer, thread, message).await {
            Ok(()) => {
                outcome.successful += 1;
                tracing::info!(
                    thread = position,
                    successful = outcome.successful,
                    limit,
                    "reply posted"
                );
                on_progress(outcome.progress());
                if outcome.successful < limit {
                    pacer.pace(config.inter_reply_delay).await;
                }
            }
            Err(failure) => {
                outcome.failed += 1;
                tracing::warn!(thread = position, error = %failure, "reply failed");
                outcome.errors.push(format!("thread {position}: {failure}"));
                cancel_editor(page, locators, thread).await;
                on_progress(outcome.progress());
                pacer.pause(config.failure_cooldown_ms).await;
            }
        }
    }

    tracing::info!(
        %run_id,
        successful = outcome.successful,
        failed = outcome.failed,
        skipped = outcome.skipped,
        "reply run finished"
    );
    finish(outcome)
}

fn finish(mut outcome: ReplyOutcome) -> ReplyOutcome {
    outcome.completed = true;
    outcome.completed_at = Some(Utc::now());
    outcome
}

/// True when the operator wrote the thread or one of its replies.
async fn already_replied<P: Page>(
    page: &P,
    locators: &LocatorSet,
    thread: &P::Node,
    own_channel: &str,
) -> bool {
    let top_author = locators.value(page, Field::CommentAuthor, Some(thread)).await;
    if top_author.as_deref() == Some(own_channel) {
        return true;
    }
    locators
        .values(page, Field::ReplyAuthor, Some(thread))
        .await
        .iter()
        .any(|author| author == own_channel)
}

async fn post_reply<P: Page>(
    page: &P,
    locators: &LocatorSet,
    config: &ReplyConfig,
    pacer: &Pacer,
    thread: &P::Node,
    message: &str,
) -> Result<(), ReplyFailure> {
    let button = locators
        .element(page, Field::ReplyButton, Some(thread))
        .await
        .ok_or(ReplyFailure::ReplyControlMissing)?;
    page.click(&button)
        .await
        .map_err(|source| ReplyFailure::Page {
            stage: "opening the reply editor",
            source,
        })?;
    pacer.pause(config.open_settle_ms).await;

    let input = locators
        .element(page, Field::ReplyInput, Some(thread))
        .await
        .ok_or(ReplyFailure::InputMissing)?;
    page.fill(&input, message)
        .await
        .map_err(|source| ReplyFailure::Page {
            stage: "entering the reply text",
            source,
        })?;
    pacer.pause(config.compose_settle_ms).await;

    let submit = locators
        .element(page, Field::SubmitButton, Some(thread))
        .await
        .ok_or(ReplyFailure::SubmitMissing)?;
    page.click(&submit)
        .await
        .map_err(|source| ReplyFailure::Page {
            stage: "submitting the reply",
            source,
        })
}

/// Close a half-open editor, if there is one.
async fn cancel_editor<P: Page>(page: &P, locators: &LocatorSet, thread: &P::Node) {
    let Some(cancel) = locators
        .element(page, Field::CancelButton, Some(thread))
        .await
    else {
        return;
    };
    if let Err(err) = page.click(&cancel).await {
        tracing::debug!(error = %err, "cancel click failed");
    }
}

#[cfg(test)]
#[path = "reply_test.rs"]
mod tests;
