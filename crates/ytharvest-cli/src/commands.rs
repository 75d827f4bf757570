//! One-shot command handlers.

use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use ytharvest_core::AppConfig;
use ytharvest_engine::{
    collect, reply_to_up_to_n, DispatchSettings, Dispatcher, LocatorSet, Page, Request, Response,
};

/// Collect up to `limit` comments and write the export document into `dir`.
///
/// # Errors
///
/// Returns an error if collection aborts or the export cannot be written.
pub(crate) async fn run_extract<P: Page>(
    page: &P,
    locators: &LocatorSet,
    config: &AppConfig,
    limit: usize,
    dir: &Path,
) -> anyhow::Result<()> {
    let result = collect(page, locators, limit, &config.collector).await?;
    println!("{}", result.status_message());

    if result.items.is_empty() {
        return Ok(());
    }
    let path = ytharvest_core::write_export(dir, &result)?;
    println!("exported {} comments to {}", result.items.len(), path.display());
    Ok(())
}

/// Post `message` to up to `limit` threads and print the outcome as JSON.
///
/// # Errors
///
/// Returns an error if the message is blank or the run exceeds the
/// configured timeout.
pub(crate) async fn run_reply<P: Page>(
    page: &P,
    locators: &LocatorSet,
    config: &AppConfig,
    limit: usize,
    message: &str,
) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("reply message must not be empty");
    }

    let run = reply_to_up_to_n(page, locators, &config.reply, limit, message, |progress| {
        tracing::info!(
            current = progress.current,
            total = progress.total,
            skipped = progress.skipped,
            failed = progress.failed,
            checked = progress.checked,
            "reply progress"
        );
    });
    let timeout = Duration::from_secs(config.reply_timeout_secs);
    let outcome = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| anyhow::anyhow!("reply run did not finish within {}s", timeout.as_secs()))?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Print the signed-in channel as JSON.
///
/// # Errors
///
/// Returns an error only if the answer cannot be serialized.
pub(crate) async fn run_channel<P: Page>(
    page: P,
    locators: LocatorSet,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(page, locators, DispatchSettings::from(config), tx);
    let response = dispatcher.handle(Request::GetChannelInfo).await;
    if let Response::ChannelInfo(info) = &response {
        if let Some(error) = &info.error {
            tracing::warn!(%error, "channel lookup incomplete");
        }
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
