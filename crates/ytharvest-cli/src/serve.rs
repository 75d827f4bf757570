//! JSON-lines bridge between stdin/stdout and the dispatcher.
//!
//! Each input line is one request; each answer is written as one line.
//! Progress notifications are interleaved on stdout as they arrive, and a
//! request's notifications are always written before its answer.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use ytharvest_core::AppConfig;
use ytharvest_engine::{DispatchSettings, Dispatcher, LocatorSet, Notification, Page, Response};

/// Serve requests until stdin closes.
///
/// # Errors
///
/// Returns an error if stdin cannot be read or stdout cannot be written.
pub(crate) async fn run_serve<P: Page>(
    page: P,
    locators: LocatorSet,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let (tx, notifications) = mpsc::unbounded_channel::<Notification>();
    let (responses_tx, responses) = mpsc::unbounded_channel::<Response>();
    let dispatcher = Dispatcher::new(page, locators, DispatchSettings::from(config), tx);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        write_lines(&mut stdout, notifications, responses).await
    });

    tracing::info!("serving requests on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = dispatcher.handle_json(line).await;
        if responses_tx.send(response).is_err() {
            tracing::warn!("output closed, no longer reading requests");
            break;
        }
    }

    drop(dispatcher);
    drop(responses_tx);
    match writer.await {
        Ok(result) => result?,
        Err(err) => tracing::warn!(error = %err, "output writer ended abnormally"),
    }
    tracing::info!("stdin closed, shutting down");
    Ok(())
}

/// Sole writer of the output stream.
///
/// Queued notifications are drained before the next response, so progress
/// sent during a request never lands after that request's answer. Returns
/// once the response channel closes.
async fn write_lines<W>(
    out: &mut W,
    mut notifications: UnboundedReceiver<Notification>,
    mut responses: UnboundedReceiver<Response>,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut notifications_open = true;
    loop {
        let line = tokio::select! {
            biased;
            notification = notifications.recv(), if notifications_open => {
                let Some(notification) = notification else {
                    notifications_open = false;
                    continue;
                };
                match serde_json::to_string(&notification) {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(error = %err, "dropping unserializable notification");
                        continue;
                    }
                }
            }
            response = responses.recv() => {
                let Some(response) = response else {
                    break;
                };
                serde_json::to_string(&response)?
            }
        };
        out.write_all(line.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }
    Ok(())
}
