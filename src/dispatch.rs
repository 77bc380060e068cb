//! Outcome dispatch: map each classified outcome to its thread side effect
//!
//! Exactly one branch per [`ChatResult`] tag, checked exhaustively. No state
//! is retained between dispatches; each [`ChatData`] is handled on its own.

use anyhow::Result;
use tracing::info;

use crate::chat::{ChatData, ChatResult};
use crate::delivery::{split_into_chunks, ChatThread, Notice};
use crate::moderation::ModerationAlerts;

/// Perform the single observable action set for one classified outcome.
///
/// - `Ok`/`ModerationFlagged` with a reply: send it in chunks; flagged
///   outcomes also raise an alert and a warning banner.
/// - `Ok` with an empty reply: warning banner instead of a chat message.
/// - `ModerationBlocked`: the reply is never sent; alert plus error banner.
/// - `TooLong`: close the thread, deliver nothing.
/// - `InvalidRequest`/`OtherError`: warning banner carrying the status text.
pub async fn process_response(
    user: &str,
    thread: &dyn ChatThread,
    alerts: &dyn ModerationAlerts,
    data: ChatData,
) -> Result<()> {
    match data.status {
        ChatResult::Ok | ChatResult::ModerationFlagged => {
            let mut sent_url = None;
            match data.reply_text.as_deref().filter(|r| !r.is_empty()) {
                Some(reply) => {
                    for chunk in split_into_chunks(reply) {
                        sent_url = thread.send(&chunk).await?;
                    }
                }
                None => {
                    thread
                        .notify(Notice::warning("Invalid response - empty response"))
                        .await?;
                }
            }
            if data.status == ChatResult::ModerationFlagged {
                alerts
                    .flagged(
                        user,
                        data.status_text.as_deref().unwrap_or_default(),
                        data.reply_text.as_deref().unwrap_or_default(),
                        sent_url.as_deref(),
                    )
                    .await?;
                thread
                    .notify(Notice::warning(
                        "This conversation has been flagged by moderation.",
                    ))
                    .await?;
            }
        }
        ChatResult::ModerationBlocked => {
            alerts
                .blocked(
                    user,
                    data.status_text.as_deref().unwrap_or_default(),
                    data.reply_text.as_deref().unwrap_or_default(),
                )
                .await?;
            thread
                .notify(Notice::error(
                    "The response has been blocked by moderation.",
                ))
                .await?;
        }
        ChatResult::TooLong => {
            info!("conversation exceeded the model context; closing thread");
            thread.close().await?;
        }
        ChatResult::InvalidRequest => {
            thread
                .notify(Notice::warning(format!(
                    "Invalid request - {}",
                    data.status_text.as_deref().unwrap_or_default()
                )))
                .await?;
        }
        ChatResult::OtherError => {
            thread
                .notify(Notice::warning(format!(
                    "Error - {}",
                    data.status_text.as_deref().unwrap_or_default()
                )))
                .await?;
        }
    }
    Ok(())
}
