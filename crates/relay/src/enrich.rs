//! Best-effort log-tail enrichment.
//!
//! A failure-class notification is more useful with the last lines of the
//! build log attached, but a notification must never be lost because the log
//! fetch failed: enrichment degrades to the unmodified message and only logs
//! the problem locally.

use crate::events::BuildEvent;
use crate::ports::LogTailSource;
use crate::types::NotificationMessage;

/// How many of the most recent log lines a notification carries at most.
pub const LOG_TAIL_LIMIT: usize = 30;

/// Appends the build's log tail to `message` when the status calls for it.
///
/// One predicate for every sink: enrichment runs only for the failure-class
/// statuses (not in-progress, succeeded, or stopped), and only when the
/// event names a complete log location. Fetch failures are logged and
/// swallowed — the caller always proceeds to delivery.
pub async fn enrich<L: LogTailSource + ?Sized>(
    message: &mut NotificationMessage,
    event: &BuildEvent,
    logs: &L,
) {
    if !event.status().wants_log_tail() {
        return;
    }
    let Some(location) = event.log_location() else {
        return;
    };

    match logs.tail(&location, LOG_TAIL_LIMIT).await {
        Ok(lines) => {
            message.append_log_tail(&lines.concat());
        }
        Err(error) => {
            tracing::warn!(
                %error,
                group = %location.group,
                stream = %location.stream,
                "log tail fetch failed; delivering the notification without logs"
            );
        }
    }
}

#[cfg(test)]
#[path = "enrich_tests.rs"]
mod tests;
