//! Shared value types for the notification domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (a build status is one of a closed set of
//! classes, a notification message owns both body variants) and participate in
//! domain computations.

use serde::{Deserialize, Serialize};

use crate::identifiers::{CommitId, LogGroupName, LogStreamName, PullRequestId};

// ---------------------------------------------------------------------------
// Build status
// ---------------------------------------------------------------------------

/// The bucketed outcome of a build, parsed from `detail."build-status"`.
///
/// Any status string outside the four recognised values lands in
/// [`BuildStatus::Failed`] — the same bucket that handles statuses a future
/// build-system version might add. The raw string is preserved so that
/// sinks which interpolate the literal status (the chat sink) still show
/// exactly what the build system reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    /// The build is still running.
    InProgress,
    /// The build completed successfully.
    Succeeded,
    /// The build was canceled before completion.
    Stopped,
    /// The build exceeded its time limit.
    TimedOut,
    /// The build failed, or reported a status this version does not know.
    /// Carries the raw status string for display.
    Failed(String),
}

impl BuildStatus {
    /// `true` for the failure-class statuses that should carry a log tail.
    pub fn wants_log_tail(&self) -> bool {
        matches!(self, BuildStatus::TimedOut | BuildStatus::Failed(_))
    }

    /// `true` while the build has not yet completed.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress)
    }
}

impl From<String> for BuildStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "IN_PROGRESS" => BuildStatus::InProgress,
            "SUCCEEDED" => BuildStatus::Succeeded,
            "STOPPED" => BuildStatus::Stopped,
            "TIMED_OUT" => BuildStatus::TimedOut,
            _ => BuildStatus::Failed(raw),
        }
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::InProgress => write!(f, "IN_PROGRESS"),
            BuildStatus::Succeeded => write!(f, "SUCCEEDED"),
            BuildStatus::Stopped => write!(f, "STOPPED"),
            BuildStatus::TimedOut => write!(f, "TIMED_OUT"),
            BuildStatus::Failed(raw) => write!(f, "{raw}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Notification message
// ---------------------------------------------------------------------------

/// The markup dialect a sink renders.
///
/// Selects both the status emphasis (`<b>` vs `**`) and the log-block syntax
/// (`<pre>` vs a fenced code block) of a [`NotificationMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupFlavor {
    /// HTML, for the email sink.
    Html,
    /// Markdown, for the pull-request comment sink.
    Markdown,
}

/// A notification ready for delivery: an optional subject plus a plain-text
/// body and a markup body in the flavor the target sink renders.
///
/// Constructed fresh per event by [`crate::format::build_message`]; the only
/// permitted mutation is appending a log tail via
/// [`NotificationMessage::append_log_tail`] before delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    /// Subject line; used by the email sink, ignored elsewhere.
    pub subject: Option<String>,
    /// Plain-text body variant.
    pub plain: String,
    /// Markup body variant, in [`Self::flavor`]'s dialect.
    pub markup: String,
    flavor: MarkupFlavor,
}

impl NotificationMessage {
    /// Creates a message with both body variants populated.
    pub fn new(
        subject: Option<String>,
        plain: String,
        markup: String,
        flavor: MarkupFlavor,
    ) -> Self {
        Self {
            subject,
            plain,
            markup,
            flavor,
        }
    }

    /// The markup dialect of [`Self::markup`].
    pub fn flavor(&self) -> MarkupFlavor {
        self.flavor
    }

    /// Appends a block of build-log output to both body variants, using the
    /// preformatted-block syntax of the message's flavor.
    pub fn append_log_tail(&mut self, log_lines: &str) {
        match self.flavor {
            MarkupFlavor::Html => {
                self.markup
                    .push_str(&format!("<br/><br/>Logs:<br/><br/><pre>{log_lines}</pre><br/>"));
            }
            MarkupFlavor::Markdown => {
                self.markup.push_str(&format!("\n```\n{log_lines}\n```\n"));
            }
        }
        self.plain.push_str(&format!("\n\nLogs:\n\n{log_lines}\n\n"));
    }
}

// ---------------------------------------------------------------------------
// Event-derived locations and contexts
// ---------------------------------------------------------------------------

/// Where a build's log output lives, when the event names both halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLocation {
    /// The CloudWatch Logs log group.
    pub group: LogGroupName,
    /// The log stream within the group.
    pub stream: LogStreamName,
}

/// The pull request a build was started for, recovered from the
/// `CODECOMMIT_PULL_REQUEST_*` environment variables the trigger handler
/// injected into the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    /// The pull request the build belongs to.
    pub pull_request_id: PullRequestId,
    /// The commit the build checked out.
    pub source_commit: CommitId,
    /// The commit the pull request targets.
    pub destination_commit: CommitId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_lands_in_failed_bucket_with_raw_string() {
        let status = BuildStatus::from("FAULT".to_string());
        assert_eq!(status, BuildStatus::Failed("FAULT".to_string()));
        assert_eq!(status.to_string(), "FAULT");
        assert!(status.wants_log_tail());
    }

    #[test]
    fn recognised_statuses_parse_to_their_variants() {
        assert_eq!(
            BuildStatus::from("IN_PROGRESS".to_string()),
            BuildStatus::InProgress
        );
        assert_eq!(
            BuildStatus::from("SUCCEEDED".to_string()),
            BuildStatus::Succeeded
        );
        assert_eq!(BuildStatus::from("STOPPED".to_string()), BuildStatus::Stopped);
        assert_eq!(
            BuildStatus::from("TIMED_OUT".to_string()),
            BuildStatus::TimedOut
        );
    }

    #[test]
    fn only_failure_class_statuses_want_log_tails() {
        assert!(!BuildStatus::InProgress.wants_log_tail());
        assert!(!BuildStatus::Succeeded.wants_log_tail());
        assert!(!BuildStatus::Stopped.wants_log_tail());
        assert!(BuildStatus::TimedOut.wants_log_tail());
        assert!(BuildStatus::Failed("FAILED".to_string()).wants_log_tail());
    }

    #[test]
    fn log_tail_appends_flavor_appropriate_blocks() {
        let mut html = NotificationMessage::new(
            None,
            "body".to_string(),
            "body".to_string(),
            MarkupFlavor::Html,
        );
        html.append_log_tail("line one\nline two\n");
        assert!(html.markup.contains("<pre>line one\nline two\n</pre>"));
        assert!(html.plain.contains("\n\nLogs:\n\nline one\nline two\n\n\n"));

        let mut markdown = NotificationMessage::new(
            None,
            "body".to_string(),
            "body".to_string(),
            MarkupFlavor::Markdown,
        );
        markdown.append_log_tail("line one\n");
        assert!(markdown.markup.contains("\n```\nline one\n\n```\n"));
    }
}
