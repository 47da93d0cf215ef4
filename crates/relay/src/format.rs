//! Status-to-text message construction.
//!
//! Everything here is a pure function of the event: same status, project,
//! build id, and region always produce the same text. The log tail is the
//! only later addition, and it goes through
//! [`NotificationMessage::append_log_tail`].

use crate::events::BuildEvent;
use crate::types::{BuildStatus, MarkupFlavor, NotificationMessage};

/// The console page showing one build, linked from every notification.
///
/// The build id goes through full percent-encoding: build ids contain `:`
/// (and ARNs `/`), both of which are reserved in the fragment path the
/// console routes on.
pub fn console_deep_link(event: &BuildEvent) -> String {
    let region = event.region();
    let encoded = urlencoding::encode(event.build_arn().build_id());
    format!(
        "https://{region}.console.aws.amazon.com/codebuild/home?region={region}#/builds/{encoded}/view/new"
    )
}

/// The single-line chat text for a build state change.
///
/// Chat is the one sink that interpolates the literal status string rather
/// than the bucketed phrase, so unknown statuses read exactly as the build
/// system reported them.
pub fn chat_text(event: &BuildEvent) -> String {
    format!(
        "Build {uuid} for project {project} has reached {status} status. \
         Visit the <{link}|AWS console> to view details.",
        uuid = event.build_arn().build_uuid(),
        project = event.project_name(),
        status = event.status(),
        link = console_deep_link(event),
    )
}

/// Builds the notification for the email and pull-request sinks.
///
/// The status phrase table is the catch-all kind: every status outside the
/// four recognised classes gets the "failed." phrasing, which is also where
/// unmapped future statuses land.
pub fn build_message(event: &BuildEvent, flavor: MarkupFlavor) -> NotificationMessage {
    let phrases = phrases_for(event.status());
    let lead = format!(
        "Build {uuid} for project {project} ",
        uuid = event.build_arn().build_uuid(),
        project = event.project_name(),
    );
    let link = console_deep_link(event);

    let subject = format!(
        "Nightly {project} build {verb}",
        project = event.project_name(),
        verb = phrases.subject_verb,
    );
    let plain = format!(
        "{lead}{phrase} Visit the AWS CodeBuild console to view the build details: {link}",
        phrase = phrases.plain,
    );
    let markup = match flavor {
        MarkupFlavor::Html => format!(
            "{lead}{phrase} Visit the <a href=\"{link}\">AWS CodeBuild console</a> to view the build details.",
            phrase = phrases.html,
        ),
        MarkupFlavor::Markdown => format!(
            "{lead}{phrase} Visit the [AWS CodeBuild console]({link}) to view the build details.",
            phrase = phrases.markdown,
        ),
    };

    NotificationMessage::new(Some(subject), plain, markup, flavor)
}

struct StatusPhrases {
    subject_verb: &'static str,
    plain: &'static str,
    html: &'static str,
    markdown: &'static str,
}

fn phrases_for(status: &BuildStatus) -> StatusPhrases {
    match status {
        BuildStatus::InProgress => StatusPhrases {
            subject_verb: "is in progress",
            plain: "is in progress.",
            html: "is <b>in progress</b>.",
            markdown: "is **in progress**.",
        },
        BuildStatus::Succeeded => StatusPhrases {
            subject_verb: "succeeded",
            plain: "succeeded!",
            html: "<b>succeeded!</b>",
            markdown: "**succeeded!**",
        },
        BuildStatus::Stopped => StatusPhrases {
            subject_verb: "was canceled",
            plain: "was canceled.",
            html: "was <b>canceled</b>.",
            markdown: "was **canceled**.",
        },
        BuildStatus::TimedOut => StatusPhrases {
            subject_verb: "timed out",
            plain: "timed out.",
            html: "<b>timed out</b>.",
            markdown: "**timed out**.",
        },
        BuildStatus::Failed(_) => StatusPhrases {
            subject_verb: "failed",
            plain: "failed.",
            html: "<b>failed</b>.",
            markdown: "**failed**.",
        },
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
