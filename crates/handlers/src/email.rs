//! Build state changes → notification email.

use relay::enrich::enrich;
use relay::events::BuildEvent;
use relay::identifiers::EmailAddress;
use relay::ports::{LogTailSource, Mailer, OutboundEmail};
use relay::types::MarkupFlavor;
use relay::{format, RelayError};

use crate::Outcome;

/// Where notification email comes from and goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailRoute {
    /// The sending address.
    pub source: EmailAddress,
    /// The recipient address.
    pub destination: EmailAddress,
}

/// Emails a build's outcome, with the log tail attached for failures.
///
/// In-progress builds are acknowledged and dropped: email is for completed
/// builds only.
pub async fn notify_email<M, L>(
    event: &BuildEvent,
    route: &EmailRoute,
    mailer: &M,
    logs: &L,
) -> Result<Outcome, RelayError>
where
    M: Mailer + ?Sized,
    L: LogTailSource + ?Sized,
{
    if event.status().is_in_progress() {
        return Ok(Outcome::dropped("not a completed build"));
    }

    let mut message = format::build_message(event, MarkupFlavor::Html);
    enrich(&mut message, event, logs).await;

    let email = OutboundEmail {
        source: route.source.clone(),
        to: vec![route.destination.clone()],
        subject: message.subject.clone().unwrap_or_default(),
        text_body: message.plain.clone(),
        html_body: message.markup.clone(),
    };
    mailer.send(&email).await?;
    tracing::info!(project = %event.project_name(), status = %event.status(), "build email sent");
    Ok(Outcome::Delivered)
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
