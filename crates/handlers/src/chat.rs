//! Build state changes → chat webhook.

use relay::events::BuildEvent;
use relay::identifiers::ChannelName;
use relay::ports::{ChatDelivery, ChatMessage, ChatSink};
use relay::{format, RelayError};

use crate::Outcome;

/// Posts a build's status line to the chat webhook.
///
/// No log enrichment here: the chat line links to the console instead of
/// inlining logs. A client-error answer from the endpoint is final — the
/// flow logs it and acks the event rather than asking the host to retry a
/// request that cannot get better.
pub async fn notify_chat<S: ChatSink + ?Sized>(
    event: &BuildEvent,
    channel: Option<&ChannelName>,
    sink: &S,
) -> Result<Outcome, RelayError> {
    let message = ChatMessage {
        channel: channel.cloned(),
        text: format::chat_text(event),
    };

    match sink.post(&message).await? {
        ChatDelivery::Delivered { status } => {
            tracing::info!(status, "chat message posted");
            Ok(Outcome::Delivered)
        }
        ChatDelivery::DroppedClientError { status } => {
            tracing::error!(
                status,
                "chat endpoint rejected the message; dropping without retry"
            );
            Ok(Outcome::dropped(format!(
                "chat endpoint rejected the message with status {status}"
            )))
        }
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
