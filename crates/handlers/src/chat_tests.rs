use std::sync::Mutex;

use async_trait::async_trait;
use relay::errors::DeliveryError;
use relay::events::{classify, EventEnvelope};
use relay::identifiers::ChannelName;
use serde_json::json;

use super::*;

struct ScriptedChat {
    posted: Mutex<Vec<ChatMessage>>,
    response: Result<ChatDelivery, DeliveryError>,
}

impl ScriptedChat {
    fn answering(response: Result<ChatDelivery, DeliveryError>) -> Self {
        Self {
            posted: Mutex::new(Vec::new()),
            response,
        }
    }

    fn posted(&self) -> Vec<ChatMessage> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSink for ScriptedChat {
    async fn post(&self, message: &ChatMessage) -> Result<ChatDelivery, DeliveryError> {
        self.posted.lock().unwrap().push(message.clone());
        self.response.clone()
    }
}

fn succeeded_event() -> BuildEvent {
    let envelope: EventEnvelope = serde_json::from_value(json!({
        "source": "aws.codebuild",
        "detail-type": "CodeBuild Build State Change",
        "region": "us-west-2",
        "detail": {
            "build-id": "arn:aws:codebuild:us-west-2:123456789012:build/proj:abcd-1234",
            "project-name": "demo",
            "build-status": "SUCCEEDED"
        }
    }))
    .unwrap();
    classify(envelope).unwrap().into_build().unwrap()
}

#[tokio::test]
async fn a_delivered_post_carries_the_formatted_text_and_channel() {
    let sink = ScriptedChat::answering(Ok(ChatDelivery::Delivered { status: 200 }));
    let channel = ChannelName::new("#builds").unwrap();

    let outcome = notify_chat(&succeeded_event(), Some(&channel), &sink)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Delivered);
    let posted = sink.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].channel.as_ref().unwrap().as_str(), "#builds");
    assert_eq!(
        posted[0].text,
        "Build abcd-1234 for project demo has reached SUCCEEDED status. \
         Visit the <https://us-west-2.console.aws.amazon.com/codebuild/home?region=us-west-2\
         #/builds/proj%3Aabcd-1234/view/new|AWS console> to view details."
    );
}

#[tokio::test]
async fn a_client_error_is_acked_and_dropped() {
    let sink = ScriptedChat::answering(Ok(ChatDelivery::DroppedClientError { status: 404 }));

    let outcome = notify_chat(&succeeded_event(), None, &sink).await.unwrap();

    assert!(matches!(outcome, Outcome::Dropped { .. }));
    assert!(sink.posted()[0].channel.is_none());
}

#[tokio::test]
async fn a_server_error_propagates_for_retry() {
    let sink = ScriptedChat::answering(Err(DeliveryError::Server { status: 503 }));

    let error = notify_chat(&succeeded_event(), None, &sink).await.unwrap_err();

    assert_eq!(
        error.retry_policy(),
        relay::RetryPolicy::Retryable { after: None }
    );
}
