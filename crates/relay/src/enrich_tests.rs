use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::errors::EnrichmentError;
use crate::events::{classify, EventEnvelope};
use crate::format;
use crate::types::{LogLocation, MarkupFlavor};

/// Counts fetches and answers with a fixed script.
struct ScriptedTail {
    calls: AtomicUsize,
    response: Result<Vec<String>, EnrichmentError>,
}

impl ScriptedTail {
    fn succeeding(lines: &[&str]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Ok(lines.iter().map(|l| l.to_string()).collect()),
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Err(EnrichmentError::Fetch {
                message: "stream does not exist".to_string(),
            }),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogTailSource for ScriptedTail {
    async fn tail(
        &self,
        _location: &LogLocation,
        limit: usize,
    ) -> Result<Vec<String>, EnrichmentError> {
        assert_eq!(limit, LOG_TAIL_LIMIT);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

fn build_event(status: &str, with_logs: bool) -> BuildEvent {
    let logs = if with_logs {
        json!({ "group-name": "/aws/codebuild/demo", "stream-name": "abcd-1234" })
    } else {
        json!({})
    };
    let envelope: EventEnvelope = serde_json::from_value(json!({
        "source": "aws.codebuild",
        "detail-type": "CodeBuild Build State Change",
        "region": "us-west-2",
        "detail": {
            "build-id": "arn:aws:codebuild:us-west-2:123456789012:build/demo:abcd-1234",
            "project-name": "demo",
            "build-status": status,
            "additional-information": { "logs": logs }
        }
    }))
    .unwrap();
    classify(envelope).unwrap().into_build().unwrap()
}

#[tokio::test]
async fn enrichment_is_skipped_for_non_failure_statuses() {
    for status in ["IN_PROGRESS", "SUCCEEDED", "STOPPED"] {
        let event = build_event(status, true);
        let tail = ScriptedTail::succeeding(&["line\n"]);
        let mut message = format::build_message(&event, MarkupFlavor::Html);
        enrich(&mut message, &event, &tail).await;
        assert_eq!(tail.calls(), 0, "status {status} must not fetch logs");
    }
}

#[tokio::test]
async fn enrichment_is_attempted_for_failure_statuses() {
    for status in ["TIMED_OUT", "FAILED", "FAULT"] {
        let event = build_event(status, true);
        let tail = ScriptedTail::succeeding(&["first\n", "second\n"]);
        let mut message = format::build_message(&event, MarkupFlavor::Markdown);
        enrich(&mut message, &event, &tail).await;
        assert_eq!(tail.calls(), 1);
        assert!(message.markup.contains("```\nfirst\nsecond\n\n```"));
    }
}

#[tokio::test]
async fn a_missing_log_location_skips_the_fetch() {
    let event = build_event("FAILED", false);
    let tail = ScriptedTail::succeeding(&["line\n"]);
    let mut message = format::build_message(&event, MarkupFlavor::Html);
    enrich(&mut message, &event, &tail).await;
    assert_eq!(tail.calls(), 0);
}

#[tokio::test]
async fn a_failed_fetch_leaves_the_message_unchanged() {
    let event = build_event("FAILED", true);
    let tail = ScriptedTail::failing();
    let mut message = format::build_message(&event, MarkupFlavor::Html);
    let before = message.clone();
    enrich(&mut message, &event, &tail).await;
    assert_eq!(tail.calls(), 1);
    assert_eq!(message, before);
}

#[tokio::test]
async fn log_lines_are_concatenated_in_returned_order() {
    let event = build_event("TIMED_OUT", true);
    let tail = ScriptedTail::succeeding(&["a\n", "b\n", "c\n"]);
    let mut message = format::build_message(&event, MarkupFlavor::Html);
    enrich(&mut message, &event, &tail).await;
    assert!(message.markup.contains("<pre>a\nb\nc\n</pre>"));
    assert!(message.plain.contains("Logs:\n\na\nb\nc\n"));
}
