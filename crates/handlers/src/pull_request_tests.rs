use std::sync::Mutex;

use async_trait::async_trait;
use relay::errors::{DeliveryError, EnrichmentError};
use relay::events::classify;
use relay::events::EventEnvelope;
use relay::identifiers::ProjectName;
use relay::ports::{LogTailSource, StartedBuild};
use relay::types::LogLocation;
use serde_json::json;

use super::*;

struct RecordingStarter {
    started: Mutex<Vec<StartBuildRequest>>,
}

impl RecordingStarter {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
        }
    }

    fn started(&self) -> Vec<StartBuildRequest> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildStarter for RecordingStarter {
    async fn start_build(
        &self,
        request: &StartBuildRequest,
    ) -> Result<StartedBuild, DeliveryError> {
        self.started.lock().unwrap().push(request.clone());
        Ok(StartedBuild { build_arn: None })
    }
}

struct RecordingCommenter {
    comments: Mutex<Vec<PullRequestComment>>,
}

impl RecordingCommenter {
    fn new() -> Self {
        Self {
            comments: Mutex::new(Vec::new()),
        }
    }

    fn comments(&self) -> Vec<PullRequestComment> {
        self.comments.lock().unwrap().clone()
    }
}

#[async_trait]
impl PullRequestCommenter for RecordingCommenter {
    async fn post_comment(&self, comment: &PullRequestComment) -> Result<(), DeliveryError> {
        self.comments.lock().unwrap().push(comment.clone());
        Ok(())
    }
}

struct EmptyTail;

#[async_trait]
impl LogTailSource for EmptyTail {
    async fn tail(
        &self,
        _location: &LogLocation,
        _limit: usize,
    ) -> Result<Vec<String>, EnrichmentError> {
        Ok(Vec::new())
    }
}

fn pull_request_event(event: &str) -> PullRequestEvent {
    serde_json::from_value(json!({
        "event": event,
        "pullRequestId": "7",
        "sourceCommit": "aaaa1111",
        "destinationCommit": "bbbb2222"
    }))
    .unwrap()
}

fn pr_build_event(status: &str) -> BuildEvent {
    let envelope: EventEnvelope = serde_json::from_value(json!({
        "source": "aws.codebuild",
        "detail-type": "CodeBuild Build State Change",
        "region": "us-west-2",
        "detail": {
            "build-id": "arn:aws:codebuild:us-west-2:123456789012:build/demo:abcd-1234",
            "project-name": "demo",
            "build-status": status,
            "additional-information": {
                "environment": {
                    "environment-variables": [
                        { "name": "CODECOMMIT_PULL_REQUEST_ID", "value": "7", "type": "PLAINTEXT" },
                        { "name": "CODECOMMIT_PULL_REQUEST_SRC_COMMIT", "value": "aaaa1111", "type": "PLAINTEXT" },
                        { "name": "CODECOMMIT_PULL_REQUEST_DST_COMMIT", "value": "bbbb2222", "type": "PLAINTEXT" }
                    ]
                },
                "source": {
                    "location": "https://git-codecommit.us-west-2.amazonaws.com/v1/repos/demo-repo"
                }
            }
        }
    }))
    .unwrap();
    classify(envelope).unwrap().into_build().unwrap()
}

fn plain_build_event() -> BuildEvent {
    let envelope: EventEnvelope = serde_json::from_value(json!({
        "source": "aws.codebuild",
        "detail-type": "CodeBuild Build State Change",
        "region": "us-west-2",
        "detail": {
            "build-id": "arn:aws:codebuild:us-west-2:123456789012:build/demo:abcd-1234",
            "project-name": "demo",
            "build-status": "SUCCEEDED"
        }
    }))
    .unwrap();
    classify(envelope).unwrap().into_build().unwrap()
}

#[tokio::test]
async fn a_created_pull_request_starts_a_build_with_its_coordinates() {
    let starter = RecordingStarter::new();
    let project = ProjectName::new("demo").unwrap();

    let outcome =
        start_pull_request_build(&pull_request_event("pullRequestCreated"), &project, &starter)
            .await
            .unwrap();

    assert_eq!(outcome, Outcome::Delivered);
    let started = starter.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].project_name.as_str(), "demo");
    assert_eq!(
        started[0].source_version.as_ref().unwrap().as_str(),
        "aaaa1111"
    );
    let id_override = started[0]
        .environment_overrides
        .iter()
        .find(|o| o.name == "CODECOMMIT_PULL_REQUEST_ID")
        .expect("pull request id override");
    assert_eq!(id_override.value, "7");
    assert!(started[0]
        .environment_overrides
        .iter()
        .any(|o| o.name == "CODECOMMIT_PULL_REQUEST_SRC_COMMIT" && o.value == "aaaa1111"));
    assert!(started[0]
        .environment_overrides
        .iter()
        .any(|o| o.name == "CODECOMMIT_PULL_REQUEST_DST_COMMIT" && o.value == "bbbb2222"));
}

#[tokio::test]
async fn non_buildable_pull_request_updates_are_dropped() {
    let starter = RecordingStarter::new();
    let project = ProjectName::new("demo").unwrap();

    let outcome = start_pull_request_build(
        &pull_request_event("pullRequestStatusChanged"),
        &project,
        &starter,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, Outcome::Dropped { .. }));
    assert!(starter.started().is_empty());
}

#[tokio::test]
async fn a_pr_build_event_posts_a_comment_with_the_dedup_token() {
    let commenter = RecordingCommenter::new();

    let outcome = comment_build_status(&pr_build_event("SUCCEEDED"), &commenter, &EmptyTail)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Delivered);
    let comments = commenter.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].repository.as_str(), "demo-repo");
    assert_eq!(comments[0].pull_request_id.as_str(), "7");
    assert_eq!(comments[0].before_commit_id.as_str(), "bbbb2222");
    assert_eq!(comments[0].after_commit_id.as_str(), "aaaa1111");
    assert!(comments[0].content.contains("**succeeded!**"));
    assert_eq!(
        comments[0].client_request_token,
        "arn:aws:codebuild:us-west-2:123456789012:build/demo:abcd-1234SUCCEEDED"
    );
}

#[tokio::test]
async fn retried_comments_for_the_same_build_and_status_share_a_token() {
    let commenter = RecordingCommenter::new();
    let event = pr_build_event("FAILED");

    comment_build_status(&event, &commenter, &EmptyTail)
        .await
        .unwrap();
    comment_build_status(&event, &commenter, &EmptyTail)
        .await
        .unwrap();

    let comments = commenter.comments();
    assert_eq!(comments.len(), 2);
    assert_eq!(
        comments[0].client_request_token,
        comments[1].client_request_token
    );
}

#[tokio::test]
async fn builds_without_pull_request_context_are_dropped() {
    let commenter = RecordingCommenter::new();

    let outcome = comment_build_status(&plain_build_event(), &commenter, &EmptyTail)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::dropped("not a pull-request build"));
    assert!(commenter.comments().is_empty());
}

#[tokio::test]
async fn the_combined_flow_routes_each_event_kind() {
    let starter = RecordingStarter::new();
    let commenter = RecordingCommenter::new();
    let project = ProjectName::new("demo").unwrap();

    let envelope: EventEnvelope = serde_json::from_value(json!({
        "source": "aws.codecommit",
        "detail-type": "CodeCommit Pull Request State Change",
        "detail": {
            "event": "pullRequestCreated",
            "pullRequestId": "7",
            "sourceCommit": "aaaa1111",
            "destinationCommit": "bbbb2222"
        }
    }))
    .unwrap();
    let event = classify(envelope).unwrap();

    handle_pull_request(event, Some(&project), &starter, &commenter, &EmptyTail)
        .await
        .unwrap();

    assert_eq!(starter.started().len(), 1);
    assert!(commenter.comments().is_empty());
}

#[tokio::test]
async fn the_build_starting_path_requires_a_configured_project() {
    let starter = RecordingStarter::new();
    let commenter = RecordingCommenter::new();

    let error = handle_pull_request(
        relay::InboundEvent::PullRequest(pull_request_event("pullRequestCreated")),
        None,
        &starter,
        &commenter,
        &EmptyTail,
    )
    .await
    .unwrap_err();

    assert_eq!(error.retry_policy(), relay::RetryPolicy::NonRetryable);
    assert!(starter.started().is_empty());
}
