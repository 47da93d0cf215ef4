//! Port traits the infrastructure crates implement.
//!
//! The domain defines *what* a sink must do; the `aws` and `chat` crates
//! define *how*. Handlers are generic over these traits, which is also what
//! makes them testable without any network.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::{DeliveryError, EnrichmentError, SecretError};
use crate::identifiers::{
    BuildArn, BuildspecPath, ChannelName, CommitId, EmailAddress, ProjectName, PullRequestId,
    RepositoryName, WebhookUrl,
};
use crate::types::{BuildStatus, LogLocation};

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// The JSON body posted to a chat webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Target channel; omitted from the payload when the webhook's default
    /// channel should apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelName>,
    /// The message text.
    pub text: String,
}

/// How a chat post ended.
///
/// The dispatch rule treats client errors as a final, logged outcome rather
/// than a failure: a malformed request stays malformed on every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatDelivery {
    /// The endpoint accepted the message (status < 400).
    Delivered {
        /// The HTTP status code.
        status: u16,
    },
    /// The endpoint rejected the request (status 400–499); the message is
    /// dropped and must not be retried.
    DroppedClientError {
        /// The HTTP status code.
        status: u16,
    },
}

impl ChatDelivery {
    /// Applies the status-code dispatch rule: < 400 delivered, 400–499
    /// dropped, >= 500 a retryable [`DeliveryError::Server`].
    pub fn from_status(status: u16) -> Result<Self, DeliveryError> {
        if status < 400 {
            Ok(ChatDelivery::Delivered { status })
        } else if status < 500 {
            Ok(ChatDelivery::DroppedClientError { status })
        } else {
            Err(DeliveryError::Server { status })
        }
    }
}

/// Posts a message to the configured chat webhook.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Posts `message` and classifies the endpoint's answer.
    async fn post(&self, message: &ChatMessage) -> Result<ChatDelivery, DeliveryError>;
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// A fully addressed notification email.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    /// The sending address.
    pub source: EmailAddress,
    /// Recipient addresses.
    pub to: Vec<EmailAddress>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
}

/// Sends notification email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one email; failures surface as-is.
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// Pull-request comments
// ---------------------------------------------------------------------------

/// A comment on a pull request, carrying the idempotency token that keeps
/// retries from duplicating it.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestComment {
    /// The repository the pull request lives in.
    pub repository: RepositoryName,
    /// The pull request to comment on.
    pub pull_request_id: PullRequestId,
    /// The destination-branch commit the comment anchors to.
    pub before_commit_id: CommitId,
    /// The source-branch commit the comment anchors to.
    pub after_commit_id: CommitId,
    /// The comment body (markdown).
    pub content: String,
    /// Client-supplied deduplication token; see
    /// [`PullRequestComment::dedup_token`].
    pub client_request_token: String,
}

impl PullRequestComment {
    /// The deduplication token for a build/status pair.
    ///
    /// The token is the concatenation of the build ARN and the status
    /// string, so a retried invocation posts at most one comment per
    /// build+status.
    pub fn dedup_token(build_arn: &BuildArn, status: &BuildStatus) -> String {
        format!("{build_arn}{status}")
    }
}

/// Posts comments on pull requests.
#[async_trait]
pub trait PullRequestCommenter: Send + Sync {
    /// Posts one comment, idempotently per `client_request_token`.
    async fn post_comment(&self, comment: &PullRequestComment) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// Build trigger
// ---------------------------------------------------------------------------

/// Everything needed to start one build.
#[derive(Debug, Clone, PartialEq)]
pub struct StartBuildRequest {
    /// The project to build.
    pub project_name: ProjectName,
    /// The commit to check out; `None` builds the project's default branch.
    pub source_version: Option<CommitId>,
    /// Buildspec override; `None` runs the project's own buildspec.
    pub buildspec_override: Option<BuildspecPath>,
    /// Plaintext environment variables injected into the build.
    pub environment_overrides: Vec<EnvironmentOverride>,
}

/// One plaintext environment variable override on a build start.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentOverride {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
}

/// The build the trigger started.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedBuild {
    /// ARN of the new build, when the build system reported one.
    pub build_arn: Option<BuildArn>,
}

/// Starts builds.
#[async_trait]
pub trait BuildStarter: Send + Sync {
    /// Starts one build.
    async fn start_build(&self, request: &StartBuildRequest)
        -> Result<StartedBuild, DeliveryError>;
}

// ---------------------------------------------------------------------------
// Logs and secrets
// ---------------------------------------------------------------------------

/// Fetches the tail of a build's log stream.
#[async_trait]
pub trait LogTailSource: Send + Sync {
    /// Returns up to `limit` of the most recent log messages, oldest first.
    async fn tail(
        &self,
        location: &LogLocation,
        limit: usize,
    ) -> Result<Vec<String>, EnrichmentError>;
}

/// Resolves the chat webhook URL.
///
/// Implementations cache the resolved value for the process lifetime;
/// resolution is idempotent, so a race to populate the cache is harmless.
#[async_trait]
pub trait WebhookUrlSource: Send + Sync {
    /// Returns the resolved webhook URL.
    async fn webhook_url(&self) -> Result<WebhookUrl, SecretError>;
}
