//! CodeCommit implementation of the [`PullRequestCommenter`] port.

use async_trait::async_trait;
use aws_config::SdkConfig;
use relay::errors::DeliveryError;
use relay::ports::{PullRequestComment, PullRequestCommenter};

/// Posts pull-request comments through CodeCommit.
///
/// The client request token travels as-is; CodeCommit's idempotency handling
/// collapses retried posts with the same token into one comment.
#[derive(Debug, Clone)]
pub struct CodeCommitCommenter {
    client: aws_sdk_codecommit::Client,
}

impl CodeCommitCommenter {
    /// Creates a commenter from the shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_codecommit::Client::new(config),
        }
    }
}

#[async_trait]
impl PullRequestCommenter for CodeCommitCommenter {
    async fn post_comment(&self, comment: &PullRequestComment) -> Result<(), DeliveryError> {
        self.client
            .post_comment_for_pull_request()
            .repository_name(comment.repository.as_str())
            .pull_request_id(comment.pull_request_id.as_str())
            .before_commit_id(comment.before_commit_id.as_str())
            .after_commit_id(comment.after_commit_id.as_str())
            .content(comment.content.clone())
            .client_request_token(comment.client_request_token.clone())
            .send()
            .await
            .map_err(|error| DeliveryError::Api {
                sink: "codecommit".to_string(),
                message: error.to_string(),
            })?;
        Ok(())
    }
}
