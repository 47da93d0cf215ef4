//! BuildHerald AWS infrastructure adapter.
//!
//! Implements the sink ports defined in the [`relay`] crate using the
//! official AWS SDK clients:
//!
//! - [`SesMailer`] — [`relay::Mailer`] over SES `SendEmail`.
//! - [`CodeCommitCommenter`] — [`relay::PullRequestCommenter`] over
//!   `PostCommentForPullRequest`.
//! - [`CodeBuildStarter`] — [`relay::BuildStarter`] over `StartBuild`.
//! - [`CloudWatchLogTail`] — [`relay::LogTailSource`] over `GetLogEvents`.
//! - [`WebhookUrlResolver`] — [`relay::WebhookUrlSource`] over KMS decrypt
//!   or SSM parameter retrieval, cached for the process lifetime.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All AWS API
//! details (request building, response unwrapping, error rendering) are
//! handled here; the [`relay`] crate never sees them.

use aws_config::{BehaviorVersion, SdkConfig};
use relay::identifiers::Region;

pub mod builds;
pub mod comments;
pub mod logs;
pub mod mail;
pub mod secrets;

pub use builds::CodeBuildStarter;
pub use comments::CodeCommitCommenter;
pub use logs::CloudWatchLogTail;
pub use mail::SesMailer;
pub use secrets::{WebhookSecretConfig, WebhookUrlResolver};

/// Loads the shared SDK configuration all clients are constructed from.
///
/// With an explicit region the clients pin to it; otherwise the SDK's
/// default provider chain (environment, profile, instance metadata) decides.
pub async fn sdk_config(region: Option<&Region>) -> SdkConfig {
    let loader = aws_config::defaults(BehaviorVersion::latest());
    match region {
        Some(region) => {
            loader
                .region(aws_config::Region::new(region.as_str().to_owned()))
                .load()
                .await
        }
        None => loader.load().await,
    }
}
