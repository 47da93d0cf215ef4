//! Environment-backed configuration.
//!
//! Every input is optional at load time; each handler validates only the
//! inputs it actually needs, so a chat-only deployment never has to
//! configure email addresses and vice versa.

use aws::WebhookSecretConfig;
use handlers::EmailRoute;
use relay::identifiers::{BuildspecPath, ChannelName, EmailAddress, ProjectName, Region};
use relay::RelayError;

/// Default CodeBuild project for pull-request verification and triggers.
pub const PROJECT_NAME_VAR: &str = "HERALD_PROJECT_NAME";
/// Default buildspec override for triggered builds.
pub const BUILDSPEC_VAR: &str = "HERALD_BUILDSPEC";
/// Sending address for build email.
pub const SOURCE_EMAIL_VAR: &str = "HERALD_SOURCE_EMAIL";
/// Recipient address for build email.
pub const DEST_EMAIL_VAR: &str = "HERALD_DEST_EMAIL";
/// Base64 KMS ciphertext of the chat webhook URL (scheme stripped).
pub const ENCRYPTED_WEBHOOK_VAR: &str = "HERALD_ENCRYPTED_WEBHOOK_URL";
/// SSM parameter name holding the chat webhook URL.
pub const WEBHOOK_PARAMETER_VAR: &str = "HERALD_WEBHOOK_URL_PARAMETER";
/// Chat channel override for webhook posts.
pub const CHAT_CHANNEL_VAR: &str = "HERALD_CHAT_CHANNEL";
/// Region override for SDK clients; `AWS_REGION` is the fallback.
pub const REGION_VAR: &str = "HERALD_REGION";

/// Everything the handlers can be configured with.
#[derive(Debug, Clone)]
pub struct Config {
    /// Region for SDK clients; `None` defers to the SDK's provider chain.
    pub region: Option<Region>,
    /// Default project for verification builds and triggers.
    pub default_project: Option<ProjectName>,
    /// Default buildspec override for triggers.
    pub default_buildspec: Option<BuildspecPath>,
    /// Sending address for build email.
    pub source_email: Option<EmailAddress>,
    /// Recipient address for build email.
    pub destination_email: Option<EmailAddress>,
    /// Chat channel override.
    pub chat_channel: Option<ChannelName>,
    /// Where the chat webhook URL secret lives, if anywhere.
    pub webhook_secret: Option<WebhookSecretConfig>,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from an arbitrary lookup. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            region: non_empty(REGION_VAR)
                .or_else(|| non_empty("AWS_REGION"))
                .and_then(|value| Region::new(value)),
            default_project: non_empty(PROJECT_NAME_VAR).and_then(|value| ProjectName::new(value)),
            default_buildspec: non_empty(BUILDSPEC_VAR).and_then(|value| BuildspecPath::new(value)),
            source_email: non_empty(SOURCE_EMAIL_VAR).and_then(|value| EmailAddress::new(value)),
            destination_email: non_empty(DEST_EMAIL_VAR).and_then(|value| EmailAddress::new(value)),
            chat_channel: non_empty(CHAT_CHANNEL_VAR).and_then(|value| ChannelName::new(value)),
            webhook_secret: WebhookSecretConfig::from_parts(
                non_empty(ENCRYPTED_WEBHOOK_VAR),
                non_empty(WEBHOOK_PARAMETER_VAR),
            ),
        }
    }

    /// The email route, required by the email handler.
    pub fn email_route(&self) -> Result<EmailRoute, RelayError> {
        match (&self.source_email, &self.destination_email) {
            (Some(source), Some(destination)) => Ok(EmailRoute {
                source: source.clone(),
                destination: destination.clone(),
            }),
            _ => Err(RelayError::configuration(format!(
                "email notifications need both {SOURCE_EMAIL_VAR} and {DEST_EMAIL_VAR}"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
