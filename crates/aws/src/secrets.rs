//! Webhook-URL resolution via KMS or SSM, cached per process.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kms::primitives::Blob;
use base64::Engine as _;
use relay::errors::SecretError;
use relay::identifiers::WebhookUrl;
use relay::ports::WebhookUrlSource;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Where the webhook URL secret lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookSecretConfig {
    /// A base64 KMS ciphertext whose plaintext is the webhook host and path
    /// (without the scheme).
    EncryptedUrl {
        /// The base64-encoded ciphertext blob.
        ciphertext_base64: String,
    },
    /// The name of an SSM parameter holding the full webhook URL.
    Parameter {
        /// The parameter name.
        name: String,
    },
}

impl WebhookSecretConfig {
    /// Picks the configured source, preferring the encrypted blob when both
    /// are set. `None` when neither is configured.
    pub fn from_parts(
        ciphertext_base64: Option<String>,
        parameter_name: Option<String>,
    ) -> Option<Self> {
        if let Some(ciphertext_base64) = ciphertext_base64 {
            return Some(WebhookSecretConfig::EncryptedUrl { ciphertext_base64 });
        }
        parameter_name.map(|name| WebhookSecretConfig::Parameter { name })
    }
}

/// Resolves the chat webhook URL once and caches it for the process
/// lifetime.
///
/// Resolution is idempotent, so concurrent first calls racing to populate
/// the cache are harmless; later calls return the cached value with no
/// network traffic.
#[derive(Debug)]
pub struct WebhookUrlResolver {
    kms: aws_sdk_kms::Client,
    ssm: aws_sdk_ssm::Client,
    config: Option<WebhookSecretConfig>,
    resolved: OnceCell<WebhookUrl>,
}

impl WebhookUrlResolver {
    /// Creates a resolver; `config` is `None` when no secret source is
    /// configured, which turns every resolution into
    /// [`SecretError::Unconfigured`].
    pub fn new(sdk: &SdkConfig, config: Option<WebhookSecretConfig>) -> Self {
        Self {
            kms: aws_sdk_kms::Client::new(sdk),
            ssm: aws_sdk_ssm::Client::new(sdk),
            config,
            resolved: OnceCell::new(),
        }
    }

    async fn resolve(&self) -> Result<WebhookUrl, SecretError> {
        match self.config.as_ref().ok_or(SecretError::Unconfigured)? {
            WebhookSecretConfig::EncryptedUrl { ciphertext_base64 } => {
                let ciphertext = base64::engine::general_purpose::STANDARD
                    .decode(ciphertext_base64)
                    .map_err(|error| SecretError::Resolution {
                        message: format!("webhook ciphertext is not valid base64: {error}"),
                    })?;
                let output = self
                    .kms
                    .decrypt()
                    .ciphertext_blob(Blob::new(ciphertext))
                    .send()
                    .await
                    .map_err(|error| SecretError::Resolution {
                        message: format!("KMS decrypt failed: {error}"),
                    })?;
                let plaintext = output.plaintext().ok_or_else(|| SecretError::Resolution {
                    message: "KMS decrypt returned no plaintext".to_string(),
                })?;
                let host = String::from_utf8(plaintext.as_ref().to_vec()).map_err(|error| {
                    SecretError::Resolution {
                        message: format!("decrypted webhook URL is not UTF-8: {error}"),
                    }
                })?;
                // The ciphertext holds the URL without its scheme.
                WebhookUrl::new(format!("https://{}", host.trim())).ok_or_else(|| {
                    SecretError::Resolution {
                        message: "decrypted webhook URL is empty".to_string(),
                    }
                })
            }
            WebhookSecretConfig::Parameter { name } => {
                let output = self
                    .ssm
                    .get_parameter()
                    .name(name.clone())
                    .with_decryption(true)
                    .send()
                    .await
                    .map_err(|error| SecretError::Resolution {
                        message: format!("SSM parameter fetch failed: {error}"),
                    })?;
                let value = output
                    .parameter()
                    .and_then(|parameter| parameter.value())
                    .ok_or_else(|| SecretError::Resolution {
                        message: format!("SSM parameter {name} has no value"),
                    })?;
                WebhookUrl::new(value).ok_or_else(|| SecretError::Resolution {
                    message: format!("SSM parameter {name} is empty"),
                })
            }
        }
    }
}

#[async_trait]
impl WebhookUrlSource for WebhookUrlResolver {
    async fn webhook_url(&self) -> Result<WebhookUrl, SecretError> {
        self.resolved
            .get_or_try_init(|| self.resolve())
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_config::BehaviorVersion;

    fn offline_sdk() -> SdkConfig {
        SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .build()
    }

    #[test]
    fn the_encrypted_blob_wins_over_the_parameter_name() {
        let config = WebhookSecretConfig::from_parts(
            Some("Y2lwaGVydGV4dA==".to_string()),
            Some("/herald/webhook".to_string()),
        );
        assert!(matches!(
            config,
            Some(WebhookSecretConfig::EncryptedUrl { .. })
        ));

        let config = WebhookSecretConfig::from_parts(None, Some("/herald/webhook".to_string()));
        assert_eq!(
            config,
            Some(WebhookSecretConfig::Parameter {
                name: "/herald/webhook".to_string()
            })
        );

        assert_eq!(WebhookSecretConfig::from_parts(None, None), None);
    }

    #[tokio::test]
    async fn an_unconfigured_resolver_fails_without_network() {
        let resolver = WebhookUrlResolver::new(&offline_sdk(), None);
        let error = resolver.webhook_url().await.unwrap_err();
        assert!(matches!(error, SecretError::Unconfigured));
    }
}
