//! CloudWatch Logs implementation of the [`LogTailSource`] port.

use async_trait::async_trait;
use aws_config::SdkConfig;
use relay::errors::EnrichmentError;
use relay::ports::LogTailSource;
use relay::types::LogLocation;

/// Fetches log tails from CloudWatch Logs.
#[derive(Debug, Clone)]
pub struct CloudWatchLogTail {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogTail {
    /// Creates a tail source from the shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatchlogs::Client::new(config),
        }
    }
}

#[async_trait]
impl LogTailSource for CloudWatchLogTail {
    async fn tail(
        &self,
        location: &LogLocation,
        limit: usize,
    ) -> Result<Vec<String>, EnrichmentError> {
        // start_from_head(false) reads from the end of the stream: the most
        // recent `limit` events, returned oldest first.
        let output = self
            .client
            .get_log_events()
            .log_group_name(location.group.as_str())
            .log_stream_name(location.stream.as_str())
            .limit(limit as i32)
            .start_from_head(false)
            .send()
            .await
            .map_err(|error| EnrichmentError::Fetch {
                message: error.to_string(),
            })?;

        Ok(output
            .events()
            .iter()
            .filter_map(|event| event.message().map(str::to_string))
            .collect())
    }
}
