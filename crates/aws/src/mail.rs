//! SES implementation of the [`Mailer`] port.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use relay::errors::DeliveryError;
use relay::ports::{Mailer, OutboundEmail};

/// Sends notification email through SES.
#[derive(Debug, Clone)]
pub struct SesMailer {
    client: aws_sdk_sesv2::Client,
}

impl SesMailer {
    /// Creates a mailer from the shared SDK configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sesv2::Client::new(config),
        }
    }
}

fn ses_error(message: impl std::fmt::Display) -> DeliveryError {
    DeliveryError::Api {
        sink: "ses".to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        let subject = Content::builder()
            .data(email.subject.clone())
            .charset("UTF-8")
            .build()
            .map_err(ses_error)?;
        let text = Content::builder()
            .data(email.text_body.clone())
            .charset("UTF-8")
            .build()
            .map_err(ses_error)?;
        let html = Content::builder()
            .data(email.html_body.clone())
            .charset("UTF-8")
            .build()
            .map_err(ses_error)?;
        let body = Body::builder().text(text).html(html).build();
        let message = Message::builder().subject(subject).body(body).build();
        let content = EmailContent::builder().simple(message).build();

        let mut destination = Destination::builder();
        for address in &email.to {
            destination = destination.to_addresses(address.as_str());
        }

        self.client
            .send_email()
            .from_email_address(email.source.as_str())
            .destination(destination.build())
            .content(content)
            .send()
            .await
            .map_err(ses_error)?;
        Ok(())
    }
}
