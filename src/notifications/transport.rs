use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sesv2::config::Region;
use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use tracing::{error, info};

use super::NotificationError;
use crate::common::safe_email_log;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError>;
}

/// AWS SES v2 transport. Credentials come from the default provider chain.
pub struct SesTransport {
    client: SesClient,
    from_email: String,
}

impl SesTransport {
    pub async fn new(from_email: String, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let aws_config = loader.load().await;

        Self {
            client: SesClient::new(&aws_config),
            from_email,
        }
    }
}

#[async_trait]
impl MailTransport for SesTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError> {
        let destination = Destination::builder()
            .to_addresses(mail.to.clone())
            .build();

        let subject_content = Content::builder()
            .data(&mail.subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| NotificationError::Transport(format!("Failed to build subject: {}", e)))?;

        let body_content = Content::builder()
            .data(&mail.html_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| NotificationError::Transport(format!("Failed to build body: {}", e)))?;

        let message = Message::builder()
            .subject(subject_content)
            .body(SesBody::builder().html(body_content).build())
            .build();

        let result = self
            .client
            .send_email()
            .from_email_address(&self.from_email)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %safe_email_log(&mail.to), "Failed to send email via SES");
                NotificationError::Transport(format!("Send failed: {}", e))
            })?;

        info!(
            to = %safe_email_log(&mail.to),
            message_id = ?result.message_id(),
            "Email sent successfully via SES"
        );

        Ok(())
    }
}

/// Writes messages to the log instead of sending them
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotificationError> {
        info!(
            to = %safe_email_log(&mail.to),
            subject = %mail.subject,
            body_len = mail.html_body.len(),
            "Email delivery skipped (log transport)"
        );
        Ok(())
    }
}
