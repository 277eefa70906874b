//! # Email Service
//!
//! Outbound email behind the [`EmailService`] trait, used by the daily recap.
//!
//! ## Implementations
//!
//! - [`LogEmailer`] - Development implementation that only logs the email
//! - [`ExternalEmailer`] - Production implementation posting to a transactional email API
//!
//! The implementation is picked from the configuration: `APP_ENV=production`
//! provides [`MailConfig`] and selects [`ExternalEmailer`].

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an HTML email to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::SendFailed`] on network failures or when the
    /// provider rejects the message.
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError>;
}

/// Logs emails instead of sending them.
pub struct LogEmailer;

#[async_trait]
impl EmailService for LogEmailer {
    #[instrument(skip(self, body_html), fields(recipient = %recipient, subject = %subject))]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        info!(body_length = body_html.len(), "Email not sent (log emailer)");
        debug!(body_html, "Email body");
        Ok(())
    }
}

/// Sends emails through an HTTP transactional email API.
pub struct ExternalEmailer {
    api_url: String,
    api_key: String,
    sender_email: String,
    http_client: reqwest::Client,
}

impl ExternalEmailer {
    pub fn new(mail: &MailConfig) -> Self {
        info!(
            api_url = %mail.api_url,
            sender_email = %mail.sender_email,
            "Initializing external email service"
        );

        Self {
            api_url: mail.api_url.clone(),
            api_key: mail.api_key.clone(),
            sender_email: mail.sender_email.clone(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailService for ExternalEmailer {
    #[instrument(
        skip(self, body_html),
        fields(
            recipient = %recipient,
            subject = %subject,
            sender = %self.sender_email
        )
    )]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        let payload = json!({
            "sender": { "name": "Énergie", "email": self.sender_email },
            "to": [{ "email": recipient }],
            "subject": subject,
            "htmlContent": body_html,
        });

        debug!("Sending HTTP request to email API");
        let response = self
            .http_client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("Email sent via external API");
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                let error_body = res
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error response body".to_string());

                error!(
                    status = %status,
                    error_body = %error_body,
                    "External email API returned error"
                );

                Err(EmailError::SendFailed(format!(
                    "email provider returned {status}"
                )))
            }
            Err(e) => {
                error!(error = %e, "Network request to email API failed");
                Err(EmailError::SendFailed(format!("network error: {e}")))
            }
        }
    }
}
