//! Webhook forwarder - posts leads and reset requests as JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use haven_core::domain::{ContactLead, PasswordReset};
use haven_core::ports::{ForwardError, LeadSink, PasswordResetSender};

/// Webhook endpoint configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
enum WebhookPayload<'a> {
    ContactLead(&'a ContactLead),
    PasswordReset(&'a PasswordReset),
}

/// Sends forwarded actions to an HTTP endpoint.
pub struct WebhookForwarder {
    url: String,
    client: reqwest::Client,
}

impl WebhookForwarder {
    pub fn new(config: WebhookConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ForwardError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Webhook forwarder configured");

        Ok(Self {
            url: config.url,
            client,
        })
    }

    async fn post(&self, payload: &WebhookPayload<'_>) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ForwardError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url = %self.url, status = status.as_u16(), "Webhook rejected payload");
            return Err(ForwardError::Rejected(status.as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl LeadSink for WebhookForwarder {
    async fn submit(&self, lead: &ContactLead) -> Result<(), ForwardError> {
        self.post(&WebhookPayload::ContactLead(lead)).await?;
        tracing::info!(lead_id = %lead.id, "Lead forwarded");
        Ok(())
    }
}

#[async_trait]
impl PasswordResetSender for WebhookForwarder {
    async fn send(&self, reset: &PasswordReset) -> Result<(), ForwardError> {
        self.post(&WebhookPayload::PasswordReset(reset)).await?;
        tracing::info!(request_id = %reset.id, "Password reset forwarded");
        Ok(())
    }
}
