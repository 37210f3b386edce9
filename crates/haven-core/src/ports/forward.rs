//! Outbound ports for actions handed to the hosted backend.

use async_trait::async_trait;

use crate::domain::{ContactLead, PasswordReset};

/// Destination for contact-form leads.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn submit(&self, lead: &ContactLead) -> Result<(), ForwardError>;
}

/// Delivers password reset requests to the authentication service.
#[async_trait]
pub trait PasswordResetSender: Send + Sync {
    async fn send(&self, reset: &PasswordReset) -> Result<(), ForwardError>;
}

/// Forwarding errors.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Rejected by upstream with status {0}")]
    Rejected(u16),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
