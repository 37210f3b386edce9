use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::sanitize::sanitize_email;

/// A request to send a password reset link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordReset {
    pub id: Uuid,
    pub email: String,
    pub requested_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Build a reset request from a raw, user-typed address.
    pub fn new(raw_email: &str) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            email: sanitize_email(raw_email)?,
            requested_at: Utc::now(),
        })
    }
}
