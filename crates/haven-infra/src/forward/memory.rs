//! In-memory forwarders - used when no upstream webhook is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;

use haven_core::domain::{ContactLead, PasswordReset};
use haven_core::ports::{ForwardError, LeadSink, PasswordResetSender};

/// Keeps submitted leads in memory.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryLeadSink {
    leads: RwLock<Vec<ContactLead>>,
}

impl InMemoryLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every lead received so far, oldest first.
    pub async fn leads(&self) -> Vec<ContactLead> {
        self.leads.read().await.clone()
    }
}

#[async_trait]
impl LeadSink for InMemoryLeadSink {
    async fn submit(&self, lead: &ContactLead) -> Result<(), ForwardError> {
        self.leads.write().await.push(lead.clone());
        tracing::info!(lead_id = %lead.id, property_id = ?lead.property_id, "Lead stored in memory");
        Ok(())
    }
}

/// Records password reset requests instead of sending them.
#[derive(Default)]
pub struct InMemoryPasswordResetSender {
    requests: RwLock<Vec<PasswordReset>>,
}

impl InMemoryPasswordResetSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn requests(&self) -> Vec<PasswordReset> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl PasswordResetSender for InMemoryPasswordResetSender {
    async fn send(&self, reset: &PasswordReset) -> Result<(), ForwardError> {
        self.requests.write().await.push(reset.clone());
        tracing::info!(request_id = %reset.id, "Password reset recorded in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::domain::LeadSubmission;

    #[tokio::test]
    async fn test_lead_sink_keeps_order() {
        let sink = InMemoryLeadSink::new();

        for name in ["Asha Rao", "Vikram Shah"] {
            let lead = ContactLead::from_submission(LeadSubmission {
                name: name.to_string(),
                email: "lead@example.com".to_string(),
                phone: "9876543210".to_string(),
                ..Default::default()
            })
            .unwrap();
            sink.submit(&lead).await.unwrap();
        }

        let names: Vec<String> = sink.leads().await.into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Asha Rao", "Vikram Shah"]);
    }

    #[tokio::test]
    async fn test_password_reset_recorded() {
        let sender = InMemoryPasswordResetSender::new();
        let reset = PasswordReset::new("Owner@Example.com").unwrap();

        sender.send(&reset).await.unwrap();

        let requests = sender.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].email, "owner@example.com");
    }
}
