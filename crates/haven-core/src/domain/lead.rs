use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::PropertyRequirement;
use crate::error::DomainError;
use crate::sanitize::{sanitize_email, sanitize_html, sanitize_phone, sanitize_text};

const NAME_CHARS: std::ops::RangeInclusive<usize> = 2..=100;
const MAX_EMAIL_CHARS: usize = 255;
const MAX_MESSAGE_CHARS: usize = 1000;

/// Ten-digit Indian mobile number.
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid mobile regex"));

/// Raw contact form input, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct LeadSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub property_id: Option<i64>,
    pub property_title: Option<String>,
    pub requirement: Option<PropertyRequirement>,
}

/// A validated enquiry for an agent to follow up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub property_id: Option<i64>,
    pub property_title: Option<String>,
    pub requirement: Option<PropertyRequirement>,
    pub created_at: DateTime<Utc>,
}

impl ContactLead {
    /// Validate a submission and sanitize every text field.
    ///
    /// All field problems are reported together.
    pub fn from_submission(submission: LeadSubmission) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let name = sanitize_text(submission.name.trim());
        if !NAME_CHARS.contains(&name.chars().count()) {
            errors.push("Name must be between 2 and 100 characters".to_string());
        }

        let email = match sanitize_email(&submission.email) {
            Ok(email) if email.chars().count() > MAX_EMAIL_CHARS => {
                errors.push("Email must be less than 255 characters".to_string());
                email
            }
            Ok(email) => email,
            Err(_) => {
                errors.push("Please enter a valid email address".to_string());
                String::new()
            }
        };

        let phone = sanitize_phone(&submission.phone);
        if !MOBILE_RE.is_match(&phone) {
            errors.push("Please enter a valid 10-digit Indian mobile number".to_string());
        }

        let message = submission
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if message
            .as_ref()
            .is_some_and(|m| m.chars().count() > MAX_MESSAGE_CHARS)
        {
            errors.push("Message must be less than 1000 characters".to_string());
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors.join(", ")));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            message: message.map(|m| sanitize_html(&m)),
            property_id: submission.property_id,
            property_title: submission
                .property_title
                .map(|t| sanitize_text(&t))
                .filter(|t| !t.is_empty()),
            requirement: submission.requirement.map(PropertyRequirement::sanitized),
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> LeadSubmission {
        LeadSubmission {
            name: "Asha Rao".to_string(),
            email: "Asha@Example.com".to_string(),
            phone: "9876543210".to_string(),
            message: Some("Is the <b>terrace</b> private?<script>x()</script>".to_string()),
            property_id: Some(42),
            property_title: Some("Sea View Villa".to_string()),
            requirement: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let lead = ContactLead::from_submission(valid()).unwrap();
        assert_eq!(lead.email, "asha@example.com");
        assert_eq!(lead.message.as_deref(), Some("Is the <b>terrace</b> private?"));
        assert_eq!(lead.property_id, Some(42));
    }

    #[test]
    fn test_blank_message_is_dropped() {
        let lead = ContactLead::from_submission(LeadSubmission {
            message: Some("   ".to_string()),
            ..valid()
        })
        .unwrap();
        assert_eq!(lead.message, None);
    }

    #[test]
    fn test_reports_every_invalid_field() {
        let err = ContactLead::from_submission(LeadSubmission {
            name: "A".to_string(),
            email: "nope".to_string(),
            phone: "12345".to_string(),
            message: Some("x".repeat(1001)),
            ..valid()
        })
        .unwrap_err();

        let DomainError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("Name"));
        assert!(msg.contains("email"));
        assert!(msg.contains("mobile"));
        assert!(msg.contains("Message"));
    }

    #[test]
    fn test_rejects_landline_prefix() {
        let result = ContactLead::from_submission(LeadSubmission {
            phone: "1234567890".to_string(),
            ..valid()
        });
        assert!(result.is_err());
    }
}
