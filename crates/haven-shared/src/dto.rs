//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Listing search from the storefront search box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// One search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub price: f64,
    pub hero_image: Option<String>,
    pub status: String,
}

/// Search results plus how many searches are left in the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ListingSummary>,
    pub remaining: u32,
}

/// Request a password reset link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Optional "what I'm looking for" block on a contact lead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyRequirementRequest {
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub location: String,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Contact form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactLeadRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub property_id: Option<i64>,
    pub property_title: Option<String>,
    pub requirement: Option<PropertyRequirementRequest>,
}

/// Acknowledgement for an accepted action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    pub id: String,
}

/// Throttle state for one key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitStatusResponse {
    pub scope: String,
    pub key: String,
    pub max_attempts: u32,
    pub remaining: u32,
    pub reset_after_secs: u64,
}
