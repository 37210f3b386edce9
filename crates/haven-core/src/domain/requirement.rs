use serde::{Deserialize, Serialize};

use crate::sanitize::sanitize_text;

const MAX_ROOMS: i64 = 20;
const MAX_NOTES_CHARS: usize = 500;

/// What a prospective buyer or tenant is looking for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRequirement {
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

// Zero means "not specified" in the storefront forms.
fn amount(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| *v != 0.0 && v.is_finite())
        .map(|v| v.max(0.0))
}

fn rooms(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0).map(|v| v.clamp(0, MAX_ROOMS))
}

impl PropertyRequirement {
    /// Strip markup from text fields and clamp numbers into sane ranges.
    pub fn sanitized(self) -> Self {
        Self {
            property_type: sanitize_text(&self.property_type),
            location: sanitize_text(&self.location),
            budget_min: amount(self.budget_min),
            budget_max: amount(self.budget_max),
            bedrooms: rooms(self.bedrooms),
            bathrooms: rooms(self.bathrooms),
            size_min: amount(self.size_min),
            size_max: amount(self.size_max),
            amenities: self
                .amenities
                .map(|list| list.iter().map(|a| sanitize_text(a)).collect()),
            notes: self
                .notes
                .filter(|n| !n.is_empty())
                .map(|n| sanitize_text(&n).chars().take(MAX_NOTES_CHARS).collect()),
        }
    }
}
