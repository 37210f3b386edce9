use serde::{Deserialize, Serialize};

use crate::sanitize::{sanitize_search_query, sanitize_text, sanitize_url};

/// A property listing as shown in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub hero_image: Option<String>,
    pub status: String,
}

impl Listing {
    /// Clean listing data loaded from an untrusted source.
    ///
    /// Text fields lose their markup and an unusable hero image is dropped.
    pub fn sanitized(self) -> Self {
        Self {
            title: sanitize_text(&self.title),
            location: sanitize_text(&self.location),
            hero_image: self
                .hero_image
                .and_then(|image| sanitize_url(&image).ok()),
            status: sanitize_text(&self.status),
            ..self
        }
    }

    /// Case-insensitive substring match on title or location.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.location.to_lowercase().contains(needle)
    }
}

/// A sanitized listing search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub text: String,
    pub limit: usize,
}

impl ListingQuery {
    /// Shorter inputs are treated as "no search yet".
    pub const MIN_CHARS: usize = 2;
    pub const DEFAULT_LIMIT: usize = 5;

    /// Whether `raw` is long enough to run a search at all.
    pub fn is_searchable(raw: &str) -> bool {
        raw.trim().chars().count() >= Self::MIN_CHARS
    }

    pub fn new(raw: &str) -> Self {
        Self {
            text: sanitize_search_query(raw),
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str, location: &str) -> Listing {
        Listing {
            id: 1,
            title: title.to_string(),
            location: location.to_string(),
            price: 1.0,
            hero_image: None,
            status: "available".to_string(),
        }
    }

    #[test]
    fn test_matches_title_or_location() {
        let l = listing("Sea View Villa", "Goa");
        assert!(l.matches("villa"));
        assert!(l.matches("goa"));
        assert!(!l.matches("pune"));
    }

    #[test]
    fn test_is_searchable() {
        assert!(!ListingQuery::is_searchable(" a "));
        assert!(ListingQuery::is_searchable("go"));
    }

    #[test]
    fn test_sanitized_listing() {
        let l = Listing {
            hero_image: Some("javascript:alert(1)".to_string()),
            ..listing("<b>Loft</b>", "Pune")
        }
        .sanitized();
        assert_eq!(l.title, "Loft");
        assert_eq!(l.hero_image, None);
    }
}
