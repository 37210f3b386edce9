use async_trait::async_trait;

use crate::domain::{Listing, ListingQuery};

/// Listing lookup for the storefront search box.
#[async_trait]
pub trait ListingSearch: Send + Sync {
    /// Listings whose title or location contains the query text,
    /// at most `query.limit` of them.
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>, ListingError>;
}

/// Listing source errors.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("Failed to read listings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed listings data: {0}")]
    Parse(#[from] serde_json::Error),
}
