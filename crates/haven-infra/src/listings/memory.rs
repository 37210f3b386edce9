//! In-memory listing index loaded from a JSON export.

use std::path::Path;

use async_trait::async_trait;

use haven_core::domain::{Listing, ListingQuery};
use haven_core::ports::{ListingError, ListingSearch};

/// Listings held in memory, searched with a linear scan.
#[derive(Debug, Default)]
pub struct InMemoryListingIndex {
    listings: Vec<Listing>,
}

impl InMemoryListingIndex {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: listings.into_iter().map(Listing::sanitized).collect(),
        }
    }

    /// Load a JSON array of listings.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ListingError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await?;
        let listings: Vec<Listing> = serde_json::from_slice(&raw)?;

        tracing::info!(path = %path.display(), count = listings.len(), "Listings loaded");

        Ok(Self::new(listings))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingSearch for InMemoryListingIndex {
    async fn search(&self, query: &ListingQuery) -> Result<Vec<Listing>, ListingError> {
        if query.text.is_empty() {
            return Ok(Vec::new());
        }

        let needle = query.text.to_lowercase();
        Ok(self
            .listings
            .iter()
            .filter(|listing| listing.matches(&needle))
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn listing(id: i64, title: &str, location: &str) -> Listing {
        Listing {
            id,
            title: title.to_string(),
            location: location.to_string(),
            price: 7_500_000.0,
            hero_image: None,
            status: "available".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_matches_title_and_location() {
        let index = InMemoryListingIndex::new(vec![
            listing(1, "Sea View Villa", "Goa"),
            listing(2, "City Loft", "Mumbai"),
            listing(3, "Garden Flat", "Goa Velha"),
        ]);

        let ids: Vec<i64> = index
            .search(&ListingQuery::new("GOA"))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let index = InMemoryListingIndex::new(
            (0..10).map(|i| listing(i, "Studio", "Pune")).collect(),
        );

        let results = index.search(&ListingQuery::new("studio")).await.unwrap();
        assert_eq!(results.len(), ListingQuery::DEFAULT_LIMIT);

        let query = ListingQuery {
            limit: 2,
            ..ListingQuery::new("studio")
        };
        let results = index.search(&query).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let index = InMemoryListingIndex::new(vec![listing(1, "Studio", "Pune")]);
        let results = index.search(&ListingQuery::new("%%")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 7, "title": "<b>Penthouse</b>", "location": "Bandra", "price": 1.5e7, "status": "available"}}]"#
        )
        .unwrap();

        let index = InMemoryListingIndex::from_file(file.path()).await.unwrap();
        assert_eq!(index.len(), 1);

        let results = index.search(&ListingQuery::new("pent")).await.unwrap();
        assert_eq!(results[0].title, "Penthouse");
    }

    #[tokio::test]
    async fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = InMemoryListingIndex::from_file(file.path()).await;
        assert!(matches!(result, Err(ListingError::Parse(_))));
    }
}
