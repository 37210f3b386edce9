//! Listing search.

use actix_web::{HttpResponse, web};

use haven_core::domain::{Listing, ListingQuery, ThrottleScope};
use haven_shared::ApiResponse;
use haven_shared::dto::{ListingSummary, SearchRequest, SearchResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn summary(listing: Listing) -> ListingSummary {
    ListingSummary {
        id: listing.id,
        title: listing.title,
        location: listing.location,
        price: listing.price,
        hero_image: listing.hero_image,
        status: listing.status,
    }
}

/// POST /api/search
///
/// Every search shares one global throttle bucket. Queries too short to
/// search do not count against it.
pub async fn search(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> AppResult<HttpResponse> {
    let raw = body.into_inner().query;
    let throttle = state.throttle(ThrottleScope::Search, "");

    if !ListingQuery::is_searchable(&raw) {
        return Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse {
            results: Vec::new(),
            remaining: throttle.remaining(),
        })));
    }

    if !throttle.check() {
        return Err(AppError::too_many_requests(
            "Too many searches. Please wait a moment.",
            throttle.reset_after(),
        ));
    }

    let query = ListingQuery::new(&raw);
    tracing::debug!(query = %query.text, "Searching listings");

    let results = state
        .listings
        .search(&query)
        .await?
        .into_iter()
        .map(summary)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse {
        results,
        remaining: throttle.remaining(),
    })))
}
