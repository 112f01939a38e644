//! Places API access: wire types, HTTP client and retry policy.

mod client;
mod retry;
mod types;

use async_trait::async_trait;

use crate::error::ApiError;

pub use client::HttpPlacesClient;
pub use retry::RetryPolicy;
pub use types::{
    ApiPlace, CircleBias, LatLng, LocalizedText, RectangleRestriction, SearchTextRequest,
    SearchTextResponse, MAX_PAGE_SIZE,
};

/// Field mask for text search; paths are relative to the response root
pub const SEARCH_FIELD_MASK: &[&str] = &[
    "places.name",
    "places.id",
    "places.displayName",
    "places.formattedAddress",
    "places.location",
    "places.types",
    "places.googleMapsUri",
    "nextPageToken",
];

/// Field mask for place details; paths are relative to the place
pub const DETAILS_FIELD_MASK: &[&str] = &[
    "name",
    "id",
    "displayName",
    "formattedAddress",
    "location",
    "websiteUri",
    "nationalPhoneNumber",
    "internationalPhoneNumber",
    "types",
    "googleMapsUri",
];

/// The two upstream calls the harvest engine depends on.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Fetch one page of text search results
    async fn search_text(
        &self,
        request: &SearchTextRequest,
    ) -> Result<SearchTextResponse, ApiError>;

    /// Fetch the details record for a bare place id
    async fn place_details(&self, place_id: &str, language: &str) -> Result<ApiPlace, ApiError>;
}
