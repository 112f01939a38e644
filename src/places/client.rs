//! reqwest-backed Places API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::{ApiPlace, SearchTextRequest, SearchTextResponse};
use super::{PlacesApi, DETAILS_FIELD_MASK, SEARCH_FIELD_MASK};
use crate::error::ApiError;

const API_KEY_HEADER: &str = "x-goog-api-key";
const FIELD_MASK_HEADER: &str = "x-goog-fieldmask";

/// Places API client with a shared connection pool
#[derive(Clone)]
pub struct HttpPlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HttpPlacesClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let client = Client::builder()
            .user_agent(concat!("poi-harvest/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn headers(&self, field_mask: &[&str]) -> Result<HeaderMap, ApiError> {
        let invalid = |message: String| ApiError::InvalidRequest {
            operation: "headers",
            message,
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key).map_err(|e| invalid(e.to_string()))?,
        );
        headers.insert(
            FIELD_MASK_HEADER,
            HeaderValue::from_str(&field_mask.join(",")).map_err(|e| invalid(e.to_string()))?,
        );
        Ok(headers)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Network {
            operation,
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| ApiError::Network {
            operation,
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PlacesApi for HttpPlacesClient {
    async fn search_text(
        &self,
        request: &SearchTextRequest,
    ) -> Result<SearchTextResponse, ApiError> {
        request.validate()?;
        debug!("{} (page token: {})", request.describe(), request.page_token.is_some());

        let builder = self
            .client
            .post(format!("{}/v1/places:searchText", self.base_url))
            .headers(self.headers(SEARCH_FIELD_MASK)?)
            .json(request);
        self.execute("searchText", builder).await
    }

    async fn place_details(&self, place_id: &str, language: &str) -> Result<ApiPlace, ApiError> {
        // Accept both bare ids and `places/{id}` resource names
        let id = place_id.rsplit('/').next().unwrap_or(place_id);
        debug!("details '{}'", id);

        let url = Url::parse_with_params(
            &format!("{}/v1/places/{}", self.base_url, id),
            &[("languageCode", language)],
        )
        .map_err(|e| ApiError::InvalidRequest {
            operation: "placeDetails",
            message: e.to_string(),
        })?;

        let builder = self
            .client
            .get(url)
            .headers(self.headers(DETAILS_FIELD_MASK)?);
        self.execute("placeDetails", builder).await
    }
}
