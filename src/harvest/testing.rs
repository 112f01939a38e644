//! Scripted in-memory `PlacesApi` for engine tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::ApiError;
use crate::places::{ApiPlace, LocalizedText, PlacesApi, SearchTextRequest, SearchTextResponse};

/// Replays queued responses in order and records every request.
///
/// An empty search queue answers with an empty last page; a place with no
/// queued details answers with an empty details record.
#[derive(Default)]
pub struct ScriptedPlaces {
    search: Mutex<VecDeque<Result<SearchTextResponse, ApiError>>>,
    details: Mutex<HashMap<String, VecDeque<Result<ApiPlace, ApiError>>>>,
    search_log: Mutex<Vec<SearchTextRequest>>,
    details_log: Mutex<Vec<String>>,
}

impl ScriptedPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_search(&self, response: Result<SearchTextResponse, ApiError>) {
        self.search.lock().unwrap().push_back(response);
    }

    pub fn push_details(&self, place_id: &str, response: Result<ApiPlace, ApiError>) {
        self.details
            .lock()
            .unwrap()
            .entry(place_id.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn search_requests(&self) -> Vec<SearchTextRequest> {
        self.search_log.lock().unwrap().clone()
    }

    pub fn details_requests(&self) -> Vec<String> {
        self.details_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlacesApi for ScriptedPlaces {
    async fn search_text(
        &self,
        request: &SearchTextRequest,
    ) -> Result<SearchTextResponse, ApiError> {
        self.search_log.lock().unwrap().push(request.clone());
        self.search
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchTextResponse::default()))
    }

    async fn place_details(&self, place_id: &str, _language: &str) -> Result<ApiPlace, ApiError> {
        self.details_log.lock().unwrap().push(place_id.to_string());
        self.details
            .lock()
            .unwrap()
            .get_mut(place_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(ApiPlace::default()))
    }
}

/// A search-time place with id, resource name and display name
pub fn place(id: &str) -> ApiPlace {
    ApiPlace {
        id: Some(id.to_string()),
        name: Some(format!("places/{}", id)),
        display_name: Some(LocalizedText {
            text: Some(format!("Place {}", id)),
            language_code: None,
        }),
        ..Default::default()
    }
}

pub fn page(ids: &[&str], token: Option<&str>) -> SearchTextResponse {
    SearchTextResponse {
        places: ids.iter().map(|id| place(id)).collect(),
        next_page_token: token.map(String::from),
    }
}
