//! Request and response shapes for the search endpoint.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use poi_harvest::harvest::RunStats;
use poi_harvest::models::ScopeInput;
use poi_harvest::{EnrichedRecord, HarvestError, HarvestReport, HarvestRequest, QueryText};

/// Body of `POST /search`
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub province_id: Option<String>,
    pub amphoe_id: Option<String>,
    pub tambon_id: Option<String>,
    pub term: Option<String>,
    pub freetext: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub radius_km: Option<f64>,
}

fn default_language() -> String {
    "th".to_string()
}

fn default_region() -> String {
    "TH".to_string()
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub places: Vec<EnrichedRecord>,
    pub stats: RunStats,
    pub degraded: bool,
}

impl From<HarvestReport> for SearchResponse {
    fn from(report: HarvestReport) -> Self {
        Self {
            places: report.records,
            stats: report.stats,
            degraded: report.degraded,
        }
    }
}

impl SearchBody {
    /// Build an engine request; the most specific area id wins.
    pub fn into_request(self) -> Result<HarvestRequest, HarvestError> {
        if let Some(km) = self.radius_km {
            if !(km.is_finite() && km > 0.0) {
                return Err(HarvestError::InvalidScope(format!(
                    "radius_km must be positive, got {}",
                    km
                )));
            }
        }

        let scope = ScopeInput {
            province_id: self.province_id,
            district_id: self.amphoe_id,
            subdistrict_id: self.tambon_id,
            ..Default::default()
        }
        .into_scope()?;

        let mut request = HarvestRequest::new(
            scope,
            QueryText::from_parts(self.term.as_deref(), self.freetext.as_deref()),
            &self.language,
        );
        request.region = Some(self.region).filter(|r| !r.trim().is_empty());
        request.radius_override_m = self.radius_km.map(|km| km * 1000.0);
        // Higher recall for interactive searches
        request.strict_types = false;
        Ok(request)
    }
}

/// Map an engine failure onto an HTTP status and message
pub fn error_response(err: &HarvestError) -> (StatusCode, String) {
    let status = if err.is_request_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, err.to_string())
}
