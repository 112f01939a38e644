//! Search scopes and the location bias sent upstream.

use serde::{Deserialize, Serialize};

use super::{AdminKind, GeoBox, GeoPoint};
use crate::error::HarvestError;

/// Geographic area a harvest is biased or restricted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SearchScope {
    /// Explicit center and radius in meters
    Circle { center: GeoPoint, radius_m: f64 },
    /// Explicit rectangle restriction
    Rectangle { bounds: GeoBox },
    /// A province, district or sub-district looked up by code
    Admin { kind: AdminKind, id: String },
}

impl SearchScope {
    pub fn describe(&self) -> String {
        match self {
            SearchScope::Circle { center, radius_m } => {
                format!("circle ({}, {}) r={}m", center.lat, center.lng, radius_m)
            }
            SearchScope::Rectangle { bounds } => format!(
                "rectangle ({}, {})-({}, {})",
                bounds.low.lat, bounds.low.lng, bounds.high.lat, bounds.high.lng
            ),
            SearchScope::Admin { kind, id } => format!("{} {}", kind, id),
        }
    }
}

/// The single location parameter attached to every upstream search call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum LocationBias {
    Circle { center: GeoPoint, radius_m: f64 },
    Rectangle { bounds: GeoBox },
}

/// Loose scope parameters as collected by the CLI and HTTP front doors.
///
/// At most one of circle or rectangle may be set. Administrative ids are
/// only consulted when neither is, and the most specific one wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeInput {
    pub center: Option<GeoPoint>,
    pub radius_m: Option<f64>,
    pub bbox: Option<GeoBox>,
    pub province_id: Option<String>,
    pub district_id: Option<String>,
    pub subdistrict_id: Option<String>,
}

impl ScopeInput {
    pub fn into_scope(self) -> Result<SearchScope, HarvestError> {
        let non_empty = |id: Option<String>| id.filter(|s| !s.trim().is_empty());

        match (self.center, self.bbox) {
            (Some(_), Some(_)) => Err(HarvestError::InvalidScope(
                "circle and rectangle are mutually exclusive".into(),
            )),
            (Some(center), None) => {
                let radius_m = self.radius_m.ok_or_else(|| {
                    HarvestError::InvalidScope("a radius is required with a center".into())
                })?;
                Ok(SearchScope::Circle { center, radius_m })
            }
            (None, Some(bounds)) => Ok(SearchScope::Rectangle { bounds }),
            (None, None) => {
                if let Some(id) = non_empty(self.subdistrict_id) {
                    Ok(SearchScope::Admin {
                        kind: AdminKind::Subdistrict,
                        id,
                    })
                } else if let Some(id) = non_empty(self.district_id) {
                    Ok(SearchScope::Admin {
                        kind: AdminKind::District,
                        id,
                    })
                } else if let Some(id) = non_empty(self.province_id) {
                    Ok(SearchScope::Admin {
                        kind: AdminKind::Province,
                        id,
                    })
                } else {
                    Err(HarvestError::InvalidScope("no scope supplied".into()))
                }
            }
        }
    }
}
