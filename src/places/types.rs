//! Request and response bodies of the Places API (v1).

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{GeoPoint, LocationBias, Provenance, RawHit};

/// Upstream hard limit on results per page
pub const MAX_PAGE_SIZE: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeoPoint> for LatLng {
    fn from(p: GeoPoint) -> Self {
        Self {
            latitude: p.lat,
            longitude: p.lng,
        }
    }
}

impl From<LatLng> for GeoPoint {
    fn from(p: LatLng) -> Self {
        GeoPoint::new(p.latitude, p.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: LatLng,
    pub radius: f64,
}

/// `{"circle": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleBias {
    pub circle: Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rectangle {
    pub low: LatLng,
    pub high: LatLng,
}

/// `{"rectangle": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectangleRestriction {
    pub rectangle: Rectangle,
}

/// Body of `places:searchText`.
///
/// `location_bias` and `location_restriction` mirror the upstream API and
/// must never both be set; `validate` enforces this before anything is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextRequest {
    pub text_query: String,
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_type: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strict_type_filtering: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_bias: Option<CircleBias>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_restriction: Option<RectangleRestriction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    pub page_size: u8,
    pub include_pure_service_area_businesses: bool,
}

impl SearchTextRequest {
    pub fn new(text_query: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            text_query: text_query.into(),
            language_code: language_code.into(),
            region_code: None,
            included_type: None,
            strict_type_filtering: false,
            location_bias: None,
            location_restriction: None,
            page_token: None,
            page_size: MAX_PAGE_SIZE,
            include_pure_service_area_businesses: false,
        }
    }

    pub fn region(mut self, region: Option<&str>) -> Self {
        self.region_code = region.filter(|r| !r.is_empty()).map(String::from);
        self
    }

    /// Filter by type; strict filtering only applies when a type is set
    pub fn included_type(mut self, included_type: Option<&str>, strict: bool) -> Self {
        self.included_type = included_type.map(String::from);
        self.strict_type_filtering = strict && self.included_type.is_some();
        self
    }

    /// Circles become a location bias, rectangles a location restriction
    pub fn location(mut self, bias: &LocationBias) -> Self {
        match *bias {
            LocationBias::Circle { center, radius_m } => {
                self.location_bias = Some(CircleBias {
                    circle: Circle {
                        center: center.into(),
                        radius: radius_m,
                    },
                });
            }
            LocationBias::Rectangle { bounds } => {
                self.location_restriction = Some(RectangleRestriction {
                    rectangle: Rectangle {
                        low: bounds.low.into(),
                        high: bounds.high.into(),
                    },
                });
            }
        }
        self
    }

    pub fn page_size(mut self, size: u8) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.location_bias.is_some() && self.location_restriction.is_some() {
            return Err(ApiError::InvalidRequest {
                operation: "searchText",
                message: "locationBias and locationRestriction are mutually exclusive".into(),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ApiError::InvalidRequest {
                operation: "searchText",
                message: format!("pageSize {} outside 1..={}", self.page_size, MAX_PAGE_SIZE),
            });
        }
        Ok(())
    }

    /// Short label for logs and error context
    pub fn describe(&self) -> String {
        match &self.included_type {
            Some(t) => format!("search '{}' [type={}]", self.text_query, t),
            None => format!("search '{}'", self.text_query),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    pub text: Option<String>,
    pub language_code: Option<String>,
}

/// A place as returned by either endpoint; absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlace {
    pub id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<LocalizedText>,
    pub formatted_address: Option<String>,
    pub location: Option<LatLng>,
    #[serde(default)]
    pub types: Vec<String>,
    pub google_maps_uri: Option<String>,
    pub website_uri: Option<String>,
    pub national_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
}

impl ApiPlace {
    pub fn display_text(&self) -> Option<&str> {
        self.display_name.as_ref().and_then(|d| d.text.as_deref())
    }

    pub fn into_raw_hit(self, provenance: Provenance) -> RawHit {
        RawHit {
            display_name: self.display_text().map(String::from),
            id: self.id,
            resource_name: self.name,
            formatted_address: self.formatted_address,
            location: self.location.map(GeoPoint::from),
            types: self.types,
            google_maps_uri: self.google_maps_uri,
            provenance: Some(provenance),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTextResponse {
    #[serde(default)]
    pub places: Vec<ApiPlace>,
    pub next_page_token: Option<String>,
}

impl SearchTextResponse {
    /// Continuation token, ignoring empty strings
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoBox;
    use serde_json::json;

    #[test]
    fn test_circle_request_body() {
        let request = SearchTextRequest::new("cafe", "th")
            .region(Some("TH"))
            .included_type(Some("cafe"), true)
            .location(&LocationBias::Circle {
                center: GeoPoint::new(13.75, 100.5),
                radius_m: 1500.0,
            });

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "textQuery": "cafe",
                "languageCode": "th",
                "regionCode": "TH",
                "includedType": "cafe",
                "strictTypeFiltering": true,
                "locationBias": {
                    "circle": {
                        "center": {"latitude": 13.75, "longitude": 100.5},
                        "radius": 1500.0
                    }
                },
                "pageSize": 20,
                "includePureServiceAreaBusinesses": false
            })
        );
    }

    #[test]
    fn test_rectangle_becomes_restriction() {
        let request = SearchTextRequest::new("hospital", "en").location(&LocationBias::Rectangle {
            bounds: GeoBox::new(13.0, 100.0, 14.0, 101.0),
        });
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("locationBias").is_none());
        assert_eq!(
            body["locationRestriction"]["rectangle"]["high"],
            json!({"latitude": 14.0, "longitude": 101.0})
        );
        assert!(body.get("regionCode").is_none());
        assert!(body.get("strictTypeFiltering").is_none());
    }

    #[test]
    fn test_strict_filtering_needs_type() {
        let request = SearchTextRequest::new("shop", "en").included_type(None, true);
        assert!(!request.strict_type_filtering);
    }

    #[test]
    fn test_both_locations_rejected() {
        let request = SearchTextRequest::new("shop", "en")
            .location(&LocationBias::Circle {
                center: GeoPoint::new(13.0, 100.0),
                radius_m: 100.0,
            })
            .location(&LocationBias::Rectangle {
                bounds: GeoBox::new(13.0, 100.0, 14.0, 101.0),
            });
        assert!(matches!(
            request.validate(),
            Err(ApiError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(SearchTextRequest::new("a", "th").page_size(50).page_size, 20);
        assert_eq!(SearchTextRequest::new("a", "th").page_size(0).page_size, 1);
    }

    #[test]
    fn test_parse_search_response() {
        let response: SearchTextResponse = serde_json::from_value(json!({
            "places": [{
                "name": "places/ChIJ1",
                "id": "ChIJ1",
                "displayName": {"text": "ร้านกาแฟ", "languageCode": "th"},
                "formattedAddress": "Bangkok",
                "location": {"latitude": 13.7, "longitude": 100.5},
                "types": ["cafe", "food"],
                "googleMapsUri": "https://maps.google.com/?cid=1"
            }],
            "nextPageToken": "tok"
        }))
        .unwrap();

        assert_eq!(response.continuation(), Some("tok"));
        let hit = response.places[0].clone().into_raw_hit(Provenance {
            keyword: "coffee".into(),
            included_type: None,
        });
        assert_eq!(hit.place_id(), Some("ChIJ1"));
        assert_eq!(hit.display_name.as_deref(), Some("ร้านกาแฟ"));
        assert_eq!(hit.types, vec!["cafe", "food"]);
        assert_eq!(hit.location, Some(GeoPoint::new(13.7, 100.5)));
    }

    #[test]
    fn test_empty_response() {
        let response: SearchTextResponse = serde_json::from_str("{}").unwrap();
        assert!(response.places.is_empty());
        assert_eq!(response.continuation(), None);

        let response: SearchTextResponse =
            serde_json::from_str(r#"{"nextPageToken": ""}"#).unwrap();
        assert_eq!(response.continuation(), None);
    }
}
