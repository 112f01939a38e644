//! Place records as they move through search and enrichment.

use serde::{Deserialize, Serialize};

/// Geographic point (lat/lng)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Rectangle given by its south-west and north-east corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub low: GeoPoint,
    pub high: GeoPoint,
}

impl GeoBox {
    pub fn new(sw_lat: f64, sw_lng: f64, ne_lat: f64, ne_lng: f64) -> Self {
        Self {
            low: GeoPoint::new(sw_lat, sw_lng),
            high: GeoPoint::new(ne_lat, ne_lng),
        }
    }
}

/// Which query stream surfaced a hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_type: Option<String>,
}

/// A place as returned by the text search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHit {
    pub id: Option<String>,
    /// Resource name of the form `places/{id}`
    pub resource_name: Option<String>,
    pub display_name: Option<String>,
    pub formatted_address: Option<String>,
    pub location: Option<GeoPoint>,
    /// Type tags in source order
    pub types: Vec<String>,
    pub google_maps_uri: Option<String>,
    pub provenance: Option<Provenance>,
}

impl RawHit {
    /// Stable identifier: the explicit id, else the trailing segment of the resource name.
    pub fn place_id(&self) -> Option<&str> {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            return Some(id);
        }
        self.resource_name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }
}

/// Final output record: search fields overlaid by details fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_national: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_international: Option<String>,
    pub source_keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_type: Option<String>,
    /// Name of the province the request was scoped to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// Whether the details call succeeded for this record
    pub enriched: bool,
}

impl EnrichedRecord {
    /// Start a record from search-time fields only.
    pub fn from_hit(place_id: String, hit: RawHit) -> Self {
        let (source_keyword, included_type) = match hit.provenance {
            Some(p) => (p.keyword, p.included_type),
            None => (String::new(), None),
        };

        Self {
            place_id,
            resource_name: hit.resource_name,
            name: hit.display_name,
            formatted_address: hit.formatted_address,
            location: hit.location,
            types: hit.types,
            google_maps_uri: hit.google_maps_uri,
            website: None,
            phone_national: None,
            phone_international: None,
            source_keyword,
            included_type,
            province: None,
            enriched: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_id_prefers_explicit_id() {
        let hit = RawHit {
            id: Some("abc".into()),
            resource_name: Some("places/xyz".into()),
            ..Default::default()
        };
        assert_eq!(hit.place_id(), Some("abc"));
    }

    #[test]
    fn test_place_id_from_resource_name() {
        let hit = RawHit {
            resource_name: Some("places/ChIJ123".into()),
            ..Default::default()
        };
        assert_eq!(hit.place_id(), Some("ChIJ123"));

        let empty_id = RawHit {
            id: Some(String::new()),
            resource_name: Some("places/ChIJ456".into()),
            ..Default::default()
        };
        assert_eq!(empty_id.place_id(), Some("ChIJ456"));
    }

    #[test]
    fn test_place_id_missing() {
        assert_eq!(RawHit::default().place_id(), None);

        let trailing_slash = RawHit {
            resource_name: Some("places/".into()),
            ..Default::default()
        };
        assert_eq!(trailing_slash.place_id(), None);
    }

    #[test]
    fn test_record_keeps_provenance() {
        let hit = RawHit {
            id: Some("p1".into()),
            display_name: Some("Cafe".into()),
            provenance: Some(Provenance {
                keyword: "coffee".into(),
                included_type: Some("cafe".into()),
            }),
            ..Default::default()
        };
        let record = EnrichedRecord::from_hit("p1".into(), hit);
        assert_eq!(record.source_keyword, "coffee");
        assert_eq!(record.included_type.as_deref(), Some("cafe"));
        assert_eq!(record.name.as_deref(), Some("Cafe"));
        assert!(!record.enriched);
    }
}
