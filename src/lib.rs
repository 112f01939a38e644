//! poi-harvest - points-of-interest harvesting over the Places API.
//!
//! This library holds the search aggregation and enrichment engine shared by
//! the `collect` batch tool and the `serve` HTTP service.

pub mod config;
pub mod error;
pub mod harvest;
pub mod location;
pub mod models;
pub mod places;
pub mod terms;

pub use config::HarvestConfig;
pub use error::{ApiError, HarvestError};
pub use harvest::{HarvestReport, HarvestRequest, Harvester, QueryText};
pub use models::{AdminKind, AdminRegistry, EnrichedRecord, GeoPoint, LocationBias, SearchScope};
