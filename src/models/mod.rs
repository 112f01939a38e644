//! Core data models for the harvest engine.

pub mod admin;
pub mod place;
pub mod scope;

pub use admin::{AdminKind, AdminRegistry, AdminUnit};
pub use place::{EnrichedRecord, GeoBox, GeoPoint, Provenance, RawHit};
pub use scope::{LocationBias, ScopeInput, SearchScope};
