//! Resolves a search scope into the location bias sent upstream.
//!
//! Administrative scopes are turned into a circle around a center taken from
//! the admin tables, the centroid of child sub-districts, or the static
//! province reference table.

mod provinces;

use geo::{Centroid, MultiPoint, Point};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::HarvestError;
use crate::models::{AdminKind, AdminRegistry, GeoPoint, LocationBias, SearchScope};

pub use provinces::province_center;

/// Default search radius per administrative level, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusPolicy {
    pub subdistrict_m: f64,
    pub district_m: f64,
    pub province_m: f64,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self {
            subdistrict_m: 1_500.0,
            district_m: 5_000.0,
            province_m: 30_000.0,
        }
    }
}

impl RadiusPolicy {
    pub fn radius_for(&self, kind: AdminKind) -> f64 {
        match kind {
            AdminKind::Subdistrict => self.subdistrict_m,
            AdminKind::District => self.district_m,
            AdminKind::Province => self.province_m,
        }
    }
}

/// Outcome of location resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub bias: LocationBias,
    /// Set when the center is a best-effort fallback rather than a real lookup
    pub degraded: bool,
    /// Thai name of the province the scope falls in, when known
    pub province_name: Option<String>,
}

impl ResolvedLocation {
    fn exact(bias: LocationBias) -> Self {
        Self {
            bias,
            degraded: false,
            province_name: None,
        }
    }
}

pub struct LocationResolver {
    registry: Arc<AdminRegistry>,
    policy: RadiusPolicy,
    fallback_center: Option<GeoPoint>,
}

impl LocationResolver {
    pub fn new(
        registry: Arc<AdminRegistry>,
        policy: RadiusPolicy,
        fallback_center: Option<GeoPoint>,
    ) -> Self {
        Self {
            registry,
            policy,
            fallback_center,
        }
    }

    /// Resolve a scope into a single circle or rectangle.
    ///
    /// `radius_override_m` replaces the policy radius for administrative
    /// scopes. `best_effort` allows an unknown province to fall back to the
    /// configured reference point; the result is then marked degraded.
    pub fn resolve(
        &self,
        scope: &SearchScope,
        radius_override_m: Option<f64>,
        best_effort: bool,
    ) -> Result<ResolvedLocation, HarvestError> {
        match scope {
            SearchScope::Circle { center, radius_m } => {
                if !center.is_valid() {
                    return Err(HarvestError::InvalidScope(format!(
                        "center ({}, {}) is out of range",
                        center.lat, center.lng
                    )));
                }
                let radius_m = check_radius(*radius_m)?;
                Ok(ResolvedLocation::exact(LocationBias::Circle {
                    center: *center,
                    radius_m,
                }))
            }
            SearchScope::Rectangle { bounds } => {
                if !bounds.low.is_valid() || !bounds.high.is_valid() {
                    return Err(HarvestError::InvalidScope("rectangle corner out of range".into()));
                }
                if bounds.low.lat > bounds.high.lat {
                    return Err(HarvestError::InvalidScope(
                        "rectangle south-west corner is north of its north-east corner".into(),
                    ));
                }
                Ok(ResolvedLocation::exact(LocationBias::Rectangle { bounds: *bounds }))
            }
            SearchScope::Admin { kind, id } => {
                let (center, degraded) = match kind {
                    AdminKind::Subdistrict => (self.subdistrict_center(id)?, false),
                    AdminKind::District => (self.district_center(id)?, false),
                    AdminKind::Province => self.province_center(id, best_effort)?,
                };
                let radius_m = match radius_override_m {
                    Some(r) => check_radius(r)?,
                    None => self.policy.radius_for(*kind),
                };
                debug!(
                    "Resolved {} {} to ({}, {}) r={}m",
                    kind, id, center.lat, center.lng, radius_m
                );

                Ok(ResolvedLocation {
                    bias: LocationBias::Circle { center, radius_m },
                    degraded,
                    province_name: self.registry.province_of(id).map(|p| p.name_th.clone()),
                })
            }
        }
    }

    fn subdistrict_center(&self, id: &str) -> Result<GeoPoint, HarvestError> {
        self.registry
            .get(AdminKind::Subdistrict, id)
            .and_then(|unit| unit.center)
            .ok_or_else(|| HarvestError::UnresolvedLocation(format!("subdistrict {}", id)))
    }

    /// Stored center, else the centroid of child sub-district centers
    fn district_center(&self, id: &str) -> Result<GeoPoint, HarvestError> {
        if let Some(center) = self
            .registry
            .get(AdminKind::District, id)
            .and_then(|unit| unit.center)
        {
            return Ok(center);
        }

        let points: Vec<Point<f64>> = self
            .registry
            .children(id)
            .filter(|unit| unit.kind == AdminKind::Subdistrict)
            .filter_map(|unit| unit.center)
            .map(|c| Point::new(c.lng, c.lat))
            .collect();

        MultiPoint::from(points)
            .centroid()
            .map(|p| GeoPoint::new(p.y(), p.x()))
            .ok_or_else(|| HarvestError::UnresolvedLocation(format!("district {}", id)))
    }

    fn province_center(
        &self,
        id: &str,
        best_effort: bool,
    ) -> Result<(GeoPoint, bool), HarvestError> {
        let stored = self
            .registry
            .get(AdminKind::Province, id)
            .and_then(|unit| unit.center);
        if let Some(center) = stored.or_else(|| province_center(id)) {
            return Ok((center, false));
        }

        match (best_effort, self.fallback_center) {
            (true, Some(fallback)) => {
                warn!(
                    "Province {} has no reference center; using degraded fallback ({}, {})",
                    id, fallback.lat, fallback.lng
                );
                Ok((fallback, true))
            }
            _ => Err(HarvestError::UnresolvedLocation(format!("province {}", id))),
        }
    }
}

fn check_radius(radius_m: f64) -> Result<f64, HarvestError> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(radius_m)
    } else {
        Err(HarvestError::InvalidScope(format!("radius {} must be positive", radius_m)))
    }
}
