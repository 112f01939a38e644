//! Administrative hierarchy: province → district → sub-district.

use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::{GeoBox, GeoPoint};

/// Level of an administrative unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminKind {
    /// Changwat (two-digit code)
    Province,
    /// Amphoe (four-digit code)
    District,
    /// Tambon (six-digit code)
    Subdistrict,
}

impl std::fmt::Display for AdminKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminKind::Province => write!(f, "province"),
            AdminKind::District => write!(f, "district"),
            AdminKind::Subdistrict => write!(f, "subdistrict"),
        }
    }
}

/// An administrative unit with Thai and English names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUnit {
    /// Hierarchical code; a child's code starts with its parent's
    pub id: String,
    pub kind: AdminKind,
    pub name_th: String,
    pub name_en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<GeoBox>,
}

#[derive(Debug, Deserialize)]
struct ProvinceRecord {
    id: String,
    #[serde(default)]
    name_th: String,
    #[serde(default)]
    name_en: String,
    center: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct DistrictRecord {
    id: String,
    province_id: String,
    #[serde(default)]
    name_th: String,
    #[serde(default)]
    name_en: String,
    center: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct SubdistrictRecord {
    id: String,
    amphoe_id: String,
    #[serde(default)]
    name_th: String,
    #[serde(default)]
    name_en: String,
    center: Option<GeoPoint>,
    /// [sw_lat, sw_lng, ne_lat, ne_lng]
    bbox: Option<[f64; 4]>,
}

/// Static lookup tables for the administrative hierarchy.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Debug, Default)]
pub struct AdminRegistry {
    units: Vec<AdminUnit>,
    /// (kind, id) → index into `units`
    by_id: HashMap<(AdminKind, String), usize>,
}

impl AdminRegistry {
    pub fn new(units: Vec<AdminUnit>) -> Self {
        let by_id = units
            .iter()
            .enumerate()
            .map(|(i, u)| ((u.kind, u.id.clone()), i))
            .collect();
        Self { units, by_id }
    }

    /// Load `provinces.json`, `amphoes.json` and `tambons.json` from a directory.
    /// A missing file yields an empty table for that level.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let provinces: Vec<ProvinceRecord> = load_table(&dir.join("provinces.json"))?;
        let districts: Vec<DistrictRecord> = load_table(&dir.join("amphoes.json"))?;
        let subdistricts: Vec<SubdistrictRecord> = load_table(&dir.join("tambons.json"))?;

        let mut units = Vec::with_capacity(provinces.len() + districts.len() + subdistricts.len());
        units.extend(provinces.into_iter().map(|p| AdminUnit {
            id: p.id,
            kind: AdminKind::Province,
            name_th: p.name_th,
            name_en: p.name_en,
            parent_id: None,
            center: p.center,
            bbox: None,
        }));
        units.extend(districts.into_iter().map(|d| AdminUnit {
            id: d.id,
            kind: AdminKind::District,
            name_th: d.name_th,
            name_en: d.name_en,
            parent_id: Some(d.province_id),
            center: d.center,
            bbox: None,
        }));
        units.extend(subdistricts.into_iter().map(|t| AdminUnit {
            id: t.id,
            kind: AdminKind::Subdistrict,
            name_th: t.name_th,
            name_en: t.name_en,
            parent_id: Some(t.amphoe_id),
            center: t.center,
            bbox: t.bbox.map(|[a, b, c, d]| GeoBox::new(a, b, c, d)),
        }));

        let registry = Self::new(units);
        info!(
            "Loaded admin areas from {}: {} provinces, {} districts, {} sub-districts",
            dir.display(),
            registry.count(AdminKind::Province),
            registry.count(AdminKind::District),
            registry.count(AdminKind::Subdistrict)
        );
        Ok(registry)
    }

    pub fn get(&self, kind: AdminKind, id: &str) -> Option<&AdminUnit> {
        self.by_id
            .get(&(kind, id.to_string()))
            .map(|&i| &self.units[i])
    }

    /// All units of one level, in load order
    pub fn units(&self, kind: AdminKind) -> impl Iterator<Item = &AdminUnit> {
        self.units.iter().filter(move |u| u.kind == kind)
    }

    /// Direct children of a unit
    pub fn children<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a AdminUnit> {
        self.units
            .iter()
            .filter(move |u| u.parent_id.as_deref() == Some(parent_id))
    }

    /// Province that contains the given unit, derived from the code prefix
    pub fn province_of(&self, id: &str) -> Option<&AdminUnit> {
        id.get(..2)
            .and_then(|prefix| self.get(AdminKind::Province, prefix))
    }

    pub fn count(&self, kind: AdminKind) -> usize {
        self.units(kind).count()
    }
}

fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("Admin table not found: {}", path.display());
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read admin table: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse admin table: {}", path.display()))
}
