//! Category → included-types and keywords mapping.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Reserved key used when a category is not configured
pub const OTHER_KEY: &str = "other";

/// One configured category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    #[serde(default)]
    pub included_types: Vec<String>,
    #[serde(default)]
    pub keywords_th: Vec<String>,
    #[serde(default)]
    pub keywords_en: Vec<String>,
}

/// Included types and keywords resolved for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTerms {
    pub included_types: Vec<String>,
    pub keywords: Vec<String>,
}

/// Catalogue entry as listed to clients
#[derive(Debug, Clone, Serialize)]
pub struct TermSummary {
    pub key: String,
    pub label_th: String,
    pub included_types: Vec<String>,
}

/// Category catalogue loaded from a TOML file of `[key]` tables.
#[derive(Debug, Clone, Default)]
pub struct TermCatalog {
    entries: BTreeMap<String, TermEntry>,
}

impl TermCatalog {
    pub fn parse(content: &str) -> Result<Self> {
        let entries: BTreeMap<String, TermEntry> =
            toml::from_str(content).context("Failed to parse terms file")?;
        Ok(Self { entries })
    }

    /// Load the catalogue. A missing file is a configuration gap, not an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Terms file not found: {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read terms file: {}", path.display()))?;
        let catalog = Self::parse(&content)?;
        info!("Loaded {} term mappings", catalog.entries.len());
        Ok(catalog)
    }

    /// Resolve a category for a language.
    ///
    /// Keys are tried exact, capitalized, then lowercased before falling back
    /// to the `other` entry. Thai languages prefer Thai keywords.
    pub fn resolve(&self, category: &str, language: &str) -> ResolvedTerms {
        let entry = self
            .entries
            .get(category)
            .or_else(|| self.entries.get(&capitalize(category)))
            .or_else(|| self.entries.get(&category.to_lowercase()))
            .or_else(|| {
                debug!("No term mapping for '{}', using '{}'", category, OTHER_KEY);
                self.entries.get(OTHER_KEY)
            });

        let Some(entry) = entry else {
            return ResolvedTerms::default();
        };

        let (preferred, fallback) = if language.starts_with("th") {
            (&entry.keywords_th, &entry.keywords_en)
        } else {
            (&entry.keywords_en, &entry.keywords_th)
        };
        let keywords = if preferred.is_empty() {
            fallback.clone()
        } else {
            preferred.clone()
        };

        ResolvedTerms {
            included_types: entry.included_types.clone(),
            keywords,
        }
    }

    pub fn summaries(&self) -> Vec<TermSummary> {
        self.entries
            .iter()
            .map(|(key, entry)| TermSummary {
                key: key.clone(),
                label_th: entry
                    .keywords_th
                    .first()
                    .cloned()
                    .unwrap_or_else(|| key.clone()),
                included_types: entry.included_types.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First character uppercased, the rest lowercased
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
