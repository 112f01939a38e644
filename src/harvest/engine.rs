use futures::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::enrich::enrich_records;
use super::{plan_streams, search_pages, QueryStream, SeenPlaces};
use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::location::LocationResolver;
use crate::models::{EnrichedRecord, Provenance, SearchScope};
use crate::places::{PlacesApi, RetryPolicy, SearchTextRequest, MAX_PAGE_SIZE};
use crate::terms::TermCatalog;

/// Category used when a request names neither a term nor freetext
pub const DEFAULT_CATEGORY: &str = "restaurant";

/// What to search for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryText {
    /// A key into the term catalogue
    Category(String),
    /// A literal query, run once without a type filter
    Freetext(String),
}

impl QueryText {
    /// Freetext wins over a term; with neither, the default category is used.
    pub fn from_parts(term: Option<&str>, freetext: Option<&str>) -> Self {
        fn non_empty(s: Option<&str>) -> Option<&str> {
            s.map(str::trim).filter(|s| !s.is_empty())
        }

        match (non_empty(freetext), non_empty(term)) {
            (Some(text), _) => QueryText::Freetext(text.to_string()),
            (None, Some(term)) => QueryText::Category(term.to_string()),
            (None, None) => QueryText::Category(DEFAULT_CATEGORY.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub scope: SearchScope,
    pub query: QueryText,
    pub language: String,
    pub region: Option<String>,
    /// Replaces the policy radius for administrative scopes
    pub radius_override_m: Option<f64>,
    /// Allow an unknown province to fall back to the reference point
    pub best_effort: bool,
    /// Ask upstream to return only places of the included type
    pub strict_types: bool,
}

impl HarvestRequest {
    pub fn new(scope: SearchScope, query: QueryText, language: &str) -> Self {
        Self {
            scope,
            query,
            language: language.to_string(),
            region: None,
            radius_override_m: None,
            best_effort: false,
            strict_types: true,
        }
    }
}

/// Engine tuning, usually taken from `HarvestConfig`
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub page_size: u8,
    pub page_delay: Duration,
    pub enrich_concurrency: usize,
    pub retry: RetryPolicy,
}

impl From<&HarvestConfig> for HarvestSettings {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            page_size: config.search.page_size,
            page_delay: config.search.page_delay(),
            enrich_concurrency: config.search.enrich_concurrency,
            retry: config.retry.clone(),
        }
    }
}

/// Hooks for reporting progress of a long harvest.
pub trait Progress: Send + Sync {
    fn stream_started(&self, _stream: &QueryStream, _index: usize, _total: usize) {}
    fn enrichment_started(&self, _total: usize) {}
    fn record_enriched(&self) {}
}

impl Progress for () {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub streams: usize,
    pub pages: usize,
    /// Places returned across all pages, duplicates included
    pub hits: usize,
    pub duplicates: usize,
    /// Hits dropped for lack of an identifier
    pub rejected: usize,
    pub unique: usize,
    pub enrichment_failures: usize,
}

#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Unique places in first-seen order
    pub records: Vec<EnrichedRecord>,
    pub stats: RunStats,
    /// The location came from a best-effort fallback
    pub degraded: bool,
}

/// Runs harvest requests against a places API.
pub struct Harvester<A> {
    api: A,
    terms: Arc<TermCatalog>,
    locations: LocationResolver,
    settings: HarvestSettings,
}

impl<A: PlacesApi> Harvester<A> {
    pub fn new(
        api: A,
        terms: Arc<TermCatalog>,
        locations: LocationResolver,
        settings: HarvestSettings,
    ) -> Self {
        Self {
            api,
            terms,
            locations,
            settings,
        }
    }

    pub async fn harvest(&self, request: &HarvestRequest) -> Result<HarvestReport, HarvestError> {
        self.harvest_with(request, &()).await
    }

    /// Resolve, search every query stream, deduplicate and enrich.
    ///
    /// Location problems fail before any upstream call. A stream whose
    /// retries run out fails the whole request; a failed details call only
    /// leaves that record unenriched.
    pub async fn harvest_with<P>(
        &self,
        request: &HarvestRequest,
        progress: &P,
    ) -> Result<HarvestReport, HarvestError>
    where
        P: Progress + ?Sized,
    {
        let location = self.locations.resolve(
            &request.scope,
            request.radius_override_m,
            request.best_effort,
        )?;
        if location.degraded {
            warn!(
                "Harvesting {} around a fallback location; results are approximate",
                request.scope.describe()
            );
        }

        let streams = plan_streams(&self.terms, &request.query, &request.language);
        let searches = streams
            .iter()
            .map(|stream| -> Result<_, HarvestError> {
                let search = SearchTextRequest::new(&stream.keyword, &request.language)
                    .region(request.region.as_deref())
                    .included_type(stream.included_type.as_deref(), request.strict_types)
                    .location(&location.bias)
                    .page_size(self.settings.page_size.min(MAX_PAGE_SIZE));
                search
                    .validate()
                    .map_err(|e| HarvestError::InvalidScope(e.to_string()))?;
                Ok((stream, search))
            })
            .collect::<Result<Vec<_>, HarvestError>>()?;

        info!(
            "Harvesting {:?} in {} ({}): {} query streams",
            request.query,
            request.scope.describe(),
            request.language,
            searches.len()
        );

        let mut stats = RunStats {
            streams: searches.len(),
            ..Default::default()
        };
        let mut seen = SeenPlaces::new();
        let mut records = Vec::new();
        let total = searches.len();

        for (index, (stream, search)) in searches.into_iter().enumerate() {
            progress.stream_started(stream, index, total);
            let provenance = Provenance {
                keyword: stream.keyword.clone(),
                included_type: stream.included_type.clone(),
            };

            let pages = search_pages(
                &self.api,
                search,
                self.settings.page_delay,
                &self.settings.retry,
            );
            futures::pin_mut!(pages);

            while let Some(page) = pages.try_next().await? {
                stats.pages += 1;
                for place in page.places {
                    stats.hits += 1;
                    let hit = place.into_raw_hit(provenance.clone());
                    if seen.admit(&hit) {
                        if let Some(id) = hit.place_id().map(String::from) {
                            records.push(EnrichedRecord::from_hit(id, hit));
                        }
                    } else if hit.place_id().is_some() {
                        stats.duplicates += 1;
                    }
                }
            }
            debug!(
                "Stream {}/{} done, {} unique places so far",
                index + 1,
                total,
                seen.len()
            );
        }

        stats.rejected = seen.rejected();
        stats.unique = records.len();
        for record in &mut records {
            record.province = location.province_name.clone();
        }

        progress.enrichment_started(records.len());
        let (records, failures) = enrich_records(
            &self.api,
            records,
            &request.language,
            self.settings.enrich_concurrency,
            &self.settings.retry,
            progress,
        )
        .await;
        stats.enrichment_failures = failures;

        info!(
            "Harvest finished: {} pages, {} hits, {} unique, {} enrichment failures",
            stats.pages, stats.hits, stats.unique, stats.enrichment_failures
        );

        Ok(HarvestReport {
            records,
            stats,
            degraded: location.degraded,
        })
    }
}
