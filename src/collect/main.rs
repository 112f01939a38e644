//! Batch harvest tool.
//!
//! Resolves a scope and category, runs the harvest engine and writes the
//! enriched places to a CSV file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use poi_harvest::config::{api_key_from_env, HarvestConfig, API_KEY_VARS};
use poi_harvest::harvest::{HarvestSettings, Progress, QueryStream};
use poi_harvest::location::LocationResolver;
use poi_harvest::models::{GeoBox, GeoPoint, ScopeInput};
use poi_harvest::places::HttpPlacesClient;
use poi_harvest::terms::TermCatalog;
use poi_harvest::{AdminRegistry, EnrichedRecord, HarvestRequest, Harvester, QueryText};

#[derive(Parser, Debug)]
#[command(name = "collect")]
#[command(about = "Harvest points of interest from the Places API into a CSV file")]
struct Args {
    /// Category key from the terms file, or a custom term
    #[arg(long)]
    term: Option<String>,

    /// Literal search text; bypasses the terms file
    #[arg(long, conflicts_with = "term")]
    freetext: Option<String>,

    /// Result language, e.g. th or en (defaults to the config value)
    #[arg(long)]
    language: Option<String>,

    /// CLDR region code, e.g. TH (defaults to the config value)
    #[arg(long)]
    region: Option<String>,

    #[command(flatten)]
    scope: ScopeArgs,

    /// Radius in meters for --center
    #[arg(long)]
    radius_m: Option<f64>,

    /// Override the default radius of an administrative scope, in kilometers
    #[arg(long)]
    radius_km: Option<f64>,

    /// Fall back to the configured reference point for unknown provinces
    #[arg(long)]
    best_effort: bool,

    /// Do not ask upstream to filter strictly by included type
    #[arg(long)]
    no_strict_types: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Terms file mapping categories to types and keywords
    #[arg(long, default_value = "config/terms.toml")]
    terms: PathBuf,

    /// Directory holding provinces.json, amphoes.json and tambons.json
    #[arg(long, default_value = "admin_areas")]
    areas_dir: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = "data/export.csv")]
    out: PathBuf,
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct ScopeArgs {
    /// Circle center "lat,lng" (requires --radius-m)
    #[arg(long, value_parser = parse_center, requires = "radius_m")]
    center: Option<GeoPoint>,

    /// Rectangle restriction "sw_lat,sw_lng,ne_lat,ne_lng"
    #[arg(long, value_parser = parse_bbox)]
    bbox: Option<GeoBox>,

    /// Two-digit province code
    #[arg(long)]
    province: Option<String>,

    /// Four-digit district (amphoe) code
    #[arg(long)]
    district: Option<String>,

    /// Six-digit sub-district (tambon) code
    #[arg(long)]
    subdistrict: Option<String>,
}

const COLUMNS: &[&str] = &[
    "name",
    "formatted_address",
    "lat",
    "lng",
    "website",
    "phone_national",
    "phone_international",
    "types",
    "place_id",
    "resource_name",
    "google_maps_uri",
    "included_type",
    "source_keyword",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    name: Option<&'a str>,
    formatted_address: Option<&'a str>,
    lat: Option<f64>,
    lng: Option<f64>,
    website: Option<&'a str>,
    phone_national: Option<&'a str>,
    phone_international: Option<&'a str>,
    types: String,
    place_id: &'a str,
    resource_name: Option<&'a str>,
    google_maps_uri: Option<&'a str>,
    included_type: Option<&'a str>,
    source_keyword: &'a str,
}

impl<'a> From<&'a EnrichedRecord> for CsvRow<'a> {
    fn from(r: &'a EnrichedRecord) -> Self {
        Self {
            name: r.name.as_deref(),
            formatted_address: r.formatted_address.as_deref(),
            lat: r.location.map(|l| l.lat),
            lng: r.location.map(|l| l.lng),
            website: r.website.as_deref(),
            phone_national: r.phone_national.as_deref(),
            phone_international: r.phone_international.as_deref(),
            types: r.types.join("|"),
            place_id: &r.place_id,
            resource_name: r.resource_name.as_deref(),
            google_maps_uri: r.google_maps_uri.as_deref(),
            included_type: r.included_type.as_deref(),
            source_keyword: &r.source_keyword,
        }
    }
}

/// Progress bar over the enrichment phase
struct BarProgress {
    bar: ProgressBar,
}

impl Progress for BarProgress {
    fn stream_started(&self, stream: &QueryStream, index: usize, total: usize) {
        info!(
            "Query {}/{}: '{}' [{}]",
            index + 1,
            total,
            stream.keyword,
            stream.included_type.as_deref().unwrap_or("any type")
        );
    }

    fn enrichment_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("Fetching details");
    }

    fn record_enriched(&self) {
        self.bar.inc(1);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = HarvestConfig::load_or_default(args.config.as_ref())?;
    let api_key = api_key_from_env().with_context(|| {
        format!("Missing API key (set one of {})", API_KEY_VARS.join(", "))
    })?;

    let terms = Arc::new(TermCatalog::load_from_file(&args.terms)?);
    let registry = Arc::new(AdminRegistry::load_dir(&args.areas_dir)?);
    let client = HttpPlacesClient::new(
        &api_key,
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    let harvester = Harvester::new(
        client,
        terms,
        LocationResolver::new(registry, config.radius, config.fallback_center),
        HarvestSettings::from(&config),
    );

    let scope = ScopeInput {
        center: args.scope.center,
        radius_m: args.radius_m,
        bbox: args.scope.bbox,
        province_id: args.scope.province,
        district_id: args.scope.district,
        subdistrict_id: args.scope.subdistrict,
    }
    .into_scope()?;

    let language = args.language.unwrap_or_else(|| config.search.language.clone());
    let mut request = HarvestRequest::new(
        scope,
        QueryText::from_parts(args.term.as_deref(), args.freetext.as_deref()),
        &language,
    );
    request.region = Some(args.region.unwrap_or_else(|| config.search.region.clone()));
    request.radius_override_m = args.radius_km.map(|km| km * 1000.0);
    request.best_effort = args.best_effort;
    request.strict_types = !args.no_strict_types;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    let progress = BarProgress { bar };

    let report = harvester.harvest_with(&request, &progress).await?;
    progress.bar.finish_and_clear();

    if report.degraded {
        info!("Location was resolved from the fallback reference point; results are approximate");
    }
    if report.records.is_empty() {
        info!("No results from text search");
    }

    write_csv(&args.out, &report.records)?;
    info!(
        "Wrote {} rows to {} ({} enrichment failures)",
        report.records.len(),
        args.out.display(),
        report.stats.enrichment_failures
    );

    Ok(())
}

/// Write records as UTF-8 CSV with a byte-order mark, header always present
fn write_csv(path: &Path, records: &[EnrichedRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(b"\xEF\xBB\xBF")?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_center(s: &str) -> Result<GeoPoint, String> {
    match parse_floats(s)?.as_slice() {
        [lat, lng] => Ok(GeoPoint::new(*lat, *lng)),
        _ => Err("expected \"lat,lng\"".to_string()),
    }
}

fn parse_bbox(s: &str) -> Result<GeoBox, String> {
    match parse_floats(s)?.as_slice() {
        [sw_lat, sw_lng, ne_lat, ne_lng] => Ok(GeoBox::new(*sw_lat, *sw_lng, *ne_lat, *ne_lng)),
        _ => Err("expected \"sw_lat,sw_lng,ne_lat,ne_lng\"".to_string()),
    }
}

fn parse_floats(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number '{}': {}", p.trim(), e))
        })
        .collect()
}
