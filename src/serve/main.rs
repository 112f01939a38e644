//! HTTP service for interactive place searches.
//!
//! Exposes the term catalogue and administrative areas for pickers, plus a
//! search endpoint that runs the harvest engine for one area and category.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use poi_harvest::config::{api_key_from_env, HarvestConfig, API_KEY_VARS};
use poi_harvest::harvest::HarvestSettings;
use poi_harvest::location::LocationResolver;
use poi_harvest::models::AdminUnit;
use poi_harvest::places::HttpPlacesClient;
use poi_harvest::terms::{TermCatalog, TermSummary};
use poi_harvest::{AdminKind, AdminRegistry, Harvester};

mod search;
use search::{error_response, SearchBody, SearchResponse};

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Places search service")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    listen: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Terms file mapping categories to types and keywords
    #[arg(long, default_value = "config/terms.toml")]
    terms: PathBuf,

    /// Directory holding provinces.json, amphoes.json and tambons.json
    #[arg(long, default_value = "admin_areas")]
    areas_dir: PathBuf,
}

/// Application state shared across handlers
struct AppState {
    /// Absent when no API key is configured; searches then fail with 500
    harvester: Option<Harvester<HttpPlacesClient>>,
    terms: Arc<TermCatalog>,
    registry: Arc<AdminRegistry>,
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

    info!("Places Search Service");

    let config = HarvestConfig::load_or_default(args.config.as_ref())?;
    let terms = Arc::new(TermCatalog::load_from_file(&args.terms)?);
    let registry = Arc::new(AdminRegistry::load_dir(&args.areas_dir)?);
    info!(
        "Loaded {} categories, {} provinces, {} districts, {} sub-districts",
        terms.len(),
        registry.count(AdminKind::Province),
        registry.count(AdminKind::District),
        registry.count(AdminKind::Subdistrict)
    );

    let harvester = match api_key_from_env() {
        Some(key) => {
            let client = HttpPlacesClient::new(
                &key,
                &config.api.base_url,
                Duration::from_secs(config.api.timeout_secs),
            )?;
            Some(Harvester::new(
                client,
                terms.clone(),
                LocationResolver::new(registry.clone(), config.radius, config.fallback_center),
                HarvestSettings::from(&config),
            ))
        }
        None => {
            warn!(
                "No API key found in {}; searches will be rejected",
                API_KEY_VARS.join(" or ")
            );
            None
        }
    };

    let state = Arc::new(AppState {
        harvester,
        terms,
        registry,
    });

    // Build router
    let app = Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/meta/terms", get(terms_handler))
        .route("/meta/areas/provinces", get(provinces_handler))
        .route("/meta/areas/amphoes", get(amphoes_handler))
        .route("/meta/areas/tambons", get(tambons_handler))
        .route("/search", post(search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn terms_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TermSummary>> {
    Json(state.terms.summaries())
}

async fn provinces_handler(State(state): State<Arc<AppState>>) -> Json<Vec<AdminUnit>> {
    Json(
        state
            .registry
            .units(AdminKind::Province)
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct AmphoeParams {
    province_id: String,
}

async fn amphoes_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AmphoeParams>,
) -> Json<Vec<AdminUnit>> {
    Json(children_of(&state.registry, &params.province_id, AdminKind::District))
}

#[derive(Debug, Deserialize)]
struct TambonParams {
    amphoe_id: String,
}

async fn tambons_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TambonParams>,
) -> Json<Vec<AdminUnit>> {
    Json(children_of(&state.registry, &params.amphoe_id, AdminKind::Subdistrict))
}

fn children_of(registry: &AdminRegistry, parent_id: &str, kind: AdminKind) -> Vec<AdminUnit> {
    registry
        .children(parent_id)
        .filter(|unit| unit.kind == kind)
        .cloned()
        .collect()
}

/// Run one harvest for an area and category
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let harvester = state.harvester.as_ref().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Missing API key; set {}", API_KEY_VARS.join(" or ")),
        )
    })?;

    let request = body.into_request().map_err(|e| error_response(&e))?;
    info!("Search {} for {:?}", request.scope.describe(), request.query);

    match harvester.harvest(&request).await {
        Ok(report) => Ok(Json(SearchResponse::from(report))),
        Err(e) => {
            if !e.is_request_error() {
                error!("Search failed: {}", e);
            }
            Err(error_response(&e))
        }
    }
}
