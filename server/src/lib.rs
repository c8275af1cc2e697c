use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use emotion_core::engine::DEFAULT_SEARCH_LIMIT;
use emotion_core::{CountResult, DistributionReport, FormattedRow, QueryEngine, SearchResult};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod args;
pub mod mcp;

use args::parse_int;

#[derive(Deserialize)]
pub struct SampleParams {
    pub n: Option<String>,
}

#[derive(Deserialize)]
pub struct CountParams {
    #[serde(default)]
    pub emotion: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub limit: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
}

pub fn build_app(engine: QueryEngine) -> Router {
    let app_state = AppState { engine: Arc::new(engine) };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/sample", get(sample_handler))
        .route("/count", get(count_handler))
        .route("/search", get(search_handler))
        .route("/distribution", get(distribution_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn sample_handler(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> Json<Vec<FormattedRow>> {
    let n = params.n.as_deref().and_then(parse_int).unwrap_or(0);
    Json(state.engine.sample(n))
}

pub async fn count_handler(
    State(state): State<AppState>,
    Query(params): Query<CountParams>,
) -> Json<CountResult> {
    Json(state.engine.count_by_emotion(&params.emotion))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResult> {
    let limit = params.limit.as_deref().and_then(parse_int).unwrap_or(DEFAULT_SEARCH_LIMIT);
    Json(state.engine.search_text(&params.query, limit))
}

pub async fn distribution_handler(State(state): State<AppState>) -> Json<DistributionReport> {
    Json(state.engine.distribution_analysis())
}
