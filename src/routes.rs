//! HTTP surface: `/search`, `/cities` and `/health`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::query::{QueryService, SearchParams};

/// Edge caches may keep a response for a day and serve it stale for an hour
/// while revalidating.
pub const CACHE_POLICY: &str = "s-maxage=86400, stale-while-revalidate=3600";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/cities", get(cities))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// Filtered, paginated facility search. Bad filter input yields an empty
/// result, never an error status.
async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let response = state.query.search(&params).await;
    ([(header::CACHE_CONTROL, CACHE_POLICY)], Json(response))
}

#[derive(Deserialize)]
struct CitiesQuery {
    pref: Option<String>,
}

#[derive(Serialize)]
struct CitiesResponse {
    items: Vec<String>,
}

/// Municipalities of a prefecture.
async fn cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> impl IntoResponse {
    let items = query
        .pref
        .as_deref()
        .map(|p| state.query.cities(p))
        .unwrap_or_default();
    ([(header::CACHE_CONTROL, CACHE_POLICY)], Json(CitiesResponse { items }))
}
