//! API Routes for Bookshelf
//!
//! This module combines all API routes into a single router.

mod authors;
pub mod status;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// Build the complete API router.
///
/// Route structure:
/// - /api/v1 - API root listing the resource collections (public)
/// - /api/v1/authors/* - Author CRUD (token-authenticated, policy-checked)
/// - /health, /health/live - Health checks (public)
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health endpoints (public)
        .merge(status::routes())
        .nest("/api/v1", v1_routes(state))
}

fn v1_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/authors", authors::routes(state))
}

/// GET /api/v1
async fn api_root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "authors": state.authors.endpoint().as_str() }))
}
