//! HTTP surface.

pub mod config;
pub mod items;
pub mod outfits;
pub mod search;
pub mod upload;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::LlmError;
use crate::state::AppState;

/// Error half of every handler result.
pub type ApiError = (StatusCode, String);

/// Build the application router. `main` serves it; tests drive it directly.
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_mb * 1024 * 1024;
    let images = ServeDir::new(state.config.images_dir());

    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/analyze", post(upload::analyze_image))
        .route("/api/wardrobe", get(items::list_wardrobe))
        .route("/api/items", post(items::create_item))
        .route("/api/items/process", post(items::process_image))
        .route(
            "/api/items/{id}",
            get(items::get_item).delete(items::delete_item),
        )
        .route("/api/items/{id}/index", post(items::reindex_item))
        .route("/api/search/style", get(search::style_search))
        .route("/api/preferences", get(search::extract_preferences))
        .route("/api/outfits/categorize", post(outfits::categorize_items))
        .route("/api/outfits/generate", post(outfits::generate_outfits))
        .route("/api/outfits/score", post(outfits::score_outfits))
        .route("/api/outfits/recommend", post(outfits::recommend))
        .route("/api/outfits/explain", post(outfits::explain_outfit))
        .route(
            "/api/config",
            get(config::get_config).put(config::update_config),
        )
        .nest_service("/api/images", images)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "items": state.items.len(),
        "indexed": state.vectors.entry_count(),
    }))
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, msg.into())
}

pub(crate) fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

pub(crate) fn llm_error(err: LlmError) -> ApiError {
    tracing::warn!("Language model call failed: {err}");
    (err.status_code(), err.to_string())
}

pub(crate) fn internal(err: anyhow::Error) -> ApiError {
    tracing::error!("{err:#}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}
