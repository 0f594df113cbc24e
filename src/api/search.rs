use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::{bad_request, llm_error, ApiError};
use crate::models::{ClothingItem, PreferencesResponse, StyleSearchResponse, TextQuery};
use crate::state::AppState;

/// GET /api/search/style?query= - Wardrobe items closest to a free-text description
pub async fn style_search(
    State(state): State<AppState>,
    Query(q): Query<TextQuery>,
) -> Result<Json<StyleSearchResponse>, ApiError> {
    let query = q.query.trim();
    if query.is_empty() {
        return Err(bad_request("Query is required"));
    }

    let results: Vec<ClothingItem> = run_style_search(&state, query)
        .await?
        .into_iter()
        .flatten()
        .collect();
    tracing::info!("Style search {query:?}: {} item(s)", results.len());

    Ok(Json(StyleSearchResponse {
        message: format!("Found {} matching item(s)", results.len()),
        count: results.len(),
        results,
    }))
}

/// Embed the query, rank the vector index, and look the hits up in the store.
///
/// Hits whose item no longer exists come back as `None`, ranked order kept.
pub(crate) async fn run_style_search(
    state: &AppState,
    query: &str,
) -> Result<Vec<Option<ClothingItem>>, ApiError> {
    let embedding = state
        .embedder
        .embed(&[query.to_string()])
        .await
        .map_err(llm_error)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            (
                StatusCode::BAD_GATEWAY,
                "Embedder returned no vector".to_string(),
            )
        })?;

    let ids: Vec<String> = state
        .vectors
        .search(&embedding, state.config.search_limit)
        .into_iter()
        .map(|hit| hit.item_id)
        .collect();

    Ok(state.items.get_many(&ids))
}

/// GET /api/preferences?query= - Occasion, weather and style from free text
pub async fn extract_preferences(
    State(state): State<AppState>,
    Query(q): Query<TextQuery>,
) -> Result<Json<PreferencesResponse>, ApiError> {
    let query = q.query.trim();
    if query.is_empty() {
        return Err(bad_request("Query is required"));
    }

    let preferences = state.preferences.extract_preferences(query).await;
    Ok(Json(PreferencesResponse {
        message: "Preferences extracted".to_string(),
        preferences,
    }))
}
