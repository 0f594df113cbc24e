use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use super::upload::resolve_image_path;
use super::{bad_request, internal, llm_error, not_found, ApiError};
use crate::llm::embeddings::item_embedding_text;
use crate::models::{
    ClothingItem, ClothingTags, ItemCreatedResponse, NewItemRequest, ProcessRequest, ProcessResponse,
    WardrobeEntry,
};
use crate::state::AppState;

/// GET /api/wardrobe - Every saved item, reduced to what the grid needs
pub async fn list_wardrobe(State(state): State<AppState>) -> Json<Vec<WardrobeEntry>> {
    let entries = state
        .items
        .list()
        .into_iter()
        .map(|item| WardrobeEntry {
            id: item.id,
            image_path: item.image_path,
            body_part: item.tags.body_part,
            category: item.tags.category,
            added_at: item.added_at,
        })
        .collect();
    Json(entries)
}

/// POST /api/items - Save already-extracted tags as a wardrobe item
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<ItemCreatedResponse>), ApiError> {
    if req.image_path.trim().is_empty() {
        return Err(bad_request("image_path is required"));
    }
    req.tags.validate().map_err(bad_request)?;

    let item = save_item(&state, req.image_path, req.tags)?;
    let indexed = req.index && index_best_effort(&state, &item).await;

    Ok((
        StatusCode::CREATED,
        Json(ItemCreatedResponse {
            message: "Item saved".to_string(),
            item_id: item.id,
            image_path: item.image_path,
            indexed,
        }),
    ))
}

/// POST /api/items/process - Tag an uploaded image, save it, and index it
pub async fn process_image(
    State(state): State<AppState>,
    Json(req): Json<ProcessRequest>,
) -> Result<(StatusCode, Json<ProcessResponse>), ApiError> {
    let path = resolve_image_path(&state.config, &req.image_path)?;
    let tags = state.tagger.extract(&path).await.map_err(llm_error)?;

    let item = save_item(&state, path.display().to_string(), tags)?;
    let indexed = req.index && index_best_effort(&state, &item).await;
    tracing::info!(
        "Processed {} as {} ({:?})",
        item.image_path,
        item.id,
        item.tags.body_part
    );

    Ok((
        StatusCode::CREATED,
        Json(ProcessResponse {
            message: "Image processed and saved".to_string(),
            item,
            indexed,
        }),
    ))
}

/// GET /api/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClothingItem>, ApiError> {
    state.items.get(&id).map(Json).ok_or_else(|| not_found("Item"))
}

/// DELETE /api/items/{id} - Remove an item and its vector entry
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.items.remove(&id).map_err(internal)? {
        return Err(not_found("Item"));
    }
    if let Err(e) = state.vectors.delete_item(&id) {
        tracing::error!("Failed to drop vector for {id}: {e:#}");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/items/{id}/index - (Re)ingest an existing item into the vector index
pub async fn reindex_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let item = state.items.get(&id).ok_or_else(|| not_found("Item"))?;
    index_item(&state, &item).await?;
    Ok(StatusCode::OK)
}

fn save_item(
    state: &AppState,
    image_path: String,
    tags: ClothingTags,
) -> Result<ClothingItem, ApiError> {
    let item = ClothingItem {
        id: Uuid::new_v4().to_string(),
        image_path,
        tags,
        added_at: Some(Utc::now()),
    };
    state.items.insert(item.clone()).map_err(internal)?;
    Ok(item)
}

/// Embed an item's description and attributes and upsert it into the index.
pub(crate) async fn index_item(state: &AppState, item: &ClothingItem) -> Result<(), ApiError> {
    let text = item_embedding_text(&item.tags);
    let embedding = state
        .embedder
        .embed(&[text])
        .await
        .map_err(llm_error)?
        .into_iter()
        .next()
        .ok_or_else(|| internal(anyhow::anyhow!("Embedder returned no vector")))?;

    state
        .vectors
        .upsert(&item.id, &item.image_path, &item.tags.description, embedding)
        .map_err(internal)
}

/// Indexing after a save never undoes the save.
async fn index_best_effort(state: &AppState, item: &ClothingItem) -> bool {
    match index_item(state, item).await {
        Ok(()) => true,
        Err((_, msg)) => {
            tracing::warn!("Item {} saved but not indexed: {msg}", item.id);
            false
        }
    }
}
