use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{bad_request, ApiError};
use crate::config::LlmConfig;
use crate::models::LlmConfigUpdate;
use crate::state::AppState;

/// Config response with API key redacted
#[derive(Debug, Serialize)]
pub struct LlmConfigResponse {
    pub provider: String,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
    pub has_api_key: bool,
}

impl From<&LlmConfig> for LlmConfigResponse {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            base_url: config.base_url.clone(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
            timeout_secs: config.timeout_secs,
            has_api_key: config.api_key.is_some(),
        }
    }
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<LlmConfigResponse> {
    Json(LlmConfigResponse::from(&*state.llm_config.read()))
}

/// PUT /api/config - Update LLM config
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<LlmConfigUpdate>,
) -> Result<Json<LlmConfigResponse>, ApiError> {
    if let Some(provider) = &update.provider {
        if !matches!(provider.as_str(), "openai" | "ollama") {
            return Err(bad_request(format!(
                "Unknown provider {provider:?}, expected \"openai\" or \"ollama\""
            )));
        }
    }

    let mut config = state.llm_config.write();
    if let Some(provider) = update.provider {
        config.provider = provider;
    }
    // base_url is immutable at runtime (set via LLM_BASE_URL env var only)
    if let Some(chat_model) = update.chat_model {
        config.chat_model = chat_model;
    }
    if let Some(embedding_model) = update.embedding_model {
        config.embedding_model = embedding_model;
    }
    if let Some(api_key) = update.api_key {
        config.api_key = Some(api_key);
    }
    if let Some(secs) = update.timeout_secs {
        config.timeout_secs = secs.clamp(1, 300);
    }
    tracing::info!("LLM config updated: {} / {}", config.provider, config.chat_model);

    Ok(Json(LlmConfigResponse::from(&*config)))
}
