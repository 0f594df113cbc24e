//! Language-model backed capabilities.
//!
//! Every remote capability is a trait so handlers and the scoring pipeline
//! can be driven by any implementation. [`LlmClient`] implements all of them
//! against an OpenAI-compatible or Ollama endpoint.

pub mod chat;
pub mod embeddings;
pub mod explain;
pub mod outfit_score;
pub mod preferences;
pub mod tagging;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::models::{ClothingTags, OutfitCandidate, OutfitScore, StylePreferences};

/// Tags a garment photo with structured metadata.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, image_path: &Path) -> Result<ClothingTags, LlmError>;
}

/// Rates one outfit for the given context.
#[async_trait]
pub trait OutfitJudge: Send + Sync {
    async fn judge(
        &self,
        outfit: &OutfitCandidate,
        preferences: &StylePreferences,
    ) -> Result<OutfitScore, LlmError>;
}

/// Turns free text into occasion / weather / style fields.
///
/// Never fails: an unusable answer degrades to all-`None`.
#[async_trait]
pub trait PreferenceExtractor: Send + Sync {
    async fn extract_preferences(&self, query: &str) -> StylePreferences;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Writes a friendly stylist explanation for an outfit.
#[async_trait]
pub trait OutfitExplainer: Send + Sync {
    async fn explain(&self, outfit: &OutfitCandidate) -> Result<String, LlmError>;
}

/// HTTP client bound to the shared, runtime-adjustable LLM config.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: Arc<RwLock<LlmConfig>>,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, config: Arc<RwLock<LlmConfig>>) -> Self {
        Self { http, config }
    }

    /// Snapshot of the current config; the lock is never held across a call.
    pub fn config(&self) -> LlmConfig {
        self.config.read().clone()
    }

    pub(crate) async fn complete(&self, prompt: &chat::Prompt) -> Result<String, LlmError> {
        let config = self.config();
        chat::complete(&self.http, &config, prompt).await
    }
}

/// Remove a leading `<think>...</think>` block some reasoning models emit.
fn strip_reasoning(content: &str) -> &str {
    match (content.find("<think>"), content.find("</think>")) {
        (Some(start), Some(end)) if start < end => &content[end + "</think>".len()..],
        _ => content,
    }
}

/// Outermost `{ ... }` span of `content`, if any.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Parse a JSON object out of model text into `T`.
///
/// Tolerates code fences and surrounding prose. Anything else is a
/// [`LlmError::MalformedOutput`] carrying the raw text.
pub fn parse_model_json<T: DeserializeOwned>(content: &str) -> Result<T, LlmError> {
    let body = strip_reasoning(content).trim();

    if let Ok(v) = serde_json::from_str::<T>(body) {
        return Ok(v);
    }

    let json_str = extract_json_object(body)
        .ok_or_else(|| LlmError::malformed("no JSON object in model output", content))?;

    serde_json::from_str::<T>(json_str).map_err(|e| LlmError::malformed(e.to_string(), content))
}
