use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Embedder, LlmClient};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::models::ClothingTags;

/// Garment descriptions are short; this only guards against runaway model
/// output being fed back into the embedder.
const MAX_EMBED_CHARS: usize = 2_000;

/// Truncate `text` to at most `MAX_EMBED_CHARS`, splitting on a UTF-8 char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Text indexed for an item: its description plus the searchable attributes.
pub fn item_embedding_text(tags: &ClothingTags) -> String {
    let mut text = tags.description.trim().to_string();
    text.push_str(&format!(
        "\nCategory: {} ({})\nColors: {}",
        tags.category, tags.sub_category, tags.primary_color
    ));
    if let Some(secondary) = &tags.secondary_color {
        text.push_str(&format!(", {secondary}"));
    }
    text.push_str(&format!("\nPattern: {}", tags.pattern));
    if !tags.style_tags.is_empty() {
        let style: Vec<&str> = tags.style_tags.iter().map(String::as_str).collect();
        text.push_str(&format!("\nStyle: {}", style.join(", ")));
    }
    text
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let config = self.config();
        embed_batch(&self.http, &config, texts).await
    }
}

/// Generate embeddings for a batch of texts using the configured LLM provider.
pub async fn embed_batch(
    client: &reqwest::Client,
    config: &LlmConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, LlmError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let truncated: Vec<String> = texts
        .iter()
        .map(|t| truncate_for_embedding(t).to_string())
        .collect();

    let secs = config.timeout_secs;
    let call = async {
        match config.provider.as_str() {
            "ollama" => embed_ollama(client, config, &truncated).await,
            "openai" => embed_openai(client, config, &truncated).await,
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    };

    let embeddings = match tokio::time::timeout(Duration::from_secs(secs), call).await {
        Ok(result) => result?,
        Err(_) => return Err(LlmError::Timeout { secs }),
    };

    if embeddings.len() != texts.len() {
        return Err(LlmError::malformed(
            format!(
                "expected {} embeddings, received {}",
                texts.len(),
                embeddings.len()
            ),
            "",
        ));
    }
    Ok(embeddings)
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

async fn embed_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, LlmError> {
    let url = format!("{}/api/embed", config.base_url.trim_end_matches('/'));

    let req = OllamaEmbedRequest {
        model: &config.embedding_model,
        input: texts,
        truncate: true,
    };

    let resp = client.post(&url).json(&req).send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(LlmError::Status { status, body });
    }

    let body: OllamaEmbedResponse = resp.json().await?;
    Ok(body.embeddings)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

async fn embed_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, LlmError> {
    let url = format!("{}/v1/embeddings", config.base_url.trim_end_matches('/'));
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiEmbedRequest {
        model: &config.embedding_model,
        input: texts,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(LlmError::Status { status, body });
    }

    let body: OpenAiEmbedResponse = resp.json().await?;
    Ok(body.data.into_iter().map(|d| d.embedding).collect())
}
