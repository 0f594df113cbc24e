use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::LlmError;

/// One non-streaming chat completion: optional system turn, a user turn and
/// an optional image attached to the user turn.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
    pub image: Option<ImageAttachment>,
    pub temperature: f32,
}

impl Prompt {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: None,
            user: text.into(),
            image: None,
            temperature: 0.2,
        }
    }

    pub fn with_system(mut self, text: impl Into<String>) -> Self {
        self.system = Some(text.into());
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Base64-encoded image bytes plus their MIME type.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime: String,
    pub base64: String,
}

impl ImageAttachment {
    /// Sniff the MIME type from the bytes, defaulting to JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime = infer::get(bytes)
            .map(|t| t.mime_type())
            .unwrap_or("image/jpeg");
        Self {
            mime: mime.to_string(),
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// Run a chat completion under the configured per-call deadline.
pub async fn complete(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &Prompt,
) -> Result<String, LlmError> {
    let secs = config.timeout_secs;
    let call = async {
        match config.provider.as_str() {
            "ollama" => call_ollama(client, config, prompt).await,
            "openai" => call_openai(client, config, prompt).await,
            other => Err(LlmError::UnknownProvider(other.to_string())),
        }
    };

    match tokio::time::timeout(Duration::from_secs(secs), call).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout { secs }),
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(LlmError::Status { status, body })
}

fn endpoint(config: &LlmConfig, path: &str) -> String {
    format!("{}{path}", config.base_url.trim_end_matches('/'))
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

fn ollama_request<'a>(config: &'a LlmConfig, prompt: &Prompt) -> OllamaChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(OllamaMessage {
            role: "system",
            content: system.clone(),
            images: Vec::new(),
        });
    }
    messages.push(OllamaMessage {
        role: "user",
        content: prompt.user.clone(),
        images: prompt.image.iter().map(|i| i.base64.clone()).collect(),
    });

    OllamaChatRequest {
        model: &config.chat_model,
        messages,
        stream: false,
        options: OllamaOptions {
            temperature: prompt.temperature,
        },
    }
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &Prompt,
) -> Result<String, LlmError> {
    let resp = client
        .post(endpoint(config, "/api/chat"))
        .json(&ollama_request(config, prompt))
        .send()
        .await?;

    let body: OllamaChatResponse = check_status(resp).await?.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: OpenAiContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAiPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiImageUrl },
}

#[derive(Serialize)]
struct OpenAiImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn openai_request<'a>(config: &'a LlmConfig, prompt: &Prompt) -> OpenAiChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(OpenAiMessage {
            role: "system",
            content: OpenAiContent::Text(system.clone()),
        });
    }

    let user_content = match &prompt.image {
        None => OpenAiContent::Text(prompt.user.clone()),
        Some(image) => OpenAiContent::Parts(vec![
            OpenAiPart::Text {
                text: prompt.user.clone(),
            },
            OpenAiPart::ImageUrl {
                image_url: OpenAiImageUrl {
                    url: image.data_url(),
                    detail: "high",
                },
            },
        ]),
    };
    messages.push(OpenAiMessage {
        role: "user",
        content: user_content,
    });

    OpenAiChatRequest {
        model: &config.chat_model,
        messages,
        temperature: prompt.temperature,
    }
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &Prompt,
) -> Result<String, LlmError> {
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let resp = client
        .post(endpoint(config, "/v1/chat/completions"))
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&openai_request(config, prompt))
        .send()
        .await?;

    let body: OpenAiChatResponse = check_status(resp).await?.json().await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::malformed("response contained no message content", ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0]
    }

    #[test]
    fn test_attachment_sniffs_png() {
        let image = ImageAttachment::from_bytes(&png_bytes());
        assert_eq!(image.mime, "image/png");
        assert!(image.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_attachment_defaults_to_jpeg() {
        let image = ImageAttachment::from_bytes(b"opaque");
        assert_eq!(image.mime, "image/jpeg");
    }

    #[test]
    fn test_openai_request_with_image_uses_content_parts() {
        let config = LlmConfig::default();
        let prompt = Prompt::user("describe")
            .with_system("be strict")
            .with_image(ImageAttachment::from_bytes(&png_bytes()));
        let value = serde_json::to_value(openai_request(&config, &prompt)).unwrap();

        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "be strict");
        let parts = &value["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["detail"], "high");
    }

    #[test]
    fn test_openai_request_text_only_is_plain_string() {
        let config = LlmConfig::default();
        let value = serde_json::to_value(openai_request(&config, &Prompt::user("hi"))).unwrap();
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_ollama_request_attaches_raw_base64() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            ..LlmConfig::default()
        };
        let image = ImageAttachment::from_bytes(&png_bytes());
        let expected = image.base64.clone();
        let prompt = Prompt::user("tag this").with_image(image).with_temperature(0.0);
        let value = serde_json::to_value(ollama_request(&config, &prompt)).unwrap();

        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["images"][0], expected);
        assert_eq!(value["options"]["temperature"], 0.0);
    }

    #[test]
    fn test_ollama_text_message_omits_images() {
        let config = LlmConfig::default();
        let value = serde_json::to_value(ollama_request(&config, &Prompt::user("x"))).unwrap();
        assert!(value["messages"][0].get("images").is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:8034/".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(
            endpoint(&config, "/v1/chat/completions"),
            "http://localhost:8034/v1/chat/completions"
        );
    }
}
