use async_trait::async_trait;
use serde::Deserialize;

use super::chat::Prompt;
use super::{parse_model_json, LlmClient, PreferenceExtractor};
use crate::error::LlmError;
use crate::models::StylePreferences;

const PREFERENCES_SYSTEM_PROMPT: &str =
    "You are a fashion assistant that extracts style preferences from text. Respond ONLY with valid JSON.";

#[async_trait]
impl PreferenceExtractor for LlmClient {
    async fn extract_preferences(&self, query: &str) -> StylePreferences {
        let prompt = Prompt::user(build_preferences_prompt(query))
            .with_system(PREFERENCES_SYSTEM_PROMPT)
            .with_temperature(0.1);

        let result = self
            .complete(&prompt)
            .await
            .and_then(|text| parse_preferences(&text));

        match result {
            Ok(preferences) => {
                tracing::info!("Extracted style preferences: {:?}", preferences);
                preferences
            }
            Err(e) => {
                tracing::warn!("Preference extraction failed, continuing without: {e}");
                StylePreferences::default()
            }
        }
    }
}

fn build_preferences_prompt(query: &str) -> String {
    let query = query.replace('"', "'");
    format!(
        "Extract style preferences from the following query. Return ONLY valid JSON with these fields:\n\
         {{\n    \"occasion\": \"casual/formal/business/party/date/wedding/workout/beach or null if not specified\",\n    \
         \"weather\": \"warm/cold/hot/rainy/snowy/sunny/windy or null if not specified\",\n    \
         \"style_pref\": \"minimalist/bohemian/sporty/business/casual/elegant/streetwear or null if not specified\"\n}}\n\n\
         Query: \"{query}\""
    )
}

#[derive(Deserialize)]
struct RawPreferences {
    #[serde(default)]
    occasion: Option<String>,
    #[serde(default)]
    weather: Option<String>,
    #[serde(default)]
    style_pref: Option<String>,
}

/// Parse model output, normalizing placeholder answers ("null", "none", "") to `None`.
pub fn parse_preferences(content: &str) -> Result<StylePreferences, LlmError> {
    let raw: RawPreferences = parse_model_json(content)?;
    Ok(StylePreferences {
        occasion: normalize(raw.occasion),
        weather: normalize(raw.weather),
        style_pref: normalize(raw.style_pref),
    })
}

fn normalize(value: Option<String>) -> Option<String> {
    let value = value?.trim().to_lowercase();
    match value.as_str() {
        "" | "null" | "none" | "n/a" | "not specified" => None,
        _ => Some(value),
    }
}
