use async_trait::async_trait;

use super::chat::Prompt;
use super::{parse_model_json, LlmClient, OutfitJudge};
use crate::error::LlmError;
use crate::models::{OutfitCandidate, OutfitScore, Slot, StylePreferences};

#[async_trait]
impl OutfitJudge for LlmClient {
    async fn judge(
        &self,
        outfit: &OutfitCandidate,
        preferences: &StylePreferences,
    ) -> Result<OutfitScore, LlmError> {
        let prompt = Prompt::user(build_score_prompt(outfit, preferences)).with_temperature(0.0);
        let text = self.complete(&prompt).await?;
        parse_outfit_score(&text)
    }
}

/// Scoring prompt listing every slot and the request context.
pub fn build_score_prompt(outfit: &OutfitCandidate, preferences: &StylePreferences) -> String {
    let describe = |slot: Slot| -> String {
        outfit
            .pieces()
            .into_iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, item)| item.tags.description.clone())
            .unwrap_or_else(|| "none".to_string())
    };
    let context = |value: &Option<String>| -> String {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or("not specified")
            .to_string()
    };

    format!(
        "Rate this outfit for the given scenario.\n\n\
         Outfit:\n\
         Top: {top}\n\
         Bottom: {bottom}\n\
         Footwear: {shoes}\n\
         Outerwear: {outerwear}\n\n\
         Occasion: {occasion}\n\
         Weather: {weather}\n\
         User Style Preference: {style}\n\n\
         Return ONLY JSON with:\n\
         {{\n  \"color_harmony\": int (1-10),\n  \"occasion_fit\": int (1-10),\n  \
         \"style_alignment\": int (1-10),\n  \"weather_suitability\": int (1-10),\n  \
         \"overall_score\": float,\n  \"reason\": \"short explanation\"\n}}",
        top = describe(Slot::Top),
        bottom = describe(Slot::Bottom),
        shoes = describe(Slot::Shoes),
        outerwear = describe(Slot::Outerwear),
        occasion = context(&preferences.occasion),
        weather = context(&preferences.weather),
        style = context(&preferences.style_pref),
    )
}

pub fn parse_outfit_score(content: &str) -> Result<OutfitScore, LlmError> {
    let score: OutfitScore = parse_model_json(content)?;
    if !score.overall_score.is_finite() {
        return Err(LlmError::malformed("overall_score is not a finite number", content));
    }
    Ok(score)
}
