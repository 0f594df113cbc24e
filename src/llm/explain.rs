use async_trait::async_trait;

use super::chat::Prompt;
use super::{LlmClient, OutfitExplainer};
use crate::error::LlmError;
use crate::models::OutfitCandidate;

#[async_trait]
impl OutfitExplainer for LlmClient {
    async fn explain(&self, outfit: &OutfitCandidate) -> Result<String, LlmError> {
        let prompt = Prompt::user(build_explain_prompt(outfit)).with_temperature(0.7);
        let text = self.complete(&prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::malformed("empty explanation", text));
        }
        Ok(text.to_string())
    }
}

fn build_explain_prompt(outfit: &OutfitCandidate) -> String {
    let mut lines = String::new();
    for (slot, item) in outfit.pieces() {
        lines.push_str(&format!(
            "- {}: {} ({} {}, {})\n",
            slot.label(),
            item.tags.description,
            item.tags.primary_color,
            item.tags.category,
            item.tags.pattern
        ));
    }

    format!(
        "Create a friendly stylist explanation for this outfit:\n\n{lines}\n\
         Include:\n\
         - Why it works\n\
         - Color reasoning\n\
         - Style reasoning\n\
         - One optional alternative suggestion"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outfit::test_support::item;

    #[test]
    fn test_prompt_lists_present_pieces_only() {
        let outfit = OutfitCandidate::new(item("tee", "upper"), item("shorts", "lower"), None, None);
        let prompt = build_explain_prompt(&outfit);
        assert!(prompt.contains("- top: item tee (navy shirt, solid)"));
        assert!(prompt.contains("- bottom: item shorts"));
        assert!(!prompt.contains("- shoes:"));
        assert!(prompt.contains("Color reasoning"));
    }
}
