use std::path::Path;

use async_trait::async_trait;

use super::chat::{ImageAttachment, Prompt};
use super::{parse_model_json, LlmClient, MetadataExtractor};
use crate::error::LlmError;
use crate::models::ClothingTags;

/// Model answers are occasionally non-conformant; one retry is allowed.
const MAX_TAGGING_ATTEMPTS: usize = 2;

const TAGGING_SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts structured metadata \
    from clothing images. Respond ONLY with valid JSON that matches the required schema.";

const TAGGING_PROMPT: &str = r#"You are a fashion tagging assistant.
Analyze the clothing item in this image and respond ONLY in JSON with the following fields.
Your response must be valid JSON and nothing else: no markdown, no extra text.

{
    "category": "",
    "sub_category": "",
    "primary_color": "",
    "secondary_color": "",
    "pattern": "",
    "formality_level": 1,
    "seasons": [],
    "occasions": [],
    "style_tags": [],
    "gender_target": "",
    "body_part": "",
    "description": ""
}

Definitions:
- category: shirt, t-shirt, jeans, trousers, kurta, blazer, shoes, slippers, sneaker, sandal, etc.
- sub_category: casual, formal, ethnic, sportswear.
- primary_color: dominant visible color. secondary_color: next most visible color, or "" if none.
- pattern: solid, striped, checked, floral, graphic.
- formality_level: integer, 1=very casual, 5=very formal.
- seasons: subset of ["summer", "winter", "monsoon", "all"].
- occasions: subset of ["office", "casual", "party", "date", "wedding", "travel", "festival"].
- style_tags: short free-form style words, e.g. "minimalist", "streetwear".
- gender_target: one of menswear, womenswear, unisex.
- body_part: one of upper, lower, footwear, outerwear, accessory.
- description: one or two sentences describing the item."#;

#[async_trait]
impl MetadataExtractor for LlmClient {
    async fn extract(&self, image_path: &Path) -> Result<ClothingTags, LlmError> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| LlmError::Image {
                path: image_path.to_path_buf(),
                source,
            })?;

        let prompt = Prompt::user(TAGGING_PROMPT)
            .with_system(TAGGING_SYSTEM_PROMPT)
            .with_image(ImageAttachment::from_bytes(&bytes))
            .with_temperature(0.1);

        tracing::info!("Tagging clothing image {}", image_path.display());

        let mut attempt = 1;
        loop {
            let text = self.complete(&prompt).await?;
            match parse_clothing_tags(&text) {
                Ok(tags) => return Ok(tags),
                Err(e) if attempt < MAX_TAGGING_ATTEMPTS => {
                    tracing::warn!(
                        "Tagging attempt {attempt} for {} returned unusable output: {e}",
                        image_path.display()
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parse and validate tagger output.
pub fn parse_clothing_tags(content: &str) -> Result<ClothingTags, LlmError> {
    let mut tags: ClothingTags = parse_model_json(content)?;
    tags.validate()
        .map_err(|reason| LlmError::malformed(reason, content))?;

    if tags
        .secondary_color
        .as_deref()
        .is_some_and(|c| c.trim().is_empty())
    {
        tags.secondary_color = None;
    }
    Ok(tags)
}
