//! Deterministic stand-ins for the remote capabilities.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use wardrobe_stylist::config::Config;
use wardrobe_stylist::error::LlmError;
use wardrobe_stylist::llm::{
    Embedder, MetadataExtractor, OutfitExplainer, OutfitJudge, PreferenceExtractor,
};
use wardrobe_stylist::models::{
    BodyPart, ClothingItem, ClothingTags, GenderTarget, Occasion, OutfitCandidate, OutfitScore,
    Season, StylePreferences,
};
use wardrobe_stylist::state::AppState;

pub fn tags(body_part: &str, category: &str, color: &str, description: &str) -> ClothingTags {
    ClothingTags {
        category: category.to_string(),
        sub_category: "casual".to_string(),
        primary_color: color.to_string(),
        secondary_color: None,
        pattern: "solid".to_string(),
        formality_level: 3,
        seasons: BTreeSet::from([Season::All]),
        occasions: BTreeSet::from([Occasion::Casual, Occasion::Office]),
        style_tags: BTreeSet::from(["minimalist".to_string()]),
        gender_target: GenderTarget::Unisex,
        body_part: BodyPart::from(body_part.to_string()),
        description: description.to_string(),
    }
}

pub fn garment(id: &str, body_part: &str, category: &str, color: &str) -> ClothingItem {
    ClothingItem {
        id: id.to_string(),
        image_path: format!("/wardrobe/{id}.jpg"),
        tags: tags(body_part, category, color, &format!("{color} {category}")),
        added_at: None,
    }
}

/// Small wardrobe: two tops, two bottoms, one pair of shoes, one accessory.
pub fn sample_wardrobe() -> Vec<ClothingItem> {
    vec![
        garment("linen-shirt", "upper", "shirt", "white"),
        garment("wool-sweater", "upper", "sweater", "grey"),
        garment("chinos", "lower", "trousers", "beige"),
        garment("jeans", "lower", "jeans", "blue"),
        garment("loafers", "footwear", "loafers", "brown"),
        garment("belt", "accessory", "belt", "brown"),
    ]
}

/// Always returns the same tags.
pub struct FixedTagger(pub ClothingTags);

#[async_trait]
impl MetadataExtractor for FixedTagger {
    async fn extract(&self, _image_path: &Path) -> Result<ClothingTags, LlmError> {
        Ok(self.0.clone())
    }
}

/// Scores by "top+bottom" id pair; unlisted pairs get 5.0, listed failures time out.
#[derive(Default)]
pub struct TableJudge {
    pub scores: HashMap<String, f32>,
    pub fail: HashSet<String>,
    pub seen: Mutex<Vec<StylePreferences>>,
}

impl TableJudge {
    pub fn with_score(mut self, top: &str, bottom: &str, score: f32) -> Self {
        self.scores.insert(format!("{top}+{bottom}"), score);
        self
    }

    pub fn failing_all() -> Self {
        Self {
            fail: HashSet::from(["*".to_string()]),
            ..Self::default()
        }
    }
}

#[async_trait]
impl OutfitJudge for TableJudge {
    async fn judge(
        &self,
        outfit: &OutfitCandidate,
        preferences: &StylePreferences,
    ) -> Result<OutfitScore, LlmError> {
        self.seen.lock().push(preferences.clone());
        let key = format!("{}+{}", outfit.top.id, outfit.bottom.id);
        if self.fail.contains("*") || self.fail.contains(&key) {
            return Err(LlmError::Timeout { secs: 1 });
        }
        let overall = self.scores.get(&key).copied().unwrap_or(5.0);
        Ok(OutfitScore {
            color_harmony: Some(7.0),
            occasion_fit: Some(7.0),
            style_alignment: Some(7.0),
            weather_suitability: None,
            overall_score: overall,
            reason: format!("{key} scored {overall}"),
        })
    }
}

/// Returns fixed preferences, or the degraded all-`None` value.
pub struct FixedPreferences(pub StylePreferences);

#[async_trait]
impl PreferenceExtractor for FixedPreferences {
    async fn extract_preferences(&self, _query: &str) -> StylePreferences {
        self.0.clone()
    }
}

const VOCABULARY: &[&str] = &[
    "shirt", "sweater", "trousers", "jeans", "loafers", "white", "grey", "beige", "blue", "brown",
];

/// Bag-of-words vector over a fixed vocabulary.
pub fn keyword_vector(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    VOCABULARY
        .iter()
        .map(|w| if text.contains(w) { 1.0 } else { 0.0 })
        .collect()
}

pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::Timeout { secs: 1 })
    }
}

pub struct EchoExplainer;

#[async_trait]
impl OutfitExplainer for EchoExplainer {
    async fn explain(&self, outfit: &OutfitCandidate) -> Result<String, LlmError> {
        Ok(format!(
            "The {} pairs well with the {}.",
            outfit.top.tags.description, outfit.bottom.tags.description
        ))
    }
}

/// Application state rooted in `dir` with every remote capability mocked.
pub fn test_state(dir: &Path, judge: TableJudge) -> AppState {
    let config = Config {
        data_dir: dir.to_path_buf(),
        ..Config::default()
    };
    let mut state = AppState::new(config).unwrap();
    state.tagger = Arc::new(FixedTagger(tags("upper", "shirt", "white", "white shirt")));
    state.judge = Arc::new(judge);
    state.preferences = Arc::new(FixedPreferences(StylePreferences::default()));
    state.embedder = Arc::new(KeywordEmbedder);
    state.explainer = Arc::new(EchoExplainer);
    state
}
