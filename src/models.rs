use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Body-part vocabulary produced by the tagger.
///
/// The vocabulary is closed and matched exactly, so `"Upper"` or `" upper"`
/// are not `Upper`. Values outside it are kept verbatim in
/// [`BodyPart::Other`] so that a stored record round-trips unchanged. Such
/// items never land in an outfit slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BodyPart {
    Upper,
    Lower,
    Footwear,
    Outerwear,
    Accessory,
    Other(String),
}

impl From<String> for BodyPart {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "upper" => BodyPart::Upper,
            "lower" => BodyPart::Lower,
            "footwear" => BodyPart::Footwear,
            "outerwear" => BodyPart::Outerwear,
            "accessory" => BodyPart::Accessory,
            _ => BodyPart::Other(raw),
        }
    }
}

impl From<BodyPart> for String {
    fn from(part: BodyPart) -> Self {
        match part {
            BodyPart::Upper => "upper".to_string(),
            BodyPart::Lower => "lower".to_string(),
            BodyPart::Footwear => "footwear".to_string(),
            BodyPart::Outerwear => "outerwear".to_string(),
            BodyPart::Accessory => "accessory".to_string(),
            BodyPart::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Summer,
    Winter,
    Monsoon,
    #[serde(alias = "all-season", alias = "all seasons")]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    Office,
    Casual,
    Party,
    Date,
    Wedding,
    Travel,
    Festival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderTarget {
    Menswear,
    Womenswear,
    Unisex,
}

/// The twelve tag fields the metadata extractor fills in for one garment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingTags {
    pub category: String,
    pub sub_category: String,
    pub primary_color: String,
    /// Plain garments often have none; the model answers "" or null.
    #[serde(default)]
    pub secondary_color: Option<String>,
    pub pattern: String,
    /// 1 = very casual, 5 = very formal
    pub formality_level: u8,
    pub seasons: BTreeSet<Season>,
    pub occasions: BTreeSet<Occasion>,
    pub style_tags: BTreeSet<String>,
    pub gender_target: GenderTarget,
    pub body_part: BodyPart,
    pub description: String,
}

impl ClothingTags {
    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.formality_level) {
            return Err(format!(
                "formality_level must be between 1 and 5, got {}",
                self.formality_level
            ));
        }
        if self.category.trim().is_empty() {
            return Err("category is empty".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("description is empty".to_string());
        }
        Ok(())
    }
}

/// A tagged garment as persisted in the item store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub image_path: String,
    #[serde(flatten)]
    pub tags: ClothingTags,
    /// Set when the item is first saved to the wardrobe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

/// Outfit slot a garment can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Top,
    Bottom,
    Shoes,
    Outerwear,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Top, Slot::Bottom, Slot::Shoes, Slot::Outerwear];

    /// Slot for a body part; accessories and unknown values have none.
    pub fn for_body_part(part: &BodyPart) -> Option<Slot> {
        match part {
            BodyPart::Upper => Some(Slot::Top),
            BodyPart::Lower => Some(Slot::Bottom),
            BodyPart::Footwear => Some(Slot::Shoes),
            BodyPart::Outerwear => Some(Slot::Outerwear),
            BodyPart::Accessory | BodyPart::Other(_) => None,
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Slot::Top | Slot::Bottom)
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Top => "top",
            Slot::Bottom => "bottom",
            Slot::Shoes => "shoes",
            Slot::Outerwear => "outerwear",
        }
    }
}

/// Wardrobe partitioned by slot, input order preserved within each slot.
///
/// `top` and `bottom` are mandatory on the wire; the optional slots default
/// to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub top: Vec<ClothingItem>,
    pub bottom: Vec<ClothingItem>,
    #[serde(default)]
    pub shoes: Vec<ClothingItem>,
    #[serde(default)]
    pub outerwear: Vec<ClothingItem>,
}

impl SlotAssignment {
    pub fn get(&self, slot: Slot) -> &[ClothingItem] {
        match slot {
            Slot::Top => &self.top,
            Slot::Bottom => &self.bottom,
            Slot::Shoes => &self.shoes,
            Slot::Outerwear => &self.outerwear,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut Vec<ClothingItem> {
        match slot {
            Slot::Top => &mut self.top,
            Slot::Bottom => &mut self.bottom,
            Slot::Shoes => &mut self.shoes,
            Slot::Outerwear => &mut self.outerwear,
        }
    }

    pub fn counts(&self) -> BTreeMap<Slot, usize> {
        Slot::ALL.iter().map(|&s| (s, self.get(s).len())).collect()
    }

    /// Required slots that have no items.
    pub fn missing_required(&self) -> Vec<Slot> {
        Slot::ALL
            .iter()
            .copied()
            .filter(|s| s.is_required() && self.get(*s).is_empty())
            .collect()
    }
}

/// One outfit combination. Top and bottom are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitCandidate {
    pub top: ClothingItem,
    pub bottom: ClothingItem,
    #[serde(default)]
    pub shoes: Option<ClothingItem>,
    #[serde(default)]
    pub outerwear: Option<ClothingItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OutfitCandidate {
    pub fn new(
        top: ClothingItem,
        bottom: ClothingItem,
        shoes: Option<ClothingItem>,
        outerwear: Option<ClothingItem>,
    ) -> Self {
        Self {
            top,
            bottom,
            shoes,
            outerwear,
            score: None,
            reason: None,
        }
    }

    /// Present items paired with their slot, in slot order.
    pub fn pieces(&self) -> Vec<(Slot, &ClothingItem)> {
        let mut pieces = vec![(Slot::Top, &self.top), (Slot::Bottom, &self.bottom)];
        if let Some(shoes) = &self.shoes {
            pieces.push((Slot::Shoes, shoes));
        }
        if let Some(outerwear) = &self.outerwear {
            pieces.push((Slot::Outerwear, outerwear));
        }
        pieces
    }
}

/// Structured context extracted from a free-text request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StylePreferences {
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub style_pref: Option<String>,
}

/// Judgement returned by the outfit scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitScore {
    #[serde(default)]
    pub color_harmony: Option<f32>,
    #[serde(default)]
    pub occasion_fit: Option<f32>,
    #[serde(default)]
    pub style_alignment: Option<f32>,
    #[serde(default)]
    pub weather_suitability: Option<f32>,
    pub overall_score: f32,
    #[serde(default)]
    pub reason: String,
}

// ─── Request / response types ────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub image_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub tags: ClothingTags,
    pub image_path: String,
}

/// Save-item request: the tags plus where the image lives.
#[derive(Debug, Clone, Deserialize)]
pub struct NewItemRequest {
    pub image_path: String,
    #[serde(flatten)]
    pub tags: ClothingTags,
    /// Also ingest into the vector index
    #[serde(default)]
    pub index: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemCreatedResponse {
    pub message: String,
    pub item_id: String,
    pub image_path: String,
    pub indexed: bool,
}

/// Tag, persist and optionally index an uploaded image in one call.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRequest {
    pub image_path: String,
    #[serde(default = "default_true")]
    pub index: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub item: ClothingItem,
    pub indexed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WardrobeEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub image_path: String,
    pub body_part: BodyPart,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextQuery {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleSearchResponse {
    pub message: String,
    pub count: usize,
    pub results: Vec<ClothingItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferencesResponse {
    pub message: String,
    pub preferences: StylePreferences,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorizeResponse {
    pub message: String,
    pub category_counts: BTreeMap<Slot, usize>,
    pub categorized_items: SlotAssignment,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub total_combinations: usize,
    pub outfits: Vec<OutfitCandidate>,
}

/// Best outfit out of every scored combination.
#[derive(Debug, Clone, Serialize)]
pub struct BestOutfitResponse {
    pub message: String,
    pub best_outfit: OutfitCandidate,
    pub total_combinations: usize,
    pub score: f32,
    pub reason: String,
    /// Candidates whose scoring call failed and were left out of the selection
    pub failed_scorings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    #[serde(flatten)]
    pub outfit: BestOutfitResponse,
    pub preferences: StylePreferences,
    pub candidates_considered: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// LLM config update request
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfigUpdate {
    pub provider: Option<String>,
    // base_url intentionally omitted: immutable at runtime to prevent SSRF
    pub chat_model: Option<String>,
    pub embedding_model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_json(body_part: &str) -> serde_json::Value {
        json!({
            "_id": "item-1",
            "image_path": "/data/images/a.jpg",
            "category": "shirt",
            "sub_category": "formal",
            "primary_color": "white",
            "secondary_color": null,
            "pattern": "solid",
            "formality_level": 4,
            "seasons": ["summer", "all"],
            "occasions": ["office"],
            "style_tags": ["minimalist"],
            "gender_target": "menswear",
            "body_part": body_part,
            "description": "Crisp white oxford shirt"
        })
    }

    #[test]
    fn test_body_part_matches_exactly() {
        assert_eq!(BodyPart::from("footwear".to_string()), BodyPart::Footwear);
        assert_eq!(
            BodyPart::from("Upper".to_string()),
            BodyPart::Other("Upper".to_string())
        );
        assert_eq!(
            BodyPart::from(" lower ".to_string()),
            BodyPart::Other(" lower ".to_string())
        );
    }

    #[test]
    fn test_miscased_body_part_round_trips_and_is_not_slotted() {
        let item: ClothingItem = serde_json::from_value(item_json(" Upper ")).unwrap();
        assert_eq!(item.tags.body_part, BodyPart::Other(" Upper ".to_string()));
        assert_eq!(serde_json::to_value(&item).unwrap()["body_part"], " Upper ");

        let slots = crate::outfit::categorize(&[Some(item)]);
        assert!(slots.top.is_empty());
        assert_eq!(slots.counts().values().sum::<usize>(), 0);
    }

    #[test]
    fn test_body_part_unknown_value_kept_verbatim() {
        let part = BodyPart::from("headwear".to_string());
        assert_eq!(part, BodyPart::Other("headwear".to_string()));
        assert_eq!(String::from(part), "headwear");
    }

    #[test]
    fn test_item_deserializes_with_mongo_style_id() {
        let item: ClothingItem = serde_json::from_value(item_json("upper")).unwrap();
        assert_eq!(item.id, "item-1");
        assert_eq!(item.tags.body_part, BodyPart::Upper);
        assert!(item.tags.seasons.contains(&Season::All));
        assert_eq!(item.tags.secondary_color, None);
    }

    #[test]
    fn test_item_serializes_id_as_underscore_id() {
        let item: ClothingItem = serde_json::from_value(item_json("lower")).unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["_id"], "item-1");
        assert_eq!(value["body_part"], "lower");
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn test_item_without_body_part_is_rejected() {
        let mut value = item_json("upper");
        value.as_object_mut().unwrap().remove("body_part");
        assert!(serde_json::from_value::<ClothingItem>(value).is_err());
    }

    #[test]
    fn test_unknown_occasion_is_rejected() {
        let mut value = item_json("upper");
        value["occasions"] = json!(["gala"]);
        assert!(serde_json::from_value::<ClothingItem>(value).is_err());
    }

    #[test]
    fn test_validate_formality_range() {
        let mut item: ClothingItem = serde_json::from_value(item_json("upper")).unwrap();
        assert!(item.tags.validate().is_ok());
        item.tags.formality_level = 0;
        assert!(item.tags.validate().is_err());
        item.tags.formality_level = 6;
        assert!(item.tags.validate().is_err());
    }

    #[test]
    fn test_slot_for_body_part() {
        assert_eq!(Slot::for_body_part(&BodyPart::Upper), Some(Slot::Top));
        assert_eq!(Slot::for_body_part(&BodyPart::Outerwear), Some(Slot::Outerwear));
        assert_eq!(Slot::for_body_part(&BodyPart::Accessory), None);
        assert_eq!(Slot::for_body_part(&BodyPart::Other("x".into())), None);
    }

    #[test]
    fn test_slot_assignment_requires_top_and_bottom_on_wire() {
        assert!(serde_json::from_value::<SlotAssignment>(json!({ "top": [] })).is_err());
        let slots: SlotAssignment =
            serde_json::from_value(json!({ "top": [], "bottom": [] })).unwrap();
        assert!(slots.shoes.is_empty());
        assert_eq!(slots.missing_required(), vec![Slot::Top, Slot::Bottom]);
    }

    #[test]
    fn test_category_counts_use_slot_names() {
        let counts = serde_json::to_value(SlotAssignment::default().counts()).unwrap();
        assert_eq!(counts, json!({ "top": 0, "bottom": 0, "shoes": 0, "outerwear": 0 }));
    }

    #[test]
    fn test_unscored_candidate_omits_score_fields() {
        let item: ClothingItem = serde_json::from_value(item_json("upper")).unwrap();
        let candidate = OutfitCandidate::new(item.clone(), item, None, None);
        let value = serde_json::to_value(&candidate).unwrap();
        assert!(value.get("score").is_none());
        assert!(value["shoes"].is_null());
    }
}
