use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::search::run_style_search;
use super::{bad_request, llm_error, ApiError};
use crate::models::{
    BestOutfitResponse, CategorizeResponse, ClothingItem, ExplainResponse, GenerateResponse,
    OutfitCandidate, RecommendResponse, Slot, SlotAssignment, StylePreferences, TextQuery,
};
use crate::outfit::{categorize, generate_candidates, scoring};
use crate::state::AppState;

/// POST /api/outfits/categorize - Sort items into outfit slots
pub async fn categorize_items(
    Json(items): Json<Vec<Option<ClothingItem>>>,
) -> Result<Json<CategorizeResponse>, ApiError> {
    if items.is_empty() {
        return Err(bad_request("No items provided"));
    }

    let slots = categorize(&items);
    Ok(Json(CategorizeResponse {
        message: "Items categorized".to_string(),
        category_counts: slots.counts(),
        categorized_items: slots,
    }))
}

/// POST /api/outfits/generate - Every outfit combination for a slot assignment
pub async fn generate_outfits(
    State(state): State<AppState>,
    Json(slots): Json<SlotAssignment>,
) -> Json<GenerateResponse> {
    let outfits = generate_candidates(&slots, state.config.candidates_per_slot);
    let message = if outfits.is_empty() {
        no_combinations_message(&slots)
    } else {
        format!("Generated {} outfit combination(s)", outfits.len())
    };
    Json(GenerateResponse {
        message,
        total_combinations: outfits.len(),
        outfits,
    })
}

/// POST /api/outfits/score?occasion=&weather=&style_pref= - Best outfit from a list of items
pub async fn score_outfits(
    State(state): State<AppState>,
    Query(preferences): Query<StylePreferences>,
    Json(items): Json<Vec<Option<ClothingItem>>>,
) -> Result<Json<BestOutfitResponse>, ApiError> {
    let preferences = blank_to_none(preferences);
    select_best_outfit(&state, &items, &preferences)
        .await
        .map(Json)
}

/// POST /api/outfits/recommend - Free-text request to best outfit in one call
///
/// Preference extraction and the style search run concurrently.
pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<TextQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(bad_request("Query is required"));
    }

    let (preferences, candidates) = tokio::join!(
        state.preferences.extract_preferences(query),
        run_style_search(&state, query)
    );
    let candidates = candidates?;
    let candidates_considered = candidates.iter().flatten().count();
    tracing::info!(
        "Recommend {query:?}: {candidates_considered} candidate item(s), preferences {preferences:?}"
    );

    let outfit = select_best_outfit(&state, &candidates, &preferences).await?;
    Ok(Json(RecommendResponse {
        outfit,
        preferences,
        candidates_considered,
    }))
}

/// POST /api/outfits/explain - Stylist commentary for one outfit
pub async fn explain_outfit(
    State(state): State<AppState>,
    Json(outfit): Json<OutfitCandidate>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let explanation = state.explainer.explain(&outfit).await.map_err(llm_error)?;
    Ok(Json(ExplainResponse { explanation }))
}

/// Categorize, generate and score, then report the winner.
async fn select_best_outfit(
    state: &AppState,
    items: &[Option<ClothingItem>],
    preferences: &StylePreferences,
) -> Result<BestOutfitResponse, ApiError> {
    let slots = categorize(items);
    let mut outfits = generate_candidates(&slots, state.config.candidates_per_slot);
    if outfits.is_empty() {
        return Err(bad_request(no_combinations_message(&slots)));
    }

    let report = scoring::score_outfits(
        state.judge.clone(),
        &mut outfits,
        preferences,
        state.config.max_concurrent_scoring,
    )
    .await;

    let total_combinations = outfits.len();
    let failed_scorings = report.failures.len();
    let best = report.best_outfit(&outfits).ok_or_else(|| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Scoring failed for all {failed_scorings} outfit combination(s)"),
        )
    })?;

    Ok(BestOutfitResponse {
        message: "Best outfit selected".to_string(),
        best_outfit: best.clone(),
        total_combinations,
        score: best.score.unwrap_or_default(),
        reason: best.reason.clone().unwrap_or_default(),
        failed_scorings,
    })
}

fn no_combinations_message(slots: &SlotAssignment) -> String {
    let missing: Vec<&str> = slots.missing_required().into_iter().map(Slot::label).collect();
    format!("No combinations possible: no items for {}", missing.join(", "))
}

/// Query strings like `?occasion=` arrive as empty strings.
fn blank_to_none(preferences: StylePreferences) -> StylePreferences {
    let clean = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    StylePreferences {
        occasion: clean(preferences.occasion),
        weather: clean(preferences.weather),
        style_pref: clean(preferences.style_pref),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_values_become_none() {
        let prefs = blank_to_none(StylePreferences {
            occasion: Some("office".into()),
            weather: Some("  ".into()),
            style_pref: Some(String::new()),
        });
        assert_eq!(prefs.occasion.as_deref(), Some("office"));
        assert!(prefs.weather.is_none());
        assert!(prefs.style_pref.is_none());
    }
}
