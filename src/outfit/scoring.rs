//! Outfit scoring: one remote judgement per candidate, best one wins.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::error::LlmError;
use crate::llm::OutfitJudge;
use crate::models::{OutfitCandidate, OutfitScore, StylePreferences};

/// A single candidate that could not be scored. Never aborts the batch.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring unavailable for candidate {index}: {source}")]
    Unavailable {
        index: usize,
        #[source]
        source: LlmError,
    },

    #[error("scoring task for candidate {index} aborted: {reason}")]
    Aborted { index: usize, reason: String },
}

impl ScoringError {
    pub fn index(&self) -> usize {
        match self {
            ScoringError::Unavailable { index, .. } | ScoringError::Aborted { index, .. } => *index,
        }
    }
}

/// Outcome of scoring a batch of candidates.
#[derive(Debug)]
pub struct ScoringReport {
    /// Index of the highest-scoring candidate; the first one wins ties.
    /// `None` when every scoring failed or there were no candidates.
    pub best: Option<usize>,
    pub scored: usize,
    pub failures: Vec<ScoringError>,
}

impl ScoringReport {
    pub fn best_outfit<'a>(&self, outfits: &'a [OutfitCandidate]) -> Option<&'a OutfitCandidate> {
        self.best.and_then(|i| outfits.get(i))
    }
}

/// Score every candidate in place and pick the best.
///
/// Calls run through a pool of at most `max_concurrent` in-flight requests.
/// Results are applied in candidate order only after every call has
/// finished, so the selection does not depend on completion order.
pub async fn score_outfits(
    judge: Arc<dyn OutfitJudge>,
    outfits: &mut [OutfitCandidate],
    preferences: &StylePreferences,
    max_concurrent: usize,
) -> ScoringReport {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let preferences = Arc::new(preferences.clone());
    let mut handles = Vec::with_capacity(outfits.len());

    for outfit in outfits.iter() {
        let judge = judge.clone();
        let outfit = outfit.clone();
        let preferences = preferences.clone();
        let sem = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await;
            judge.judge(&outfit, &preferences).await
        }));
    }

    let results = futures_util::future::join_all(handles).await;

    let mut outcomes: Vec<Result<OutfitScore, ScoringError>> = Vec::with_capacity(results.len());
    for (index, joined) in results.into_iter().enumerate() {
        let outcome = match joined {
            Ok(Ok(score)) if score.overall_score.is_finite() => Ok(score),
            Ok(Ok(score)) => Err(ScoringError::Unavailable {
                index,
                source: LlmError::malformed(
                    "overall_score is not a finite number",
                    score.overall_score.to_string(),
                ),
            }),
            Ok(Err(source)) => Err(ScoringError::Unavailable { index, source }),
            Err(e) => Err(ScoringError::Aborted {
                index,
                reason: e.to_string(),
            }),
        };
        outcomes.push(outcome);
    }

    apply_scores(outfits, outcomes)
}

/// Attach scores to candidates and select the stable maximum.
fn apply_scores(
    outfits: &mut [OutfitCandidate],
    outcomes: Vec<Result<OutfitScore, ScoringError>>,
) -> ScoringReport {
    let mut best: Option<(usize, f32)> = None;
    let mut scored = 0;
    let mut failures = Vec::new();

    for (index, (outfit, outcome)) in outfits.iter_mut().zip(outcomes).enumerate() {
        match outcome {
            Ok(score) => {
                outfit.score = Some(score.overall_score);
                outfit.reason = Some(score.reason);
                scored += 1;
                if best.map_or(true, |(_, top)| score.overall_score > top) {
                    best = Some((index, score.overall_score));
                }
            }
            Err(e) => {
                tracing::warn!("{e}");
                outfit.score = None;
                outfit.reason = None;
                failures.push(e);
            }
        }
    }

    tracing::info!(
        "Scored {scored} outfit(s), {} failure(s), best: {:?}",
        failures.len(),
        best
    );

    ScoringReport {
        best: best.map(|(i, _)| i),
        scored,
        failures,
    }
}
