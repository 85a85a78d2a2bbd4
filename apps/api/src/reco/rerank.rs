//! Semantic re-ranker — two-stage pass over boosted candidates.
//!
//! Stage one blends the keyword relevance score with bi-encoder cosine
//! similarity. Stage two, when a cross-encoder is configured, rescores the
//! top slice pairwise for precision. Both stages degrade: any scoring
//! failure keeps the previous ordering instead of failing the request.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::embedding::reranker::CrossScorer;
use crate::embedding::{cosine_similarity, Embedder};
use crate::models::certification::Candidate;
use crate::reco::cache::CatalogData;

pub const DEFAULT_ALPHA: f64 = 0.7;

/// How many of the leading candidates get the expensive pairwise pass.
const CROSS_ENCODER_TOP_N: usize = 15;
const CROSS_ENCODER_WEIGHT: f64 = 0.3;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// combined = α·relevance + (1−α)·semantic, rounded to 2 decimals.
pub fn blend_scores(relevance: f64, semantic: f64, alpha: f64) -> f64 {
    round2(alpha * relevance + (1.0 - alpha) * semantic)
}

/// Re-ranks `candidates` in place against the query text.
///
/// Certification embeddings come from the catalog snapshot by id; only
/// cache misses are embedded on the fly, batched together with the query.
pub async fn rerank(
    candidates: &mut [Candidate],
    query_text: &str,
    alpha: f64,
    embedder: &dyn Embedder,
    cross_scorer: Option<&dyn CrossScorer>,
    catalog: &CatalogData,
) {
    if candidates.is_empty() {
        return;
    }

    let miss_indexes: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| catalog.embedding_for(&c.id).is_none())
        .map(|(i, _)| i)
        .collect();

    let mut texts = Vec::with_capacity(1 + miss_indexes.len());
    texts.push(query_text.to_string());
    for &i in &miss_indexes {
        texts.push(candidates[i].embedding_text());
    }

    let mut embeddings = match embedder.embed(&texts).await {
        Ok(embeddings) => embeddings,
        Err(e) => {
            warn!("Semantic re-ranking unavailable, keeping keyword order: {e}");
            return;
        }
    };
    if embeddings.len() != texts.len() {
        warn!("Embedding count mismatch, keeping keyword order");
        return;
    }

    let miss_embeddings: Vec<Vec<f32>> = embeddings.split_off(1);
    let query_embedding = embeddings.remove(0);

    let mut miss_cursor = 0;
    for (i, candidate) in candidates.iter_mut().enumerate() {
        let embedding = match catalog.embedding_for(&candidate.id) {
            Some(cached) => cached,
            None => {
                debug_assert_eq!(miss_indexes[miss_cursor], i);
                let fresh = miss_embeddings[miss_cursor].as_slice();
                miss_cursor += 1;
                fresh
            }
        };
        let semantic = f64::from(cosine_similarity(&query_embedding, embedding)) * 100.0;
        candidate.semantic_score = Some(round2(semantic));
        candidate.combined_score = Some(blend_scores(candidate.relevance_score, semantic, alpha));
    }

    candidates.sort_by(|a, b| compare_desc(a.combined_score, b.combined_score));

    if let Some(scorer) = cross_scorer {
        cross_encoder_pass(candidates, query_text, scorer).await;
    }
}

/// Pairwise precision pass over the leading candidates. The tail keeps its
/// bi-encoder order; a scorer failure keeps the whole list untouched.
async fn cross_encoder_pass(candidates: &mut [Candidate], query_text: &str, scorer: &dyn CrossScorer) {
    if candidates.len() < 2 {
        return;
    }

    let top_n = candidates.len().min(CROSS_ENCODER_TOP_N);
    let texts: Vec<String> = candidates[..top_n]
        .iter()
        .map(Candidate::embedding_text)
        .collect();

    let scores = match scorer.score_pairs(query_text, &texts).await {
        Ok(scores) if scores.len() == top_n => scores,
        Ok(scores) => {
            warn!(
                "Cross-encoder returned {} scores for {top_n} candidates, keeping bi-encoder order",
                scores.len()
            );
            return;
        }
        Err(e) => {
            warn!("Cross-encoder unavailable, keeping bi-encoder order: {e}");
            return;
        }
    };

    apply_cross_scores(&mut candidates[..top_n], &scores);
    debug!("Cross-encoder pass applied to top {top_n} candidates");
}

/// Folds raw cross-encoder logits into final scores for the top slice.
///
/// Logits are min-max normalized to 0–100; when all scores are equal the
/// normalized value is pinned at 50 so the blend stays stable. final =
/// 0.7·combined + 0.3·normalized, and overwrites combined so downstream
/// ordering uses one consistent key.
pub fn apply_cross_scores(top: &mut [Candidate], scores: &[f32]) {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = max - min;

    for (candidate, &raw) in top.iter_mut().zip(scores) {
        let normalized = if span > f32::EPSILON {
            f64::from((raw - min) / span) * 100.0
        } else {
            50.0
        };
        let combined = candidate.combined_score.unwrap_or(candidate.relevance_score);
        let final_score = round2(
            (1.0 - CROSS_ENCODER_WEIGHT) * combined + CROSS_ENCODER_WEIGHT * normalized,
        );
        candidate.rerank_score = Some(round2(normalized));
        candidate.final_score = Some(final_score);
        candidate.combined_score = Some(final_score);
    }

    top.sort_by(|a, b| compare_desc(a.final_score, b.final_score));
}

fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0)
        .partial_cmp(&a.unwrap_or(0.0))
        .unwrap_or(Ordering::Equal)
}
