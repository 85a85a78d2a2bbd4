//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::answer::{ask_with_evidence, is_social_message, AnswerMode};
use crate::errors::AppError;
use crate::reco::pipeline::RecommendationResult;
use crate::state::AppState;

const DEFAULT_TOP_K: usize = 5;
const CHAT_TOP_K: usize = 10;
const MAX_TOP_K: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecommendTextRequest {
    pub text: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub history: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub context_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RecommendationResult>,
}

#[derive(Debug, Serialize)]
pub struct RefreshCachesResponse {
    pub canonical_skills: usize,
    pub certifications: usize,
}

fn validated_top_k(requested: Option<usize>) -> Result<usize, AppError> {
    let top_k = requested.unwrap_or(DEFAULT_TOP_K);
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(AppError::Validation(format!(
            "top_k must be between 1 and {MAX_TOP_K}"
        )));
    }
    Ok(top_k)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommend/text
///
/// Runs the full pipeline over free-form French text (CV excerpt, chat
/// message, career goal) and returns scored recommendations with the
/// extracted profile and reasoning.
pub async fn handle_recommend_text(
    State(state): State<AppState>,
    Json(request): Json<RecommendTextRequest>,
) -> Result<Json<RecommendationResult>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let top_k = validated_top_k(request.top_k)?;

    let result = state
        .recommender
        .smart_recommendations(&request.text, None, top_k, true)
        .await?;

    Ok(Json(result))
}

/// GET /api/v1/recommend/user/:user_id
///
/// Recommendations driven by the stored profile node. Users without a
/// profile get an empty result, not a 404 — the frontend treats both the
/// same way.
pub async fn handle_recommend_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<RecommendationResult>, AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".to_string()));
    }

    let result = state
        .recommender
        .recommendations_for_user(&user_id, DEFAULT_TOP_K)
        .await?;

    Ok(Json(result))
}

/// POST /api/v1/chat
///
/// Conversational entry point. Greetings and thanks short-circuit to a
/// social answer; everything else runs the pipeline and answers with the
/// structured evidence pinned into the prompt.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }
    let history = request.history.unwrap_or_default();

    if is_social_message(question) {
        let answer =
            ask_with_evidence(state.llm.as_ref(), question, None, &history, AnswerMode::Social)
                .await;
        return Ok(Json(ChatResponse {
            answer,
            context_used: "SOCIAL".to_string(),
            result: None,
        }));
    }

    let result = state
        .recommender
        .smart_recommendations(question, None, CHAT_TOP_K, true)
        .await?;

    let answer = ask_with_evidence(
        state.llm.as_ref(),
        question,
        Some(&result),
        &history,
        AnswerMode::GraphReasoning,
    )
    .await;

    Ok(Json(ChatResponse {
        answer,
        context_used: "GRAPH_REASONING".to_string(),
        result: Some(result),
    }))
}

/// POST /api/v1/admin/refresh-caches
///
/// Drops the vocabulary and catalog caches and reloads them synchronously.
/// Call after re-importing the certification graph.
pub async fn handle_refresh_caches(
    State(state): State<AppState>,
) -> Result<Json<RefreshCachesResponse>, AppError> {
    let (canonical_skills, certifications) = state.recommender.refresh_caches().await?;

    Ok(Json(RefreshCachesResponse {
        canonical_skills,
        certifications,
    }))
}
