//! Cross-encoder collaborator — pairwise (query, candidate) precision scores.
//!
//! Optional: the service is config-gated, and any failure here must degrade
//! to the bi-encoder ordering instead of aborting the request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Scores (query, text) pairs; one scalar per candidate text, higher is
/// more relevant. Scores are model-specific logits — callers normalize.
#[async_trait]
pub trait CrossScorer: Send + Sync {
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>, AppError>;
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

#[derive(Clone)]
pub struct HttpCrossScorer {
    client: reqwest::Client,
    url: String,
}

impl HttpCrossScorer {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            url,
        }
    }
}

#[async_trait]
impl CrossScorer for HttpCrossScorer {
    async fn score_pairs(&self, query: &str, texts: &[String]) -> Result<Vec<f32>, AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&RerankRequest { query, texts })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("rerank request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!("rerank HTTP {status}: {body}")));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("malformed rerank response: {e}")))?;

        if parsed.scores.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "expected {} rerank scores, got {}",
                texts.len(),
                parsed.scores.len()
            )));
        }

        Ok(parsed.scores)
    }
}
