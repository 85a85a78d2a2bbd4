use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::reco::pipeline::Recommender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn TextGenerator>,
    /// Full recommendation pipeline: extraction, retrieval, boosting,
    /// re-ranking, reasoning.
    pub recommender: Arc<Recommender>,
}
