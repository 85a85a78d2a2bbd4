pub mod health;
pub mod recommend;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation API
        .route(
            "/api/v1/recommend/text",
            post(recommend::handle_recommend_text),
        )
        .route(
            "/api/v1/recommend/user/:user_id",
            get(recommend::handle_recommend_user),
        )
        .route("/api/v1/chat", post(recommend::handle_chat))
        // Admin
        .route(
            "/api/v1/admin/refresh-caches",
            post(recommend::handle_refresh_caches),
        )
        .with_state(state)
}
