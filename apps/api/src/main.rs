mod answer;
mod config;
mod embedding;
mod errors;
mod llm_client;
mod models;
mod profile;
mod reco;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::reranker::{CrossScorer, HttpCrossScorer};
use crate::embedding::{Embedder, HttpEmbedder};
use crate::llm_client::{LlmClient, TextGenerator};
use crate::profile::normalizer::SkillNormalizer;
use crate::profile::vocabulary::SkillVocabulary;
use crate::reco::cache::CertificationCache;
use crate::reco::pipeline::Recommender;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{GraphStore, Neo4jHttpStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CertiGraph API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Neo4j HTTP store
    let store: Arc<dyn GraphStore> = Arc::new(Neo4jHttpStore::new(
        &config.neo4j_uri,
        &config.neo4j_database,
        config.neo4j_user.clone(),
        config.neo4j_password.clone(),
    ));
    info!("Graph store initialized ({})", config.neo4j_uri);

    // Initialize the embedding client
    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::new(config.embeddings_url.clone()));
    info!("Embedding client initialized ({})", config.embeddings_url);

    // Cross-encoder is optional; without it the re-ranker stays bi-encoder
    let cross_scorer: Option<Arc<dyn CrossScorer>> = match &config.reranker_url {
        Some(url) => {
            info!("Cross-encoder client initialized ({url})");
            Some(Arc::new(HttpCrossScorer::new(url.clone())))
        }
        None => {
            info!("No RERANKER_URL set, re-ranking is bi-encoder only");
            None
        }
    };

    // Initialize LLM client
    let llm: Arc<dyn TextGenerator> = Arc::new(LlmClient::new(config.groq_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Caches are lazy; warmed below so the first request doesn't pay
    let vocabulary = Arc::new(SkillVocabulary::new());
    let cert_cache = Arc::new(CertificationCache::new());

    let recommender = Arc::new(Recommender {
        store: Arc::clone(&store),
        embedder: Arc::clone(&embedder),
        cross_scorer,
        normalizer: SkillNormalizer {
            store: Arc::clone(&store),
            embedder: Arc::clone(&embedder),
            llm: Arc::clone(&llm),
            vocabulary: Arc::clone(&vocabulary),
        },
        vocabulary,
        cert_cache,
    });

    recommender.warm_caches().await;

    // Build app state
    let state = AppState { llm, recommender };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
