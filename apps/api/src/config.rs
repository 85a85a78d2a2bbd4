use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub neo4j_database: String,
    pub groq_api_key: String,
    pub embeddings_url: String,
    /// Optional cross-encoder endpoint. When unset the re-ranker runs
    /// bi-encoder only.
    pub reranker_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            neo4j_uri: std::env::var("NEO4J_URI")
                .unwrap_or_else(|_| "http://localhost:7474".to_string()),
            neo4j_user: std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string()),
            neo4j_password: require_env("NEO4J_PASSWORD")?,
            neo4j_database: std::env::var("NEO4J_DATABASE")
                .unwrap_or_else(|_| "certifications-db".to_string()),
            groq_api_key: require_env("GROQ_API_KEY")?,
            embeddings_url: require_env("EMBEDDINGS_URL")?,
            reranker_url: std::env::var("RERANKER_URL").ok().filter(|v| !v.is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
