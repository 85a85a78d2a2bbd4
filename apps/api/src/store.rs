//! Knowledge store adapter — read-only Cypher access behind a narrow trait.
//!
//! The pipeline only ever needs "run this parametrized query, give me rows".
//! Keeping that seam small lets every pipeline stage run against an
//! in-memory fake in tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::errors::AppError;

/// A single result row: column name → value.
pub type Row = Map<String, Value>;

/// Read-only query capability over the certification knowledge store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn run(&self, query: &str, params: Value) -> Result<Vec<Row>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Neo4j HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

/// Neo4j client using the HTTP transactional endpoint
/// (`POST /db/{database}/tx/commit`).
#[derive(Clone)]
pub struct Neo4jHttpStore {
    client: reqwest::Client,
    endpoint: String,
    user: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

impl Neo4jHttpStore {
    pub fn new(uri: &str, database: &str, user: String, password: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: format!("{}/db/{}/tx/commit", uri.trim_end_matches('/'), database),
            user,
            password,
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jHttpStore {
    async fn run(&self, query: &str, params: Value) -> Result<Vec<Row>, AppError> {
        let body = json!({
            "statements": [{
                "statement": query,
                "parameters": params,
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!("HTTP {status}: {text}")));
        }

        let tx: TxResponse = response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("malformed response: {e}")))?;

        if let Some(err) = tx.errors.first() {
            return Err(AppError::Store(format!("{}: {}", err.code, err.message)));
        }

        let result = tx
            .results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Store("response carried no result set".to_string()))?;

        let rows = result
            .data
            .into_iter()
            .map(|data| {
                result
                    .columns
                    .iter()
                    .cloned()
                    .zip(data.row)
                    .collect::<Row>()
            })
            .collect();

        Ok(rows)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row accessors — tolerate missing or differently-typed optional fields
// ────────────────────────────────────────────────────────────────────────────

pub fn row_string(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn row_opt_string(row: &Row, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub fn row_opt_f64(row: &Row, key: &str) -> Option<f64> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
