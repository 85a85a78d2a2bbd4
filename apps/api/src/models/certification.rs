//! Candidate certification record flowing through the recommendation
//! pipeline. Request-local: rebuilt from store rows per query and mutated
//! in place through retrieval → boost → re-rank.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{row_opt_f64, row_opt_string, row_string, Row};

/// Classification of how a candidate's level relates to the target level.
/// Diagnostic only — ordering is driven by the score adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMatch {
    Exact,
    TooLow,
    WayTooLow,
    TooHigh,
    WayTooHigh,
    Acceptable,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub domain: String,
    pub level: String,
    pub objective: String,
    /// Always a normalized list, regardless of how the store encodes it.
    pub skills: Vec<String>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub url: Option<String>,
    /// Course languages, normalized like `skills`.
    pub languages: Vec<String>,
    pub hours_per_week: Option<String>,

    // Scoring state, accumulated through the pipeline
    pub matched_skills: Vec<String>,
    pub skill_matches: usize,
    pub total_skills: usize,
    pub relevance_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_match: Option<LevelMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_match: Option<bool>,
}

impl Candidate {
    /// Builds a candidate from a store row. Optional columns default to
    /// empty/unset; `skills` accepts both list and delimited-string forms.
    pub fn from_row(row: &Row) -> Self {
        Candidate {
            id: row_string(row, "id"),
            title: row_string(row, "title"),
            domain: row_string(row, "domain"),
            level: row_string(row, "level"),
            objective: row_string(row, "objective"),
            skills: normalize_skills(row.get("skills").unwrap_or(&Value::Null)),
            duration: row_opt_string(row, "duration"),
            price: row_opt_f64(row, "price"),
            url: row_opt_string(row, "url"),
            languages: normalize_skills(row.get("languages").unwrap_or(&Value::Null)),
            hours_per_week: row_opt_string(row, "hours_per_week"),
            ..Candidate::default()
        }
    }

    /// Descriptive text used for embedding and cross-encoder scoring.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} - {} - {}",
            self.title,
            self.objective,
            self.skills.join(", ")
        )
    }

    /// Score the pipeline currently orders by: final > combined > relevance.
    pub fn ranking_score(&self) -> f64 {
        self.final_score
            .or(self.combined_score)
            .unwrap_or(self.relevance_score)
    }
}

/// Normalizes the store's `competences` value into a list of trimmed,
/// non-empty strings. The store mixes representations: some nodes carry a
/// proper list, others a comma-separated string, a bare string, or null.
pub fn normalize_skills(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string().trim_matches('"').trim().to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        other => {
            let s = other.to_string();
            let trimmed = s.trim_matches('"').trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
    }
}
