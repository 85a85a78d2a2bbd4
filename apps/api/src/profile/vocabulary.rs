//! Canonical skill vocabulary — every distinct skill name taught by a
//! certification in the store, paired with a precomputed embedding.
//!
//! Lifecycle: {Unloaded → Loaded(data)}, lazily built once per process and
//! swapped atomically. `refresh` drops back to Unloaded; the next lookup
//! rebuilds synchronously. Concurrent cold loads may compute twice — the
//! later swap wins, which is benign — but a reader never observes a
//! partially populated vocabulary.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::models::certification::normalize_skills;
use crate::store::GraphStore;

const VOCABULARY_QUERY: &str = "
MATCH (c:Certification)
WHERE c.competences IS NOT NULL
RETURN c.competences AS skills
";

/// Immutable snapshot: `skills[i]` embeds to `embeddings[i]`.
#[derive(Debug, Clone)]
pub struct VocabularyData {
    pub skills: Vec<String>,
    pub embeddings: Vec<Vec<f32>>,
}

#[derive(Default)]
pub struct SkillVocabulary {
    inner: RwLock<Option<Arc<VocabularyData>>>,
}

impl SkillVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the loaded vocabulary, building it on first use.
    pub async fn get(
        &self,
        store: &dyn GraphStore,
        embedder: &dyn Embedder,
    ) -> Result<Arc<VocabularyData>, AppError> {
        if let Some(data) = self.inner.read().await.as_ref() {
            return Ok(Arc::clone(data));
        }

        let data = Arc::new(load_vocabulary(store, embedder).await?);

        let mut guard = self.inner.write().await;
        // Another request may have finished loading first; keep one snapshot.
        if let Some(existing) = guard.as_ref() {
            return Ok(Arc::clone(existing));
        }
        *guard = Some(Arc::clone(&data));
        Ok(data)
    }

    /// Invalidates the cache. The next `get` rebuilds from the store.
    pub async fn refresh(&self) {
        *self.inner.write().await = None;
        info!("Skill vocabulary cache invalidated");
    }

    #[cfg(test)]
    pub async fn is_loaded(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

async fn load_vocabulary(
    store: &dyn GraphStore,
    embedder: &dyn Embedder,
) -> Result<VocabularyData, AppError> {
    let rows = store.run(VOCABULARY_QUERY, json!({})).await?;

    // BTreeSet gives distinct + stable ordering in one pass
    let mut distinct = BTreeSet::new();
    for row in &rows {
        for skill in normalize_skills(row.get("skills").unwrap_or(&serde_json::Value::Null)) {
            distinct.insert(skill);
        }
    }
    let skills: Vec<String> = distinct.into_iter().collect();

    let embeddings = if skills.is_empty() {
        Vec::new()
    } else {
        embedder.embed(&skills).await?
    };

    info!("Skill vocabulary loaded: {} canonical skills", skills.len());

    Ok(VocabularyData { skills, embeddings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::store::Row;

    struct FakeStore {
        rows: Vec<Value>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GraphStore for FakeStore {
        async fn run(&self, _query: &str, _params: Value) -> Result<Vec<Row>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect())
        }
    }

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    fn store_with(rows: Vec<Value>) -> FakeStore {
        FakeStore {
            rows,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_vocabulary_deduplicates_and_sorts() {
        let store = store_with(vec![
            serde_json::json!({"skills": ["Python", "SQL"]}),
            serde_json::json!({"skills": "SQL, Spark"}),
        ]);
        let vocabulary = SkillVocabulary::new();
        let data = vocabulary.get(&store, &FakeEmbedder).await.unwrap();
        assert_eq!(data.skills, vec!["Python", "SQL", "Spark"]);
        assert_eq!(data.embeddings.len(), 3);
    }

    #[tokio::test]
    async fn test_vocabulary_loads_once_until_refresh() {
        let store = store_with(vec![serde_json::json!({"skills": ["Python"]})]);
        let vocabulary = SkillVocabulary::new();

        vocabulary.get(&store, &FakeEmbedder).await.unwrap();
        vocabulary.get(&store, &FakeEmbedder).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        vocabulary.refresh().await;
        assert!(!vocabulary.is_loaded().await);
        vocabulary.get(&store, &FakeEmbedder).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_vocabulary() {
        let store = store_with(vec![]);
        let vocabulary = SkillVocabulary::new();
        let data = vocabulary.get(&store, &FakeEmbedder).await.unwrap();
        assert!(data.skills.is_empty());
        assert!(data.embeddings.is_empty());
    }
}
