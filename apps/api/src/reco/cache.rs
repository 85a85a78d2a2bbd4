//! Certification embedding cache — the full catalog with one precomputed
//! embedding per certification, keyed by id for the re-ranker.
//!
//! Same lifecycle as the skill vocabulary: lazy first load, atomic swap,
//! `refresh` drops the snapshot and the next lookup rebuilds it.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::models::certification::Candidate;
use crate::store::GraphStore;

const CATALOG_QUERY: &str = "
MATCH (c:Certification)
RETURN
    c.id AS id,
    c.titre AS title,
    c.domaine AS domain,
    c.niveau AS level,
    c.objectif AS objective,
    c.competences AS skills,
    c.duree AS duration,
    c.prix AS price,
    c.url AS url,
    c.langues AS languages,
    c.temps_par_semaine AS hours_per_week
";

/// Immutable snapshot: `certifications[i]` embeds to `embeddings[i]`.
#[derive(Debug, Clone)]
pub struct CatalogData {
    pub certifications: Vec<Candidate>,
    pub embeddings: Vec<Vec<f32>>,
    by_id: HashMap<String, usize>,
}

impl CatalogData {
    /// Precomputed embedding for a certification id, if the catalog has it.
    pub fn embedding_for(&self, id: &str) -> Option<&[f32]> {
        self.by_id
            .get(id)
            .and_then(|&i| self.embeddings.get(i))
            .map(Vec::as_slice)
    }
}

#[derive(Default)]
pub struct CertificationCache {
    inner: RwLock<Option<Arc<CatalogData>>>,
}

impl CertificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the loaded catalog, building it on first use.
    pub async fn get(
        &self,
        store: &dyn GraphStore,
        embedder: &dyn Embedder,
    ) -> Result<Arc<CatalogData>, AppError> {
        if let Some(data) = self.inner.read().await.as_ref() {
            return Ok(Arc::clone(data));
        }

        let data = Arc::new(load_catalog(store, embedder).await?);

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
        info!("Certification catalog cache invalidated");
    }

    #[cfg(test)]
    pub async fn is_loaded(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

async fn load_catalog(
    store: &dyn GraphStore,
    embedder: &dyn Embedder,
) -> Result<CatalogData, AppError> {
    let rows = store.run(CATALOG_QUERY, json!({})).await?;
    let certifications: Vec<Candidate> = rows.iter().map(Candidate::from_row).collect();

    let texts: Vec<String> = certifications
        .iter()
        .map(Candidate::embedding_text)
        .collect();
    let embeddings = if texts.is_empty() {
        Vec::new()
    } else {
        embedder.embed(&texts).await?
    };

    let by_id = certifications
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.clone(), i))
        .collect();

    info!(
        "Certification catalog loaded: {} certifications embedded",
        certifications.len()
    );

    Ok(CatalogData {
        certifications,
        embeddings,
        by_id,
    })
}
