//! Recommendation pipeline — extraction, retrieval, boosting, re-ranking
//! and reasoning glued into one request-scoped flow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::embedding::reranker::CrossScorer;
use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::models::certification::Candidate;
use crate::models::profile::{Level, SkillAnalysis, SkillVector, UserProfile};
use crate::profile::normalizer::SkillNormalizer;
use crate::profile::vocabulary::SkillVocabulary;
use crate::reco::boost::{apply_domain_boost, apply_level_boost, sort_by_relevance};
use crate::reco::cache::CertificationCache;
use crate::reco::reasoning::{build_reasoning, Reasoning};
use crate::reco::rerank::{rerank, DEFAULT_ALPHA};
use crate::reco::retriever::query_by_skills;
use crate::store::GraphStore;

/// Retrieval over-fetch factor: boosting and re-ranking reshuffle, so the
/// retriever returns more than the caller asked for.
const RETRIEVAL_FACTOR: usize = 3;

/// Weight given to skills declared on the profile but absent from the
/// analyzed text.
const PROFILE_SKILL_WEIGHT: f32 = 0.5;

const PROFILE_QUERY: &str = "
MATCH (p:Profile {user_id: $user_id})
RETURN
    p.niveau AS level,
    p.objectif AS objective,
    p.budget AS budget,
    p.competences AS skills
";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub skill_analysis: SkillAnalysis,
    pub recommendations: Vec<Candidate>,
    pub reasoning: Reasoning,
}

pub struct Recommender {
    pub store: Arc<dyn GraphStore>,
    pub embedder: Arc<dyn Embedder>,
    pub cross_scorer: Option<Arc<dyn CrossScorer>>,
    pub normalizer: SkillNormalizer,
    pub vocabulary: Arc<SkillVocabulary>,
    pub cert_cache: Arc<CertificationCache>,
}

impl Recommender {
    /// Full pipeline over free-form text: extract a profile, retrieve and
    /// score candidates, re-rank semantically, explain.
    ///
    /// Explicit profile preferences outrank anything inferred from text.
    pub async fn smart_recommendations(
        &self,
        text: &str,
        profile: Option<&UserProfile>,
        top_k: usize,
        use_llm_extraction: bool,
    ) -> Result<RecommendationResult, AppError> {
        let analysis = self.normalizer.extract(text, use_llm_extraction).await?;

        let skill_vector = merge_skill_vector(&analysis.skill_vector, profile);
        let domains = merge_domains(&analysis.domains, profile);
        let budget = profile.and_then(|p| p.budget);
        let level = resolve_level(profile.and_then(|p| p.level), &analysis);

        // Level is deferred to boosting: a hard level filter would hide
        // adjacent-level certifications that boosting handles gracefully.
        let mut candidates = query_by_skills(
            self.store.as_ref(),
            &skill_vector,
            &domains,
            None,
            budget,
            top_k * RETRIEVAL_FACTOR,
        )
        .await?;

        candidates.retain(|c| !analysis.held_certifications.contains(&c.id));

        apply_level_boost(&mut candidates, level);
        apply_domain_boost(&mut candidates, &domains);
        sort_by_relevance(&mut candidates);

        match self.cert_cache.get(self.store.as_ref(), self.embedder.as_ref()).await {
            Ok(catalog) => {
                rerank(
                    &mut candidates,
                    text,
                    DEFAULT_ALPHA,
                    self.embedder.as_ref(),
                    self.cross_scorer.as_deref(),
                    &catalog,
                )
                .await;
            }
            Err(e) => warn!("Catalog cache unavailable, skipping semantic re-rank: {e}"),
        }

        candidates.truncate(top_k);

        let reasoning = build_reasoning(&analysis, Some(level), &candidates);
        info!(
            "Recommendation pipeline: {} skills → {} recommendations (level {level})",
            analysis.skill_vector.len(),
            candidates.len()
        );

        Ok(RecommendationResult {
            skill_analysis: analysis,
            recommendations: candidates,
            reasoning,
        })
    }

    /// Profile-driven entry point: loads the stored profile, synthesizes a
    /// query text from it and runs the pipeline without LLM extraction.
    /// A missing profile yields an empty result, not an error.
    pub async fn recommendations_for_user(
        &self,
        user_id: &str,
        top_k: usize,
    ) -> Result<RecommendationResult, AppError> {
        let rows = self
            .store
            .run(PROFILE_QUERY, json!({ "user_id": user_id }))
            .await?;

        let Some(row) = rows.first() else {
            info!("No stored profile for user {user_id}");
            return Ok(RecommendationResult {
                skill_analysis: SkillAnalysis::default(),
                recommendations: Vec::new(),
                reasoning: build_reasoning(&SkillAnalysis::default(), None, &[]),
            });
        };

        let profile = UserProfile::from_row(row);
        let text = profile_query_text(&profile);
        self.smart_recommendations(&text, Some(&profile), top_k, false)
            .await
    }

    /// Best-effort cache warm-up at startup. Failures are logged, not
    /// fatal: the caches reload lazily on first request.
    pub async fn warm_caches(&self) {
        if let Err(e) = self
            .vocabulary
            .get(self.store.as_ref(), self.embedder.as_ref())
            .await
        {
            warn!("Skill vocabulary warm-up failed: {e}");
        }
        if let Err(e) = self
            .cert_cache
            .get(self.store.as_ref(), self.embedder.as_ref())
            .await
        {
            warn!("Certification catalog warm-up failed: {e}");
        }
    }

    /// Drops both caches and reloads them synchronously. Returns
    /// (canonical skills, certifications) counts for the admin response.
    pub async fn refresh_caches(&self) -> Result<(usize, usize), AppError> {
        self.vocabulary.refresh().await;
        self.cert_cache.refresh().await;

        let vocabulary = self
            .vocabulary
            .get(self.store.as_ref(), self.embedder.as_ref())
            .await?;
        let catalog = self
            .cert_cache
            .get(self.store.as_ref(), self.embedder.as_ref())
            .await?;
        Ok((vocabulary.skills.len(), catalog.certifications.len()))
    }
}

/// Level resolution order: explicit profile choice, then the hint inferred
/// from text, then the experience-year bands.
pub fn resolve_level(explicit: Option<Level>, analysis: &SkillAnalysis) -> Level {
    explicit
        .or(analysis.level_hint)
        .unwrap_or_else(|| Level::from_experience_years(analysis.experience_years))
}

fn merge_skill_vector(inferred: &SkillVector, profile: Option<&UserProfile>) -> SkillVector {
    let mut vector = inferred.clone();
    if let Some(profile) = profile {
        for skill in &profile.skills {
            vector.entry(skill.clone()).or_insert(PROFILE_SKILL_WEIGHT);
        }
    }
    vector
}

fn merge_domains(inferred: &[String], profile: Option<&UserProfile>) -> Vec<String> {
    let mut domains: Vec<String> = inferred.to_vec();
    if let Some(profile) = profile {
        for domain in &profile.domains {
            if !domains.iter().any(|d| d.eq_ignore_ascii_case(domain)) {
                domains.push(domain.clone());
            }
        }
    }
    domains
}

/// French query text synthesized from a stored profile, mirroring what a
/// user would have typed.
fn profile_query_text(profile: &UserProfile) -> String {
    let mut parts = Vec::new();
    if let Some(objective) = &profile.objective {
        parts.push(format!("Objectif: {objective}"));
    }
    if let Some(level) = profile.level {
        parts.push(format!("Niveau: {level}"));
    }
    if !profile.skills.is_empty() {
        parts.push(format!("Compétences: {}", profile.skills.join(", ")));
    }
    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    use crate::store::Row;

    /// Dispatches on the query text: profile lookup, vocabulary scan,
    /// filtered retrieval and catalog load all hit the same store.
    struct FakeStore {
        certifications: Vec<Value>,
        profile: Option<Value>,
    }

    #[async_trait]
    impl GraphStore for FakeStore {
        async fn run(&self, query: &str, _params: Value) -> Result<Vec<Row>, AppError> {
            let rows = if query.contains(":Profile") {
                self.profile.iter().cloned().collect()
            } else if query.contains("AS title") {
                self.certifications.clone()
            } else {
                // Vocabulary query: skills column only
                self.certifications
                    .iter()
                    .map(|c| json!({ "skills": c["skills"].clone() }))
                    .collect()
            };
            Ok(rows
                .iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect())
        }
    }

    /// Embeds known skill words onto fixed axes; any other text embeds to
    /// the first axis so catalog and query embeddings stay non-degenerate.
    struct AxisEmbedder;

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Ok(texts
                .iter()
                .map(|t| match t.to_lowercase().as_str() {
                    "python" => vec![1.0, 0.0, 0.0],
                    "sql" => vec![0.0, 1.0, 0.0],
                    _ => vec![0.0, 0.0, 1.0],
                })
                .collect())
        }
    }

    struct NoLlm;

    #[async_trait]
    impl crate::llm_client::TextGenerator for NoLlm {
        async fn complete(
            &self,
            _system: Option<&str>,
            _prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, crate::llm_client::LlmError> {
            Err(crate::llm_client::LlmError::EmptyContent)
        }
    }

    fn cert(id: &str, level: &str, domain: &str, skills: Value, price: f64) -> Value {
        json!({
            "id": id,
            "title": format!("Certification {id}"),
            "domain": domain,
            "level": level,
            "objective": "objectif",
            "skills": skills,
            "price": price,
        })
    }

    fn recommender(store: FakeStore) -> Recommender {
        let store: Arc<dyn GraphStore> = Arc::new(store);
        let embedder: Arc<dyn Embedder> = Arc::new(AxisEmbedder);
        let vocabulary = Arc::new(SkillVocabulary::new());
        Recommender {
            store: Arc::clone(&store),
            embedder: Arc::clone(&embedder),
            cross_scorer: None,
            normalizer: SkillNormalizer {
                store: Arc::clone(&store),
                embedder: Arc::clone(&embedder),
                llm: Arc::new(NoLlm),
                vocabulary: Arc::clone(&vocabulary),
            },
            vocabulary,
            cert_cache: Arc::new(CertificationCache::new()),
        }
    }

    #[test]
    fn test_resolve_level_priority() {
        let analysis = SkillAnalysis {
            level_hint: Some(Level::Intermediaire),
            experience_years: 7,
            ..SkillAnalysis::default()
        };
        assert_eq!(
            resolve_level(Some(Level::Debutant), &analysis),
            Level::Debutant
        );
        assert_eq!(resolve_level(None, &analysis), Level::Intermediaire);

        let bands_only = SkillAnalysis {
            experience_years: 7,
            ..SkillAnalysis::default()
        };
        assert_eq!(resolve_level(None, &bands_only), Level::Avance);
    }

    #[test]
    fn test_merge_skill_vector_keeps_inferred_weights() {
        let mut inferred = SkillVector::new();
        inferred.insert("Python".to_string(), 0.9);
        let profile = UserProfile {
            skills: vec!["Python".to_string(), "Terraform".to_string()],
            ..UserProfile::default()
        };
        let merged = merge_skill_vector(&inferred, Some(&profile));
        assert_eq!(merged["Python"], 0.9);
        assert_eq!(merged["Terraform"], 0.5);
    }

    #[test]
    fn test_merge_domains_union_without_duplicates() {
        let profile = UserProfile {
            domains: vec!["Cloud".to_string(), "data".to_string()],
            ..UserProfile::default()
        };
        let merged = merge_domains(&["cloud".to_string()], Some(&profile));
        assert_eq!(merged, vec!["cloud", "data"]);
    }

    #[test]
    fn test_profile_query_text_french_synthesis() {
        let profile = UserProfile {
            level: Some(Level::Avance),
            objective: Some("devenir architecte cloud".to_string()),
            skills: vec!["Python".to_string(), "AWS".to_string()],
            ..UserProfile::default()
        };
        assert_eq!(
            profile_query_text(&profile),
            "Objectif: devenir architecte cloud. Niveau: avancé. Compétences: Python, AWS"
        );
    }

    #[tokio::test]
    async fn test_smart_recommendations_end_to_end() {
        let store = FakeStore {
            certifications: vec![
                cert("data-cert", "débutant", "data", json!(["Python", "SQL"]), 100.0),
                cert("k8s-cert", "avancé", "cloud", json!(["Kubernetes"]), 200.0),
            ],
            profile: None,
        };
        let recommender = recommender(store);

        let result = recommender
            .smart_recommendations("Je débute et je maîtrise python et sql", None, 5, false)
            .await
            .unwrap();

        // Two canonical skills matched; the Kubernetes cert has none and is
        // dropped by retrieval
        assert_eq!(result.recommendations.len(), 1);
        let top = &result.recommendations[0];
        assert_eq!(top.id, "data-cert");
        assert_eq!(top.skill_matches, 2);
        assert!(top.combined_score.is_some());
        assert_eq!(
            result.reasoning.user_profile_summary.experience_level,
            "débutant"
        );
        assert!(!result.reasoning.recommendation_evidence.is_empty());
    }

    #[tokio::test]
    async fn test_held_certifications_are_dropped() {
        let store = FakeStore {
            certifications: vec![cert(
                "aws-cloud-practitioner",
                "débutant",
                "cloud",
                json!(["Python"]),
                100.0,
            )],
            profile: None,
        };
        let recommender = recommender(store);

        let result = recommender
            .smart_recommendations(
                "Certification AWS Cloud Practitioner obtenue en 2021, je code en python",
                None,
                5,
                false,
            )
            .await
            .unwrap();

        assert!(result.recommendations.is_empty());
        assert_eq!(
            result.skill_analysis.held_certifications,
            vec!["aws-cloud-practitioner"]
        );
    }

    #[tokio::test]
    async fn test_top_k_truncates_after_rerank() {
        let store = FakeStore {
            certifications: (0..6)
                .map(|i| cert(&format!("c{i}"), "débutant", "data", json!(["Python"]), 100.0))
                .collect(),
            profile: None,
        };
        let recommender = recommender(store);

        let result = recommender
            .smart_recommendations("python", None, 2, false)
            .await
            .unwrap();
        assert_eq!(result.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_recommendations_for_user_missing_profile() {
        let store = FakeStore {
            certifications: vec![],
            profile: None,
        };
        let recommender = recommender(store);

        let result = recommender
            .recommendations_for_user("ghost", 5)
            .await
            .unwrap();
        assert!(result.recommendations.is_empty());
        assert!(result.skill_analysis.extracted_skills.is_empty());
    }

    #[tokio::test]
    async fn test_recommendations_for_user_uses_stored_profile() {
        let store = FakeStore {
            certifications: vec![
                cert("data-cert", "intermédiaire", "data", json!(["Python", "SQL"]), 100.0),
            ],
            profile: Some(json!({
                "level": "intermédiaire",
                "objective": "monter en compétence data",
                "budget": 500,
                "skills": "Python, SQL"
            })),
        };
        let recommender = recommender(store);

        let result = recommender.recommendations_for_user("u1", 5).await.unwrap();
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(
            result.reasoning.user_profile_summary.experience_level,
            "intermédiaire"
        );
    }

    #[tokio::test]
    async fn test_refresh_caches_reports_counts() {
        let store = FakeStore {
            certifications: vec![cert("c1", "débutant", "data", json!(["Python", "SQL"]), 100.0)],
            profile: None,
        };
        let recommender = recommender(store);

        let (skills, certifications) = recommender.refresh_caches().await.unwrap();
        assert_eq!(skills, 2);
        assert_eq!(certifications, 1);
    }
}
