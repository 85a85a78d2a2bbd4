//! Skill normalizer — turns free-form text into a weighted skill vector.
//!
//! Raw extraction prefers the LLM (constrained comma-list prompt) and falls
//! back to deterministic keyword scanning; raw phrases are then mapped onto
//! the canonical vocabulary by embedding similarity.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::embedding::{cosine_similarity, Embedder};
use crate::errors::AppError;
use crate::llm_client::prompts::{
    SKILL_EXTRACTION_INPUT_LIMIT, SKILL_EXTRACTION_SYSTEM, SKILL_EXTRACTION_TEMPLATE,
};
use crate::llm_client::TextGenerator;
use crate::models::profile::{SkillAnalysis, SkillVector};
use crate::profile::catalog::{
    FALLBACK_SKIP_TERMS, GENERIC_SKILL_TERMS, SALVAGE_SKILLS, TECH_SKILLS,
};
use crate::profile::signals::{
    detect_domains, detect_experience_years, detect_held_certifications, detect_level_hint,
};
use crate::profile::vocabulary::SkillVocabulary;
use crate::store::GraphStore;

/// Minimum cosine similarity for a raw phrase to map onto a canonical
/// skill. Below this the phrase is dropped silently.
pub const CANONICAL_MATCH_THRESHOLD: f32 = 0.6;

const MAX_EXTRACTED_SKILLS: usize = 20;

pub struct SkillNormalizer {
    pub store: Arc<dyn GraphStore>,
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn TextGenerator>,
    pub vocabulary: Arc<SkillVocabulary>,
}

impl SkillNormalizer {
    /// Full profile extraction. Empty input yields the all-empty default —
    /// never an error.
    pub async fn extract(&self, text: &str, use_llm: bool) -> Result<SkillAnalysis, AppError> {
        if text.trim().is_empty() {
            return Ok(SkillAnalysis::default());
        }

        let held_certifications = detect_held_certifications(text);
        let experience_years = detect_experience_years(text);

        let mut extracted = if use_llm {
            self.extract_with_llm(text).await
        } else {
            Vec::new()
        };
        if extracted.is_empty() {
            extracted = fallback_keyword_scan(text);
        }

        let skill_vector = if extracted.is_empty() {
            SkillVector::new()
        } else {
            self.map_to_canonical(&extracted).await?
        };

        let domains = detect_domains(text);
        let level_hint = detect_level_hint(text, experience_years);

        debug!(
            "Extraction: {} raw skills, {} canonical, {} years, level {}",
            extracted.len(),
            skill_vector.len(),
            experience_years,
            level_hint
        );

        Ok(SkillAnalysis {
            extracted_skills: extracted,
            skill_vector,
            domains,
            level_hint: Some(level_hint),
            held_certifications,
            experience_years,
        })
    }

    /// LLM extraction path. Any failure (transport, rate limit, malformed
    /// output) resolves to an empty list so the caller falls back — never
    /// propagated.
    async fn extract_with_llm(&self, text: &str) -> Vec<String> {
        let excerpt = truncate_chars(text, SKILL_EXTRACTION_INPUT_LIMIT);
        let prompt = SKILL_EXTRACTION_TEMPLATE.replace("{text}", excerpt);

        match self
            .llm
            .complete(Some(SKILL_EXTRACTION_SYSTEM), &prompt, 0.0, 200)
            .await
        {
            Ok(raw) => parse_skill_list(&raw),
            Err(e) => {
                warn!("LLM skill extraction failed, using keyword fallback: {e}");
                Vec::new()
            }
        }
    }

    /// Maps raw phrases to canonical skills by embedding similarity. When
    /// several phrases land on the same canonical skill the maximum
    /// similarity wins.
    async fn map_to_canonical(&self, extracted: &[String]) -> Result<SkillVector, AppError> {
        let vocabulary = self
            .vocabulary
            .get(self.store.as_ref(), self.embedder.as_ref())
            .await?;
        if vocabulary.skills.is_empty() {
            return Ok(SkillVector::new());
        }

        let phrase_embeddings = self.embedder.embed(extracted).await?;

        let mut skill_vector = SkillVector::new();
        for embedding in &phrase_embeddings {
            let mut best: Option<(usize, f32)> = None;
            for (idx, vocab_embedding) in vocabulary.embeddings.iter().enumerate() {
                let similarity = cosine_similarity(embedding, vocab_embedding);
                if best.map_or(true, |(_, s)| similarity > s) {
                    best = Some((idx, similarity));
                }
            }

            if let Some((idx, similarity)) = best {
                if similarity >= CANONICAL_MATCH_THRESHOLD {
                    let canonical = &vocabulary.skills[idx];
                    let weight = similarity.clamp(0.0, 1.0);
                    let entry = skill_vector.entry(canonical.clone()).or_insert(weight);
                    if *entry < weight {
                        *entry = weight;
                    }
                }
            }
        }

        Ok(skill_vector)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM output sanitation
// ────────────────────────────────────────────────────────────────────────────

static SENTENCE_MARKERS: &[&str] = &["Based on", "Here", "following"];

/// Parses a comma-separated skill list out of LLM output. Prose-shaped
/// responses are salvaged by scanning for known skill names; junk items
/// are filtered; the result is capped at 20 entries.
pub fn parse_skill_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();

    if raw.chars().count() > 500 || SENTENCE_MARKERS.iter().any(|m| raw.contains(m)) {
        let raw_lower = raw.to_lowercase();
        return SALVAGE_SKILLS
            .iter()
            .filter(|s| raw_lower.contains(&s.to_lowercase()))
            .map(|s| s.to_string())
            .collect();
    }

    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    let mut skills = Vec::new();
    for part in raw.split(',') {
        let skill = part
            .trim()
            .trim_matches('-')
            .trim_matches('•')
            .trim()
            .to_string();
        if skill.is_empty() {
            continue;
        }
        // Short all-lowercase terms are noise ("R" and "C" only count uppercase)
        if skill.chars().count() <= 2 && skill == skill.to_lowercase() {
            continue;
        }
        if skill.chars().count() > 50 {
            continue;
        }
        let lower = skill.to_lowercase();
        if lower.contains(" is ") || lower.contains(" are ") {
            continue;
        }
        if GENERIC_SKILL_TERMS.contains(&lower.as_str()) {
            continue;
        }
        skills.push(skill);
        if skills.len() >= MAX_EXTRACTED_SKILLS {
            break;
        }
    }

    skills
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword fallback
// ────────────────────────────────────────────────────────────────────────────

static SHORT_SKILL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TECH_SKILLS
        .iter()
        .filter(|s| s.chars().count() <= 3)
        .map(|s| {
            let pattern = format!(r"\b{}\b", regex::escape(s));
            (*s, Regex::new(&pattern).expect("invalid skill keyword"))
        })
        .collect()
});

/// Deterministic extraction against the fixed technology list. Short
/// tokens are word-boundary matched; generic single words are skipped.
pub fn fallback_keyword_scan(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut found = Vec::new();

    for skill in TECH_SKILLS {
        if FALLBACK_SKIP_TERMS.contains(skill) {
            continue;
        }
        let matched = if skill.chars().count() <= 3 {
            SHORT_SKILL_PATTERNS
                .iter()
                .find(|(s, _)| s == skill)
                .map(|(_, p)| p.is_match(&text_lower))
                .unwrap_or(false)
        } else {
            text_lower.contains(skill)
        };
        if matched {
            found.push(skill.to_string());
        }
    }

    found
}

/// Char-safe prefix truncation (the input may be an accented résumé).
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::llm_client::LlmError;
    use crate::store::Row;

    // ── parse_skill_list ────────────────────────────────────────────────

    #[test]
    fn test_parse_simple_list() {
        assert_eq!(
            parse_skill_list("AWS, Python, SQL, Spark"),
            vec!["AWS", "Python", "SQL", "Spark"]
        );
    }

    #[test]
    fn test_parse_none_is_empty() {
        assert!(parse_skill_list("NONE").is_empty());
        assert!(parse_skill_list("  none  ").is_empty());
        assert!(parse_skill_list("").is_empty());
    }

    #[test]
    fn test_parse_filters_generic_terms() {
        assert_eq!(parse_skill_list("cloud, AWS, data, ai, Python"), vec!["AWS", "Python"]);
    }

    #[test]
    fn test_parse_keeps_uppercase_r_drops_lowercase() {
        assert_eq!(parse_skill_list("R, go, SQL"), vec!["R", "SQL"]);
    }

    #[test]
    fn test_parse_drops_sentences_and_long_items() {
        let long = "x".repeat(60);
        let input = format!("Python, this is a sentence, {long}, SQL");
        assert_eq!(parse_skill_list(&input), vec!["Python", "SQL"]);
    }

    #[test]
    fn test_parse_prose_response_salvages_known_skills() {
        let raw = "Based on the text, the candidate knows AWS and Python quite well.";
        let salvaged = parse_skill_list(raw);
        assert!(salvaged.contains(&"AWS".to_string()));
        assert!(salvaged.contains(&"Python".to_string()));
    }

    #[test]
    fn test_parse_caps_at_twenty() {
        let input = (0..30).map(|i| format!("Skill{i}")).collect::<Vec<_>>().join(", ");
        assert_eq!(parse_skill_list(&input).len(), 20);
    }

    #[test]
    fn test_parse_strips_bullets() {
        assert_eq!(parse_skill_list("- AWS, • Python"), vec!["AWS", "Python"]);
    }

    // ── fallback scan ───────────────────────────────────────────────────

    #[test]
    fn test_fallback_finds_long_skills_as_substring() {
        let found = fallback_keyword_scan("J'utilise Python et machine learning au quotidien");
        assert!(found.contains(&"python".to_string()));
        assert!(found.contains(&"machine learning".to_string()));
    }

    #[test]
    fn test_fallback_short_tokens_need_boundaries() {
        // "saws" must not match "aws"
        assert!(!fallback_keyword_scan("he saws wood").contains(&"aws".to_string()));
        assert!(fallback_keyword_scan("deployed on aws").contains(&"aws".to_string()));
    }

    #[test]
    fn test_fallback_skips_generic_terms() {
        let found = fallback_keyword_scan("cloud data ai");
        assert!(found.is_empty());
    }

    // ── full extraction with fakes ──────────────────────────────────────

    struct FakeStore;

    #[async_trait]
    impl crate::store::GraphStore for FakeStore {
        async fn run(&self, _query: &str, _params: Value) -> Result<Vec<Row>, AppError> {
            Ok(vec![json!({"skills": ["Python", "AWS", "SQL"]})
                .as_object()
                .unwrap()
                .clone()])
        }
    }

    /// Embeds known names onto fixed orthogonal axes so cosine is exact.
    struct AxisEmbedder;

    fn axis_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        if lower.contains("python") {
            vec![1.0, 0.0, 0.0]
        } else if lower.contains("aws") {
            vec![0.0, 1.0, 0.0]
        } else if lower.contains("sql") {
            vec![0.0, 0.0, 1.0]
        } else {
            vec![0.5, 0.5, 0.5]
        }
    }

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            Ok(texts.iter().map(|t| axis_for(t)).collect())
        }
    }

    struct FixedLlm(&'static str);

    #[async_trait]
    impl TextGenerator for FixedLlm {
        async fn complete(
            &self,
            _system: Option<&str>,
            _prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl TextGenerator for FailingLlm {
        async fn complete(
            &self,
            _system: Option<&str>,
            _prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn normalizer(llm: Arc<dyn TextGenerator>) -> SkillNormalizer {
        SkillNormalizer {
            store: Arc::new(FakeStore),
            embedder: Arc::new(AxisEmbedder),
            llm,
            vocabulary: Arc::new(SkillVocabulary::new()),
        }
    }

    #[tokio::test]
    async fn test_empty_text_returns_default_analysis() {
        let normalizer = normalizer(Arc::new(FixedLlm("Python")));
        let analysis = normalizer.extract("   ", true).await.unwrap();
        assert_eq!(analysis, SkillAnalysis::default());
    }

    #[tokio::test]
    async fn test_llm_skills_mapped_to_canonical() {
        let normalizer = normalizer(Arc::new(FixedLlm("Python, AWS")));
        let analysis = normalizer.extract("je veux progresser", true).await.unwrap();
        assert_eq!(analysis.extracted_skills, vec!["Python", "AWS"]);
        assert_eq!(analysis.skill_vector.len(), 2);
        assert!((analysis.skill_vector["Python"] - 1.0).abs() < 1e-6);
        assert!((analysis.skill_vector["AWS"] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back_to_keywords() {
        let normalizer = normalizer(Arc::new(FailingLlm));
        let analysis = normalizer
            .extract("J'utilise python et spark sur un data lake", true)
            .await
            .unwrap();
        assert!(analysis.extracted_skills.contains(&"python".to_string()));
        assert!(analysis.extracted_skills.contains(&"spark".to_string()));
    }

    #[tokio::test]
    async fn test_unmapped_phrases_dropped_silently() {
        // "Basketweaving" embeds off-axis: best cosine < 0.6 threshold
        let normalizer = normalizer(Arc::new(FixedLlm("Basketweaving")));
        let analysis = normalizer.extract("du texte", true).await.unwrap();
        assert_eq!(analysis.extracted_skills, vec!["Basketweaving"]);
        assert!(analysis.skill_vector.is_empty());
    }

    #[tokio::test]
    async fn test_warm_cache_extraction_is_idempotent() {
        let normalizer = normalizer(Arc::new(FixedLlm("Python, SQL")));
        let text = "Data analyst, requêtes SQL et scripts Python";
        let first = normalizer.extract(text, true).await.unwrap();
        let second = normalizer.extract(text, true).await.unwrap();
        assert_eq!(first.skill_vector, second.skill_vector);
    }

    #[tokio::test]
    async fn test_cv_with_held_cert_and_experience() {
        let normalizer = normalizer(Arc::new(FixedLlm("AWS")));
        let text =
            "AWS Certified Solutions Architect obtenu en 2022, 6 ans d'expérience comme Data Engineer";
        let analysis = normalizer.extract(text, true).await.unwrap();
        assert!(analysis
            .held_certifications
            .contains(&"aws-solutions-architect-associate".to_string()));
        assert_eq!(analysis.experience_years, 6);
        assert_eq!(
            analysis.level_hint,
            Some(crate::models::profile::Level::Avance)
        );
        assert!(analysis.domains.contains(&"cloud".to_string()));
        assert!(analysis.domains.contains(&"data".to_string()));
    }

    #[tokio::test]
    async fn test_student_profile_is_beginner() {
        let normalizer = normalizer(Arc::new(FixedLlm("NONE")));
        let analysis = normalizer
            .extract("Étudiant en dernière année, recherche de stage", true)
            .await
            .unwrap();
        assert_eq!(analysis.experience_years, 0);
        assert_eq!(
            analysis.level_hint,
            Some(crate::models::profile::Level::Debutant)
        );
    }
}
