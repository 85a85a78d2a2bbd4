//! Candidate retriever — pulls filtered certifications from the knowledge
//! store and computes the weighted skill-overlap relevance score.
//!
//! The store only applies the cheap filters (domain/level/budget); match
//! sets and relevance are computed here so the scoring semantics stay in
//! one testable place regardless of how the store encodes skills.

use serde_json::json;
use tracing::debug;

use crate::errors::AppError;
use crate::models::certification::Candidate;
use crate::models::profile::{Level, SkillVector};
use crate::store::GraphStore;

const FILTERED_CERTIFICATIONS_QUERY: &str = "
MATCH (c:Certification)
WHERE c.competences IS NOT NULL
  AND ($domains IS NULL OR size($domains) = 0 OR
       ANY(d IN $domains WHERE toLower(c.domaine) CONTAINS toLower(d)))
  AND ($level IS NULL OR toLower(c.niveau) = toLower($level))
  AND ($budget IS NULL OR c.prix <= $budget)
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

const BASIC_CERTIFICATIONS_QUERY: &str = "
MATCH (c:Certification)
WHERE ($domains IS NULL OR size($domains) = 0 OR
       ANY(d IN $domains WHERE toLower(c.domaine) CONTAINS toLower(d)))
  AND ($level IS NULL OR toLower(c.niveau) = toLower($level))
  AND ($budget IS NULL OR c.prix <= $budget)
OPTIONAL MATCH (c)-[:TEACHES]->(s:Skill)
WITH c, collect(DISTINCT s.name) AS taught
RETURN
    c.id AS id,
    c.titre AS title,
    c.domaine AS domain,
    c.niveau AS level,
    c.objectif AS objective,
    CASE WHEN size(taught) > 0 THEN taught ELSE c.competences END AS skills,
    c.duree AS duration,
    c.prix AS price,
    c.url AS url,
    c.langues AS languages,
    c.temps_par_semaine AS hours_per_week
ORDER BY c.prix ASC
LIMIT $limit
";

/// Retrieves certifications matching the weighted skill vector.
///
/// A candidate with zero matches is still returned when the vector has
/// fewer than two entries — too little signal to filter hard. Ordering:
/// relevance desc, match count desc, price asc.
pub async fn query_by_skills(
    store: &dyn GraphStore,
    skill_vector: &SkillVector,
    domains: &[String],
    level: Option<Level>,
    budget: Option<f64>,
    limit: usize,
) -> Result<Vec<Candidate>, AppError> {
    if skill_vector.is_empty() {
        return query_basic(store, domains, level, budget, limit).await;
    }

    let rows = store
        .run(
            FILTERED_CERTIFICATIONS_QUERY,
            json!({
                "domains": domains,
                "level": level.map(|l| l.as_str()),
                "budget": budget,
            }),
        )
        .await?;

    let allow_no_match = skill_vector.len() < 2;

    let mut candidates: Vec<Candidate> = rows
        .iter()
        .map(Candidate::from_row)
        .map(|mut candidate| {
            score_candidate(&mut candidate, skill_vector);
            candidate
        })
        .filter(|c| c.skill_matches > 0 || allow_no_match)
        .collect();

    candidates.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.skill_matches.cmp(&a.skill_matches))
            .then(
                a.price
                    .unwrap_or(f64::INFINITY)
                    .partial_cmp(&b.price.unwrap_or(f64::INFINITY))
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    candidates.truncate(limit);

    debug!(
        "Skill retrieval: {} candidates (allow_no_match={})",
        candidates.len(),
        allow_no_match
    );
    Ok(candidates)
}

/// Fallback retrieval when no skills are known: same filters, skills taken
/// from the TEACHES relation (else the declared list), relevance pinned at
/// zero, cheapest first.
pub async fn query_basic(
    store: &dyn GraphStore,
    domains: &[String],
    level: Option<Level>,
    budget: Option<f64>,
    limit: usize,
) -> Result<Vec<Candidate>, AppError> {
    let rows = store
        .run(
            BASIC_CERTIFICATIONS_QUERY,
            json!({
                "domains": domains,
                "level": level.map(|l| l.as_str()),
                "budget": budget,
                "limit": limit,
            }),
        )
        .await?;

    let mut candidates: Vec<Candidate> = rows.iter().map(Candidate::from_row).collect();
    for candidate in &mut candidates {
        candidate.total_skills = candidate.skills.len();
    }

    // The store already orders by price; re-sort to stay correct against
    // fakes and stores that ignore the ORDER BY
    candidates.sort_by(|a, b| {
        a.price
            .unwrap_or(f64::INFINITY)
            .partial_cmp(&b.price.unwrap_or(f64::INFINITY))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(limit);

    Ok(candidates)
}

/// Computes the match set and relevance score for one candidate.
///
/// Match rule: a user skill matches when some candidate skill contains it
/// or is contained by it, case-insensitively.
/// relevance = |matches| / |candidate skills| × 100, capped at 100.
pub fn score_candidate(candidate: &mut Candidate, skill_vector: &SkillVector) {
    let matched: Vec<String> = skill_vector
        .keys()
        .filter(|user_skill| {
            let user_lower = user_skill.to_lowercase();
            candidate.skills.iter().any(|cert_skill| {
                let cert_lower = cert_skill.to_lowercase();
                cert_lower.contains(&user_lower) || user_lower.contains(&cert_lower)
            })
        })
        .cloned()
        .collect();

    candidate.skill_matches = matched.len();
    candidate.total_skills = candidate.skills.len();
    candidate.relevance_score = if matched.is_empty() || candidate.skills.is_empty() {
        0.0
    } else {
        let raw = matched.len() as f64 / candidate.skills.len() as f64 * 100.0;
        (raw.min(100.0) * 100.0).round() / 100.0
    };
    candidate.matched_skills = matched;
}
