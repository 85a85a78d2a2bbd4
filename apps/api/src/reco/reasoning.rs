//! Reasoning builder — a pure projection of the pipeline result into the
//! explanation block returned alongside the recommendations.

use serde::{Deserialize, Serialize};

use crate::models::certification::Candidate;
use crate::models::profile::{Level, SkillAnalysis};

const MAX_SUMMARY_SKILLS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reasoning {
    pub user_profile_summary: ProfileSummary,
    pub recommendation_evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub detected_skills: Vec<String>,
    pub domains_of_interest: Vec<String>,
    pub experience_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub certification: String,
    pub relevance_score: f64,
    pub matched_skills: Vec<String>,
    pub match_reason: String,
}

/// Builds the explanation block for a finished recommendation run.
pub fn build_reasoning(
    analysis: &SkillAnalysis,
    level: Option<Level>,
    recommendations: &[Candidate],
) -> Reasoning {
    // Canonical skill-vector keys, not the raw extracted strings
    let detected_skills = analysis
        .skill_vector
        .keys()
        .take(MAX_SUMMARY_SKILLS)
        .cloned()
        .collect();

    let experience_level = level
        .map(|l| l.to_string())
        .unwrap_or_else(|| "non spécifié".to_string());

    let recommendation_evidence = recommendations
        .iter()
        .map(|candidate| Evidence {
            certification: candidate.title.clone(),
            relevance_score: candidate.ranking_score(),
            matched_skills: candidate.matched_skills.clone(),
            match_reason: match_reason(candidate),
        })
        .collect();

    Reasoning {
        user_profile_summary: ProfileSummary {
            detected_skills,
            domains_of_interest: analysis.domains.clone(),
            experience_level,
        },
        recommendation_evidence,
    }
}

fn match_reason(candidate: &Candidate) -> String {
    match candidate.skill_matches {
        n if n >= 3 => format!(
            "Forte correspondance avec vos compétences: {}",
            candidate.matched_skills.join(", ")
        ),
        1 | 2 => format!(
            "Correspondance partielle avec vos compétences: {}",
            candidate.matched_skills.join(", ")
        ),
        _ => "Recommandation basée sur le domaine et le niveau demandé".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(skills: &[&str], domains: &[&str]) -> SkillAnalysis {
        SkillAnalysis {
            extracted_skills: skills.iter().map(|s| s.to_string()).collect(),
            skill_vector: skills.iter().map(|s| (s.to_string(), 1.0)).collect(),
            domains: domains.iter().map(|s| s.to_string()).collect(),
            ..SkillAnalysis::default()
        }
    }

    fn candidate(title: &str, matched: &[&str]) -> Candidate {
        Candidate {
            title: title.to_string(),
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            skill_matches: matched.len(),
            relevance_score: 42.0,
            ..Candidate::default()
        }
    }

    #[test]
    fn test_summary_truncates_to_ten_skills() {
        let skills: Vec<String> = (0..15).map(|i| format!("skill{i}")).collect();
        let refs: Vec<&str> = skills.iter().map(String::as_str).collect();
        let reasoning = build_reasoning(&analysis(&refs, &["cloud"]), Some(Level::Debutant), &[]);
        assert_eq!(reasoning.user_profile_summary.detected_skills.len(), 10);
        assert_eq!(reasoning.user_profile_summary.experience_level, "débutant");
    }

    #[test]
    fn test_summary_uses_canonical_skill_names() {
        // Raw extraction said "js", normalization resolved it to "javascript"
        let mut a = analysis(&[], &[]);
        a.extracted_skills = vec!["js".to_string()];
        a.skill_vector.insert("javascript".to_string(), 0.9);
        let reasoning = build_reasoning(&a, None, &[]);
        assert_eq!(
            reasoning.user_profile_summary.detected_skills,
            vec!["javascript"]
        );
    }

    #[test]
    fn test_missing_level_reads_non_specifie() {
        let reasoning = build_reasoning(&analysis(&[], &[]), None, &[]);
        assert_eq!(
            reasoning.user_profile_summary.experience_level,
            "non spécifié"
        );
    }

    #[test]
    fn test_match_reason_strong() {
        let c = candidate("Cert", &["python", "sql", "spark"]);
        assert_eq!(
            match_reason(&c),
            "Forte correspondance avec vos compétences: python, sql, spark"
        );
    }

    #[test]
    fn test_match_reason_partial() {
        let c = candidate("Cert", &["python"]);
        assert!(match_reason(&c).starts_with("Correspondance partielle"));
    }

    #[test]
    fn test_match_reason_generic_when_no_matches() {
        let c = candidate("Cert", &[]);
        assert_eq!(
            match_reason(&c),
            "Recommandation basée sur le domaine et le niveau demandé"
        );
    }

    #[test]
    fn test_evidence_uses_ranking_score() {
        let mut c = candidate("Cert", &["python"]);
        c.combined_score = Some(77.5);
        let reasoning = build_reasoning(&analysis(&["python"], &[]), None, &[c]);
        assert_eq!(reasoning.recommendation_evidence[0].relevance_score, 77.5);
        assert_eq!(reasoning.recommendation_evidence[0].certification, "Cert");
    }
}
