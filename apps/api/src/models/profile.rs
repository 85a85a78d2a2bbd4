//! User-side data models: experience level, weighted skill vector, profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::{row_opt_f64, row_opt_string, Row};

/// Weighted mapping from canonical skill name to confidence in [0, 1].
/// Absent skill ⇒ absent key; weights are never negative.
pub type SkillVector = BTreeMap<String, f32>;

/// Experience level. Catalog data and user text are French, so the wire
/// representation keeps the accented French labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "débutant")]
    Debutant,
    #[serde(rename = "intermédiaire")]
    Intermediaire,
    #[serde(rename = "avancé")]
    Avance,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debutant => "débutant",
            Level::Intermediaire => "intermédiaire",
            Level::Avance => "avancé",
        }
    }

    /// Lenient parse: matches by containment so hints like
    /// "niveau avancé recommandé" still resolve.
    pub fn from_hint(hint: &str) -> Option<Level> {
        let hint = hint.to_lowercase();
        if hint.contains("avancé") || hint.contains("avance") {
            Some(Level::Avance)
        } else if hint.contains("intermédiaire") || hint.contains("intermediaire") {
            Some(Level::Intermediaire)
        } else if hint.contains("débutant") || hint.contains("debutant") {
            Some(Level::Debutant)
        } else {
            None
        }
    }

    /// Level inferred from years of professional experience:
    /// 0–1 ⇒ débutant, 2–4 ⇒ intermédiaire, ≥5 ⇒ avancé.
    pub fn from_experience_years(years: u32) -> Level {
        if years >= 5 {
            Level::Avance
        } else if years >= 2 {
            Level::Intermediaire
        } else {
            Level::Debutant
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit user preferences stored on the Profile node. These outrank
/// anything inferred from document text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub level: Option<Level>,
    pub objective: Option<String>,
    pub budget: Option<f64>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl UserProfile {
    /// Builds a profile from a store row (`level`, `objective`, `budget`,
    /// `skills` columns). Missing fields stay unset.
    pub fn from_row(row: &Row) -> Self {
        UserProfile {
            level: row_opt_string(row, "level")
                .as_deref()
                .and_then(Level::from_hint),
            objective: row_opt_string(row, "objective"),
            budget: row_opt_f64(row, "budget"),
            domains: Vec::new(),
            skills: crate::models::certification::normalize_skills(
                row.get("skills").unwrap_or(&serde_json::Value::Null),
            ),
        }
    }
}

/// Full output of profile extraction from free-form text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub extracted_skills: Vec<String>,
    pub skill_vector: SkillVector,
    pub domains: Vec<String>,
    pub level_hint: Option<Level>,
    pub held_certifications: Vec<String>,
    pub experience_years: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_serializes_as_french_label() {
        assert_eq!(
            serde_json::to_string(&Level::Intermediaire).unwrap(),
            "\"intermédiaire\""
        );
    }

    #[test]
    fn test_level_from_hint_containment() {
        assert_eq!(Level::from_hint("plutôt avancé"), Some(Level::Avance));
        assert_eq!(Level::from_hint("débutant"), Some(Level::Debutant));
        assert_eq!(Level::from_hint("unknown"), None);
    }

    #[test]
    fn test_level_from_experience_bands() {
        assert_eq!(Level::from_experience_years(0), Level::Debutant);
        assert_eq!(Level::from_experience_years(1), Level::Debutant);
        assert_eq!(Level::from_experience_years(2), Level::Intermediaire);
        assert_eq!(Level::from_experience_years(4), Level::Intermediaire);
        assert_eq!(Level::from_experience_years(5), Level::Avance);
    }

    #[test]
    fn test_user_profile_from_row() {
        let row = json!({
            "level": "intermédiaire",
            "objective": "devenir data engineer",
            "budget": 500,
            "skills": "Python, SQL"
        });
        let profile = UserProfile::from_row(row.as_object().unwrap());
        assert_eq!(profile.level, Some(Level::Intermediaire));
        assert_eq!(profile.budget, Some(500.0));
        assert_eq!(profile.skills, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_user_profile_from_empty_row() {
        let row = json!({});
        let profile = UserProfile::from_row(row.as_object().unwrap());
        assert!(profile.level.is_none());
        assert!(profile.budget.is_none());
        assert!(profile.skills.is_empty());
    }

    #[test]
    fn test_skill_analysis_default_is_all_empty() {
        let analysis = SkillAnalysis::default();
        assert!(analysis.extracted_skills.is_empty());
        assert!(analysis.skill_vector.is_empty());
        assert!(analysis.domains.is_empty());
        assert!(analysis.level_hint.is_none());
        assert!(analysis.held_certifications.is_empty());
        assert_eq!(analysis.experience_years, 0);
    }
}
