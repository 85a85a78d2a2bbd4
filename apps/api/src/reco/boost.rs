//! Score booster — deterministic additive adjustments for level and domain
//! alignment, applied in place between retrieval and semantic re-ranking.
//!
//! The constants are tuned values; treat them as configuration.

use tracing::debug;

use crate::models::certification::{Candidate, LevelMatch};
use crate::models::profile::Level;

pub const LEVEL_EXACT_BOOST: f64 = 60.0;
pub const LEVEL_TOO_HIGH_FOR_BEGINNER_PENALTY: f64 = -50.0;
pub const LEVEL_WAY_TOO_HIGH_FOR_BEGINNER_PENALTY: f64 = -80.0;
pub const LEVEL_TOO_LOW_FOR_INTERMEDIATE_PENALTY: f64 = -15.0;
pub const LEVEL_TOO_HIGH_FOR_INTERMEDIATE_PENALTY: f64 = -25.0;
pub const LEVEL_ACCEPTABLE_FOR_ADVANCED_BOOST: f64 = 15.0;
pub const LEVEL_WAY_TOO_LOW_FOR_ADVANCED_PENALTY: f64 = -50.0;

pub const DOMAIN_MATCH_BOOST: f64 = 40.0;
pub const DOMAIN_MISMATCH_PENALTY: f64 = -30.0;

/// Title keywords that imply a domain even when the domain field says
/// otherwise (an "AWS Architect" certification is a cloud certification).
const CLOUD_TITLE_ALIASES: &[&str] = &["aws", "azure", "gcp", "google cloud"];
const AI_TITLE_ALIASES: &[&str] = &[
    "machine learning",
    "deep learning",
    "nlp",
    "tensorflow",
    "pytorch",
];

/// Adjusts each candidate's relevance score for level alignment and tags
/// it with a `LevelMatch` classification. Aggressively asymmetric: a
/// beginner must never see an advanced certification ranked first.
pub fn apply_level_boost(candidates: &mut [Candidate], target: Level) {
    let target_str = target.as_str();
    debug!("Applying level boosting for: {target_str}");

    for candidate in candidates.iter_mut() {
        let cert_level = candidate.level.to_lowercase();

        let (delta, tag) = if cert_level.contains(target_str) || target_str.contains(cert_level.as_str())
        {
            (LEVEL_EXACT_BOOST, Some(LevelMatch::Exact))
        } else {
            match target {
                Level::Debutant => {
                    if cert_level.contains("intermédiaire") {
                        (LEVEL_TOO_HIGH_FOR_BEGINNER_PENALTY, Some(LevelMatch::TooHigh))
                    } else if cert_level.contains("avancé") {
                        (
                            LEVEL_WAY_TOO_HIGH_FOR_BEGINNER_PENALTY,
                            Some(LevelMatch::WayTooHigh),
                        )
                    } else {
                        (0.0, None)
                    }
                }
                Level::Intermediaire => {
                    if cert_level.contains("débutant") {
                        (LEVEL_TOO_LOW_FOR_INTERMEDIATE_PENALTY, Some(LevelMatch::TooLow))
                    } else if cert_level.contains("avancé") {
                        (
                            LEVEL_TOO_HIGH_FOR_INTERMEDIATE_PENALTY,
                            Some(LevelMatch::TooHigh),
                        )
                    } else {
                        (0.0, None)
                    }
                }
                Level::Avance => {
                    if cert_level.contains("intermédiaire") {
                        (
                            LEVEL_ACCEPTABLE_FOR_ADVANCED_BOOST,
                            Some(LevelMatch::Acceptable),
                        )
                    } else if cert_level.contains("débutant") {
                        (
                            LEVEL_WAY_TOO_LOW_FOR_ADVANCED_PENALTY,
                            Some(LevelMatch::WayTooLow),
                        )
                    } else {
                        (0.0, None)
                    }
                }
            }
        };

        candidate.relevance_score += delta;
        candidate.level_match = tag;
    }
}

/// Adjusts each candidate's relevance score for domain alignment. The
/// first matching requested domain wins; alias checks cover titles that
/// carry a vendor name instead of the domain word.
pub fn apply_domain_boost(candidates: &mut [Candidate], domains: &[String]) {
    if domains.is_empty() {
        return;
    }
    debug!("Applying domain boosting for: {domains:?}");

    for candidate in candidates.iter_mut() {
        let cert_domain = candidate.domain.to_lowercase();
        let cert_title = candidate.title.to_lowercase();

        let mut matched = false;
        for target in domains {
            let target = target.to_lowercase();
            if cert_domain.contains(&target) || cert_title.contains(&target) {
                matched = true;
                break;
            }
            if target == "cloud" && CLOUD_TITLE_ALIASES.iter().any(|kw| cert_title.contains(kw)) {
                matched = true;
                break;
            }
            if target == "ai" && AI_TITLE_ALIASES.iter().any(|kw| cert_title.contains(kw)) {
                matched = true;
                break;
            }
        }

        if matched {
            candidate.relevance_score += DOMAIN_MATCH_BOOST;
            candidate.domain_match = Some(true);
        } else {
            candidate.relevance_score += DOMAIN_MISMATCH_PENALTY;
            candidate.domain_match = Some(false);
        }
    }
}

/// Re-sorts by boosted relevance, descending. Boosted scores may be
/// negative — they stay unclamped and are used purely as an ordering key.
pub fn sort_by_relevance(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
