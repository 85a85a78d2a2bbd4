//! Lexical/heuristic signal extractor — domains, experience years, held
//! certifications and a level hint, all from raw text.
//!
//! Pure functions over the rule tables in `catalog.rs`. No I/O.

use std::collections::HashMap;

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::profile::Level;
use crate::profile::catalog::{
    BEGINNER_KEYWORDS, DATE_RANGE_PATTERN, DOMAINS, DOMAIN_KEYWORDS, EDUCATION_TERMS,
    EXPLICIT_YEARS_PATTERNS, HELD_PATTERNS, JOB_TITLE_PATTERNS, KNOWN_CERTIFICATIONS,
    REAL_JOB_PATTERNS, SENIOR_PATTERNS, SHORT_KEYWORDS, STRONG_BEGINNER_INDICATORS,
    STRONG_DOMAIN_PATTERNS, WEAK_STUDENT_INDICATORS,
};

/// Word-boundary matchers for the short ambiguous tokens.
static SHORT_KEYWORD_PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    SHORT_KEYWORDS
        .iter()
        .map(|kw| {
            let pattern = format!(r"\b{}\b", regex::escape(kw));
            (*kw, Regex::new(&pattern).expect("invalid short keyword"))
        })
        .collect()
});

const STRONG_PATTERN_POINTS: u32 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Domain detection
// ────────────────────────────────────────────────────────────────────────────

/// Scores each known domain and returns those within 50% of the leader,
/// most relevant first. A clearly dominant leader (≥2× the runner-up)
/// is returned alone. No signal ⇒ empty.
pub fn detect_domains(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut scores: HashMap<&str, u32> = DOMAINS.iter().map(|d| (*d, 0)).collect();

    // Phrase-level patterns carry the most intent
    for (domain, patterns) in STRONG_DOMAIN_PATTERNS.iter() {
        for pattern in patterns {
            if pattern.is_match(&text_lower) {
                *scores.entry(*domain).or_default() += STRONG_PATTERN_POINTS;
            }
        }
    }

    // One point per keyword occurrence
    for (domain, keywords) in DOMAIN_KEYWORDS {
        for kw in *keywords {
            if let Some(pattern) = SHORT_KEYWORD_PATTERNS.get(*kw) {
                if pattern.is_match(&text_lower) {
                    *scores.entry(*domain).or_default() += 1;
                }
            } else {
                let count = text_lower.matches(kw).count() as u32;
                *scores.entry(*domain).or_default() += count;
            }
        }
    }

    let max_score = scores.values().copied().max().unwrap_or(0);
    if max_score == 0 {
        return Vec::new();
    }

    // Keep domains with at least half the leading score
    let threshold = (max_score as f64) * 0.5;
    let mut ranked: Vec<(&str, u32)> = scores
        .into_iter()
        .filter(|(_, score)| *score > 0 && (*score as f64) >= threshold)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    // A dominant leader crowds out the runner-up
    if ranked.len() > 1 && ranked[0].1 >= ranked[1].1 * 2 {
        ranked.truncate(1);
    }

    let result: Vec<String> = ranked.into_iter().map(|(d, _)| d.to_string()).collect();
    debug!("Domain detection -> {:?}", result);
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Held certifications
// ────────────────────────────────────────────────────────────────────────────

/// Detects certifications the text presents as already obtained. A catalog
/// name alone is not enough — the ±200-character window around its first
/// mention must carry an "already held" cue.
pub fn detect_held_certifications(text: &str) -> Vec<String> {
    let text_lower = text.to_lowercase();
    let mut held: Vec<String> = Vec::new();

    for (cert_name, cert_id) in KNOWN_CERTIFICATIONS {
        let Some(pos) = text_lower.find(cert_name) else {
            continue;
        };

        let start = floor_char_boundary(&text_lower, pos.saturating_sub(200));
        let end = ceil_char_boundary(&text_lower, pos + cert_name.len() + 200);
        let context = &text_lower[start..end];

        if HELD_PATTERNS.iter().any(|p| p.is_match(context))
            && !held.iter().any(|id| id.as_str() == *cert_id)
        {
            held.push(cert_id.to_string());
        }
    }

    held
}

// ────────────────────────────────────────────────────────────────────────────
// Experience years
// ────────────────────────────────────────────────────────────────────────────

/// Estimates years of professional experience. Strict priority cascade,
/// first hit wins:
/// 1. strong beginner/student phrase ⇒ 0
/// 2. explicit "N ans d'expérience" (0 < N < 40) ⇒ max N found
/// 3. weak student cues without any real-employment cue ⇒ 0
/// 4. job titles with adjacent date ranges (education windows excluded)
pub fn detect_experience_years(text: &str) -> u32 {
    let text_lower = text.to_lowercase();

    for indicator in STRONG_BEGINNER_INDICATORS {
        if text_lower.contains(indicator) {
            debug!("Strong beginner indicator '{indicator}' -> 0 years");
            return 0;
        }
    }

    let mut explicit_years = 0u32;
    for pattern in EXPLICIT_YEARS_PATTERNS.iter() {
        for captures in pattern.captures_iter(&text_lower) {
            if let Some(years) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                if years > 0 && years < 40 {
                    explicit_years = explicit_years.max(years);
                }
            }
        }
    }
    if explicit_years > 0 {
        debug!("Explicit experience pattern -> {explicit_years} years");
        return explicit_years;
    }

    let is_likely_student = WEAK_STUDENT_INDICATORS
        .iter()
        .any(|ind| text_lower.contains(ind));
    if is_likely_student {
        let has_real_job = REAL_JOB_PATTERNS.iter().any(|p| p.is_match(&text_lower));
        if !has_real_job {
            debug!("Student indicators without real job -> 0 years");
            return 0;
        }
    }

    let current_year = chrono::Utc::now().year();
    let mut total_years = 0u32;

    for title_pattern in JOB_TITLE_PATTERNS.iter() {
        let Some(title_match) = title_pattern.find(&text_lower) else {
            continue;
        };

        let start = floor_char_boundary(&text_lower, title_match.start().saturating_sub(150));
        let end = ceil_char_boundary(&text_lower, title_match.start() + 150);
        let context = &text_lower[start..end];

        // A date range next to "université"/"formation" is schooling
        if EDUCATION_TERMS.iter().any(|edu| context.contains(edu)) {
            continue;
        }

        for captures in DATE_RANGE_PATTERN.captures_iter(context) {
            let Some(from) = captures.get(1).and_then(|m| m.as_str().parse::<i32>().ok()) else {
                continue;
            };
            let to = captures
                .get(2)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .unwrap_or(current_year);
            let span = to - from;
            if span > 0 && span < 20 {
                total_years = total_years.max(span as u32);
            }
        }
    }

    debug!("Date-range experience detection -> {total_years} years");
    total_years
}

// ────────────────────────────────────────────────────────────────────────────
// Level hint
// ────────────────────────────────────────────────────────────────────────────

/// Maps detected experience to a level, with keyword overrides. Beginner
/// cues always win; senior job-title patterns upgrade to avancé only when
/// no beginner cue is present.
pub fn detect_level_hint(text: &str, experience_years: u32) -> Level {
    let text_lower = text.to_lowercase();

    let is_beginner = BEGINNER_KEYWORDS.iter().any(|kw| text_lower.contains(kw));
    if is_beginner {
        debug!("Beginner keywords detected -> level: débutant");
        return Level::Debutant;
    }

    let mut level = Level::from_experience_years(experience_years);

    for pattern in SENIOR_PATTERNS.iter() {
        if pattern.is_match(&text_lower) {
            debug!("Senior pattern '{pattern}' detected -> level: avancé");
            level = Level::Avance;
            break;
        }
    }

    level
}

// ────────────────────────────────────────────────────────────────────────────
// UTF-8 window helpers — accented French text means byte offsets are not
// always char boundaries
// ────────────────────────────────────────────────────────────────────────────

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}
