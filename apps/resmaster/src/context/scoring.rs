use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::validation::{is_quantified, vague_verb};
use crate::generation::terms::{contains_phrase, related_terms, stems};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub impact: f64,
    pub jd_relevance: f64,
    pub action: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            impact: 0.5,
            jd_relevance: 0.3,
            action: 0.2,
        }
    }
}

pub const ACTION_VERBS: &[&str] = &[
    "led", "owned", "built", "delivered", "implemented", "orchestrated", "spearheaded",
    "optimized", "designed", "launched", "scaled", "improved", "reduced", "increased", "managed",
    "developed", "drove", "partnered", "enabled", "accelerated", "transformed", "modernized",
];

static RE_STRONG_METRIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\s*%|[$€£]\s?\d").unwrap());
static RE_RESULT_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(reduced|increased|grew|launched|delivered|improved)\b").unwrap()
});

/// 1.0 for %/currency metrics, 0.7 for a bare number, 0.0 otherwise.
pub fn compute_impact_score(text: &str) -> f64 {
    if RE_STRONG_METRIC.is_match(text) {
        1.0
    } else if is_quantified(text) {
        0.7
    } else {
        0.0
    }
}

/// 1.0 when the bullet opens with an action verb, 0.0 with a vague verb, 0.5 otherwise.
pub fn compute_action_score(text: &str) -> f64 {
    if vague_verb(text).is_some() {
        return 0.0;
    }
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if ACTION_VERBS.contains(&first.as_str()) {
        1.0
    } else {
        0.5
    }
}

/// Fraction of job terms the bullet touches, directly or via a related phrasing.
pub fn compute_jd_relevance(text: &str, job_terms: &[String]) -> f64 {
    if job_terms.is_empty() {
        return 0.0;
    }
    let hay = stems(text);
    let hits = job_terms
        .iter()
        .filter(|term| {
            contains_phrase(&hay, &stems(term))
                || related_terms(term)
                    .iter()
                    .any(|alias| contains_phrase(&hay, &stems(alias)))
        })
        .count();
    hits as f64 / job_terms.len() as f64
}

/// Combined relevance score: 0.5*impact + 0.3*jd_relevance + 0.2*action
pub fn compute_combined_score(
    impact: f64,
    jd_relevance: f64,
    action: f64,
    weights: &ScoringWeights,
) -> f64 {
    (weights.impact * impact + weights.jd_relevance * jd_relevance + weights.action * action)
        .clamp(0.0, 1.0)
}

pub fn score_bullet(text: &str, job_terms: &[String], weights: &ScoringWeights) -> f64 {
    compute_combined_score(
        compute_impact_score(text),
        compute_jd_relevance(text, job_terms),
        compute_action_score(text),
        weights,
    )
}

/// Ranking used by the metric-first variant: +2 for a %/currency metric,
/// +1 for a result verb.
pub fn metric_first_score(text: &str) -> u32 {
    let mut score = 0;
    if RE_STRONG_METRIC.is_match(text) {
        score += 2;
    }
    if RE_RESULT_VERB.is_match(text) {
        score += 1;
    }
    score
}
