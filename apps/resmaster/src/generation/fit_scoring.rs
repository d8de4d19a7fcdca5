//! Fit Scoring: pluggable, trait-based scorer that measures a resume against a parsed posting.
//!
//! Default: `KeywordFitScorer` (pure-Rust, fast, deterministic, fully testable).
//! `RunContext` holds an `Arc<dyn FitScorer>` so the backend can be swapped without
//! touching the pipeline.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::scoring::ACTION_VERBS;
use crate::context::validation::{validate_bullets, BulletIssue, IssueKind};
use crate::errors::AppError;
use crate::generation::jd_parser::JobRequirement;
use crate::generation::terms::{contains_phrase, related_terms, stems};
use crate::models::profile::ExtractedProfile;

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

/// A posting term found in the resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMatch {
    pub term: String,
    /// The resume phrasing that satisfied it.
    pub evidence: String,
    /// 1.0 for a direct mention, 0.6 when credited through a related phrasing.
    pub strength: f32,
}

/// A posting term the resume never mentions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub term: String,
    /// Related phrasings that would have counted.
    pub suggestion: Option<String>,
}

/// Full fit report for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Matched job terms over total job terms, 0 – 100.
    pub coverage: u32,
    pub strong_matches: Vec<FitMatch>,
    pub partial_matches: Vec<FitMatch>,
    pub gaps: Vec<Gap>,
    pub issues: Vec<BulletIssue>,
    /// Action verbs, numeric evidence and links, 0 – 100.
    pub scan_health: u32,
    /// mean(coverage, scan_health)
    pub hire_likelihood: u32,
    pub grade: String,
    pub recommendation: String,
    pub scorer_backend: String, // "keyword"
}

impl ScoreReport {
    pub fn matched_terms(&self) -> Vec<&str> {
        self.strong_matches
            .iter()
            .chain(self.partial_matches.iter())
            .map(|m| m.term.as_str())
            .collect()
    }

    pub fn missing_terms(&self) -> Vec<&str> {
        self.gaps.iter().map(|g| g.term.as_str()).collect()
    }

    pub fn issue_count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Implement this to swap backends without touching
/// the pipeline or the packager.
///
/// Carried in `RunContext` as `Arc<dyn FitScorer>`.
#[async_trait]
pub trait FitScorer: Send + Sync {
    async fn score(
        &self,
        profile: &ExtractedProfile,
        job: &JobRequirement,
    ) -> Result<ScoreReport, AppError>;

    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordFitScorer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Pure-Rust keyword-based fit scorer. Fast, deterministic, no network.
///
/// Algorithm:
/// 1. Job terms = required terms, else the top inventory keywords (case-insensitive, deduplicated)
/// 2. For each term:
///    - stemmed phrase present in the resume → strength 1.0
///    - a related phrasing present (e.g. "managed" for leadership) → strength 0.6
///    - neither → gap
/// 3. coverage = matched / total × 100, rounded
pub struct KeywordFitScorer;

#[async_trait]
impl FitScorer for KeywordFitScorer {
    async fn score(
        &self,
        profile: &ExtractedProfile,
        job: &JobRequirement,
    ) -> Result<ScoreReport, AppError> {
        Ok(compute_keyword_fit(profile, job))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword fit algorithm
// ────────────────────────────────────────────────────────────────────────────

fn resume_text(profile: &ExtractedProfile) -> String {
    if !profile.raw_text.trim().is_empty() {
        return profile.raw_text.clone();
    }
    let mut parts: Vec<String> = Vec::new();
    parts.extend(profile.summary.clone());
    parts.extend(profile.skills.iter().cloned());
    for h in &profile.history {
        parts.push(h.header());
        parts.extend(h.bullets.iter().cloned());
    }
    parts.extend(profile.education.iter().cloned());
    parts.extend(profile.certifications.iter().cloned());
    parts.join("\n")
}

fn dedup_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

pub fn compute_keyword_fit(profile: &ExtractedProfile, job: &JobRequirement) -> ScoreReport {
    let text = resume_text(profile);
    let hay = stems(&text);
    let terms = dedup_terms(job.scoring_terms());

    let bullets: Vec<String> = profile.all_bullets().cloned().collect();
    let issues = validate_bullets(&bullets);
    let scan_health = scan_health(&text);

    let mut strong_matches = Vec::new();
    let mut partial_matches = Vec::new();
    let mut gaps = Vec::new();

    for term in &terms {
        if contains_phrase(&hay, &stems(term)) {
            strong_matches.push(FitMatch {
                term: term.clone(),
                evidence: term.clone(),
                strength: 1.0,
            });
            continue;
        }
        let aliases = related_terms(term);
        match aliases
            .iter()
            .find(|alias| contains_phrase(&hay, &stems(alias)))
        {
            Some(alias) => partial_matches.push(FitMatch {
                term: term.clone(),
                evidence: alias.to_string(),
                strength: 0.6,
            }),
            None => gaps.push(Gap {
                term: term.clone(),
                suggestion: (!aliases.is_empty()).then(|| aliases.join(", ")),
            }),
        }
    }

    let coverage = if terms.is_empty() {
        0
    } else {
        let matched = strong_matches.len() + partial_matches.len();
        ((matched as f64 / terms.len() as f64) * 100.0).round() as u32
    };
    let hire_likelihood = ((coverage + scan_health) as f64 / 2.0).round() as u32;
    let recommendation = if terms.is_empty() {
        "No requirements found in the posting — cannot score fit.".to_string()
    } else {
        build_recommendation(coverage, &gaps)
    };

    ScoreReport {
        coverage,
        strong_matches,
        partial_matches,
        gaps,
        issues,
        scan_health,
        hire_likelihood,
        grade: letter_grade(hire_likelihood).to_string(),
        recommendation,
        scorer_backend: "keyword".to_string(),
    }
}

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[%$€£]\s?\d|\d{1,3}(?:,\d{3})*(?:\.\d+)?%?").unwrap()
});
static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// 0.5·verbs/18 + 0.3·numbers/12 + 0.2·links/3, each term capped at 1.
pub fn scan_health(text: &str) -> u32 {
    let lower = text.to_lowercase();
    let words: HashSet<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let verbs = ACTION_VERBS.iter().filter(|v| words.contains(*v)).count() as f64;
    let nums = RE_NUMBER.find_iter(text).count() as f64;
    let urls = RE_URL.find_iter(text).count() as f64;

    let raw = 0.5 * (verbs / 18.0).min(1.0) + 0.3 * (nums / 12.0).min(1.0) + 0.2 * (urls / 3.0).min(1.0);
    (raw * 100.0).round() as u32
}

pub fn letter_grade(score: u32) -> &'static str {
    match score {
        97..=u32::MAX => "A+",
        93..=96 => "A",
        90..=92 => "A-",
        87..=89 => "B+",
        83..=86 => "B",
        80..=82 => "B-",
        77..=79 => "C+",
        73..=76 => "C",
        70..=72 => "C-",
        60..=69 => "D",
        _ => "F",
    }
}

/// Builds a human-readable recommendation string from coverage and gaps.
fn build_recommendation(score: u32, gaps: &[Gap]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(|g| g.term.as_str()).collect();

    if score >= 80 {
        "Strong fit. Your resume directly covers the key posting requirements.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate fit ({score}/100). Consider adding evidence for: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}. Tailor the resume only with experience you actually have.",
            top_gaps.join(", ")
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::jd_parser::parse_job;
    use crate::models::profile::HistoryEntry;

    fn profile_with(bullets: &[&str]) -> ExtractedProfile {
        let bullets: Vec<String> = bullets.iter().map(|b| b.to_string()).collect();
        ExtractedProfile {
            name: "Jane Doe".into(),
            raw_text: bullets.join("\n"),
            history: vec![HistoryEntry {
                title: "Manager".into(),
                company: "Acme".into(),
                dates: String::new(),
                bullets,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_team_and_sales_example_covers_everything() {
        let profile = profile_with(&["Managed a team of 5, increased sales 20%"]);
        let job = parse_job("Requirements: leadership, sales", None).unwrap();
        let report = compute_keyword_fit(&profile, &job);
        assert_eq!(report.coverage, 100);
        assert_eq!(report.issue_count(IssueKind::MissingMetric), 0);
        assert_eq!(report.strong_matches.len(), 1, "sales is direct");
        assert_eq!(report.partial_matches[0].term, "leadership");
        assert_eq!(report.partial_matches[0].evidence, "managed");
    }

    #[test]
    fn test_no_match_creates_gap() {
        let profile = profile_with(&["Stocked 40 shelves per shift"]);
        let job = parse_job("Requirements: rust, leadership", None).unwrap();
        let report = compute_keyword_fit(&profile, &job);
        assert_eq!(report.coverage, 0);
        assert_eq!(report.missing_terms(), vec!["rust", "leadership"]);
        assert!(report.gaps[1].suggestion.as_deref().unwrap().contains("managed"));
        assert_eq!(report.gaps[0].suggestion, None);
    }

    #[test]
    fn test_empty_terms_returns_zero_coverage() {
        let profile = profile_with(&["Led 3 launches"]);
        let job = JobRequirement::default();
        let report = compute_keyword_fit(&profile, &job);
        assert_eq!(report.coverage, 0);
        assert!(report.recommendation.contains("cannot score"));
    }

    #[test]
    fn test_terms_are_case_insensitive_and_deduplicated() {
        let profile = profile_with(&["Wrote SQL reports"]);
        let job = JobRequirement {
            required_terms: vec!["SQL".into(), "sql".into(), "Python".into()],
            ..Default::default()
        };
        let report = compute_keyword_fit(&profile, &job);
        assert_eq!(report.coverage, 50);
    }

    #[test]
    fn test_coverage_is_deterministic_and_bounded() {
        let profile = profile_with(&["Built Rust services", "Helped with Kafka"]);
        let job = parse_job("Requirements: rust, kafka, go", None).unwrap();
        let a = compute_keyword_fit(&profile, &job);
        let b = compute_keyword_fit(&profile, &job);
        assert_eq!(a, b);
        assert!(a.coverage <= 100);
        assert_eq!(a.coverage, 67);
    }

    #[test]
    fn test_scan_health_rewards_verbs_numbers_links() {
        assert_eq!(scan_health(""), 0);
        let rich = "Led built delivered implemented orchestrated spearheaded optimized designed \
            launched scaled improved reduced increased managed developed drove partnered enabled \
            1 2 3 4 5 6 7 8 9 10 11 12 https://a.io https://b.io https://c.io";
        assert_eq!(scan_health(rich), 100);
    }

    #[test]
    fn test_letter_grade_boundaries() {
        assert_eq!(letter_grade(100), "A+");
        assert_eq!(letter_grade(97), "A+");
        assert_eq!(letter_grade(96), "A");
        assert_eq!(letter_grade(90), "A-");
        assert_eq!(letter_grade(80), "B-");
        assert_eq!(letter_grade(70), "C-");
        assert_eq!(letter_grade(60), "D");
        assert_eq!(letter_grade(59), "F");
    }

    #[test]
    fn test_recommendation_moderate_score_lists_gaps() {
        let gaps = vec![Gap {
            term: "Kafka".to_string(),
            suggestion: None,
        }];
        let rec = build_recommendation(65, &gaps);
        assert!(rec.contains("Kafka"));
        assert!(rec.contains("65"));
    }

    #[tokio::test]
    async fn test_trait_object_backend_label() {
        let scorer: Box<dyn FitScorer> = Box::new(KeywordFitScorer);
        assert_eq!(scorer.backend(), "keyword");
        let report = scorer
            .score(&profile_with(&["Led 3 launches"]), &JobRequirement::default())
            .await
            .unwrap();
        assert_eq!(report.scorer_backend, "keyword");
    }
}
