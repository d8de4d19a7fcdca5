use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::dedup::find_duplicates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingMetric,
    VagueVerb,
    PassiveVoice,
    DuplicateBullet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletIssue {
    pub kind: IssueKind,
    pub bullet: String,
    pub reason: String,
    pub suggestion: String,
}

pub const VAGUE_VERBS: &[&str] = &[
    "helped",
    "worked on",
    "assisted",
    "participated in",
    "involved in",
    "responsible for",
    "handled",
    "tasked with",
];

const VAGUE_SCALE_WORDS: &[&str] = &[
    "significant",
    "major",
    "large",
    "huge",
    "massive",
    "substantial",
    "considerable",
    "great",
    "many",
    "numerous",
    "various",
    "several",
];

static RE_PASSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:am|is|are|was|were|be|been|being)\s+(?:\w+ly\s+)?(?:\w{3,}ed|built|done|made|given|taken|written|run|seen|chosen|known|shown|held|kept|sent|paid|won|brought|taught|led)\b",
    )
    .unwrap()
});

fn contains_phrase_ci(haystack_lower: &str, phrase: &str) -> bool {
    haystack_lower.match_indices(phrase).any(|(i, _)| {
        let before_ok = haystack_lower[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack_lower[i + phrase.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// True when the bullet carries a number, percentage, currency amount or multiplier.
pub fn is_quantified(text: &str) -> bool {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_percent = text.contains('%');
    let has_currency = text.contains('$') || text.contains('€') || text.contains('£');
    has_digit || has_percent || has_currency
}

/// First vague verb phrase present, if any.
pub fn vague_verb(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    VAGUE_VERBS
        .iter()
        .copied()
        .find(|v| contains_phrase_ci(&lower, v))
}

pub fn is_passive(text: &str) -> bool {
    RE_PASSIVE.is_match(text)
}

/// Validates a single bullet. Returns every issue found, empty when clean.
///
/// FAIL conditions:
/// - No number, percentage, currency or multiplier
/// - A vague verb phrase ("helped", "responsible for", ...)
/// - Passive construction ("was implemented by")
pub fn validate_impact(text: &str) -> Vec<BulletIssue> {
    let text_lower = text.to_lowercase();
    let mut issues = Vec::new();

    if !is_quantified(text) {
        let scale = VAGUE_SCALE_WORDS
            .iter()
            .find(|w| contains_phrase_ci(&text_lower, w));
        let (reason, suggestion) = match scale {
            Some(word) => (
                format!("Uses vague scale word '{word}' without a number"),
                format!("Replace '{word}' with a specific number: e.g., '5x', '40%', '3 weeks'"),
            ),
            None => (
                "No quantified outcome found".to_string(),
                "Add a metric: a count, percentage, dollar amount or time saved".to_string(),
            ),
        };
        issues.push(BulletIssue {
            kind: IssueKind::MissingMetric,
            bullet: text.to_string(),
            reason,
            suggestion,
        });
    }

    if let Some(vague) = vague_verb(text) {
        issues.push(BulletIssue {
            kind: IssueKind::VagueVerb,
            bullet: text.to_string(),
            reason: format!("Contains vague verb '{vague}'"),
            suggestion: format!("Lead with what you did instead of '{vague}': built, cut, led, shipped"),
        });
    }

    if is_passive(text) {
        issues.push(BulletIssue {
            kind: IssueKind::PassiveVoice,
            bullet: text.to_string(),
            reason: "Passive construction hides who acted".to_string(),
            suggestion: "Rewrite in active voice starting with a strong verb".to_string(),
        });
    }

    issues
}

/// Validates a batch of bullets, collecting all failures including duplicates.
pub fn validate_bullets(bullets: &[String]) -> Vec<BulletIssue> {
    let mut issues: Vec<BulletIssue> = bullets.iter().flat_map(|b| validate_impact(b)).collect();

    for idx in find_duplicates(bullets) {
        issues.push(BulletIssue {
            kind: IssueKind::DuplicateBullet,
            bullet: bullets[idx].clone(),
            reason: "Repeats an earlier bullet".to_string(),
            suggestion: "Remove the repeat or replace it with a different accomplishment".to_string(),
        });
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<IssueKind> {
        validate_impact(text).into_iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_pass_with_percentage() {
        assert!(validate_impact("Reduced latency by 40% through caching").is_empty());
    }

    #[test]
    fn test_pass_with_dollar_amount() {
        assert!(validate_impact("Saved $50,000 annually by optimizing queries").is_empty());
    }

    #[test]
    fn test_pass_with_euro() {
        assert!(validate_impact("Generated €200k in new revenue").is_empty());
    }

    #[test]
    fn test_pass_team_count() {
        assert!(validate_impact("Trained 15 engineers on new deployment process").is_empty());
    }

    #[test]
    fn test_team_and_sales_bullet_has_no_missing_metric() {
        assert!(!kinds("Managed a team of 5, increased sales 20%").contains(&IssueKind::MissingMetric));
    }

    #[test]
    fn test_fail_no_metrics_at_all() {
        let issues = validate_impact("Architected the authentication system");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingMetric);
        assert!(issues[0].reason.contains("No quantified outcome"));
    }

    #[test]
    fn test_fail_significant_without_number() {
        let issues = validate_impact("Achieved significant performance improvements");
        assert!(issues[0].reason.contains("vague scale word"));
    }

    #[test]
    fn test_vague_verb_flagged_even_with_metric() {
        assert_eq!(
            kinds("Helped reduce churn by 12%"),
            vec![IssueKind::VagueVerb]
        );
    }

    #[test]
    fn test_vague_verb_needs_whole_phrase() {
        // "handled" as a prefix of another word does not count
        assert_eq!(vague_verb("Handledesk migration of 4 sites"), None);
        assert_eq!(vague_verb("Responsible for payroll"), Some("responsible for"));
    }

    #[test]
    fn test_passive_voice() {
        assert!(is_passive("The migration was completed ahead of schedule"));
        assert!(is_passive("Reports were quickly written by the team"));
        assert!(is_passive("Team was led through 3 audits"));
        assert!(!is_passive("Completed the migration 2 weeks early"));
        assert!(!is_passive("Was a mentor to 4 interns"));
    }

    #[test]
    fn test_validate_bullets_flags_later_duplicate_only() {
        let bullets = vec![
            "Reduced latency by 40%".to_string(),
            "reduced latency by 40%.".to_string(),
            "Cut costs 10%".to_string(),
        ];
        let issues = validate_bullets(&bullets);
        let dups: Vec<_> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::DuplicateBullet)
            .collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].bullet, "reduced latency by 40%.");
    }

    #[test]
    fn test_validate_bullets_empty() {
        assert!(validate_bullets(&[]).is_empty());
    }
}
