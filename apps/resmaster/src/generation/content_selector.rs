//! Content Selector: ranks and caps each role's bullets for the resume.
//!
//! Reuses `context::scoring::score_bullet` for combined relevance scoring.
//! Per role: de-duplicate, clamp every bullet to two simulated lines, then
//! keep the top `max_bullets` by score (ties keep the earlier bullet) in
//! their original order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::dedup::{normalize_bullet, tighten};
use crate::context::scoring::{metric_first_score, score_bullet, ScoringWeights};
use crate::layout::contract::{check_contract, clamp_bullet, LineCoverageVerdict};
use crate::models::profile::HistoryEntry;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A bullet ranked by combined relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedBullet {
    /// Position in the role after de-duplication.
    pub index: usize,
    pub text: String,
    pub combined_score: f64,
}

/// A bullet left out of the resume, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedBullet {
    pub role: String,
    pub bullet: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionResult {
    pub roles: Vec<HistoryEntry>,
    pub excluded: Vec<ExcludedBullet>,
    /// Bullets shortened to fit the two-line limit.
    pub clamped: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Selection algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Selects bullets for every role in the work history.
pub fn select_content(
    history: &[HistoryEntry],
    job_terms: &[String],
    max_bullets: usize,
    chars_per_line: usize,
) -> SelectionResult {
    let weights = ScoringWeights::default();
    let mut result = SelectionResult::default();

    for entry in history {
        let role = entry.header();
        let mut seen = std::collections::HashSet::new();
        let mut candidates: Vec<String> = Vec::new();

        for raw in &entry.bullets {
            let bullet = tighten(raw);
            if bullet.is_empty() {
                continue;
            }
            if !seen.insert(normalize_bullet(&bullet)) {
                result.excluded.push(ExcludedBullet {
                    role: role.clone(),
                    bullet,
                    reason: "Duplicate of an earlier bullet".to_string(),
                });
                continue;
            }
            let check = check_contract(candidates.len(), &bullet, chars_per_line);
            let text = match check.verdict {
                LineCoverageVerdict::Satisfies => bullet,
                LineCoverageVerdict::TooLong { actual_lines } => {
                    debug!("{role}: bullet {} wraps to {actual_lines} lines, clamping", check.bullet_index);
                    result.clamped += 1;
                    clamp_bullet(&bullet, chars_per_line)
                }
            };
            candidates.push(text);
        }

        let ranked: Vec<RankedBullet> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, text)| RankedBullet {
                combined_score: score_bullet(&text, job_terms, &weights),
                index,
                text,
            })
            .collect();

        let (kept, dropped) = apply_bullet_limit(ranked, max_bullets);
        result.excluded.extend(dropped.into_iter().map(|b| ExcludedBullet {
            role: role.clone(),
            bullet: b.text,
            reason: format!("Bullet limit reached ({max_bullets} max per role)"),
        }));

        result.roles.push(HistoryEntry {
            bullets: kept.into_iter().map(|b| b.text).collect(),
            ..entry.clone()
        });
    }

    result
}

/// Keeps the `limit` highest-scored bullets. Ties favor the earlier bullet.
/// Both halves come back in original order.
fn apply_bullet_limit(
    ranked: Vec<RankedBullet>,
    limit: usize,
) -> (Vec<RankedBullet>, Vec<RankedBullet>) {
    if ranked.len() <= limit {
        return (ranked, Vec::new());
    }

    let mut by_score = ranked;
    // Stable sort: equal scores stay in original order.
    by_score.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut dropped = by_score.split_off(limit);
    by_score.sort_by_key(|b| b.index);
    dropped.sort_by_key(|b| b.index);
    (by_score, dropped)
}

/// Metric-first ordering for resume variant B: `%`/currency metrics, then
/// result verbs. Ties keep the original order.
pub fn rank_metric_first(bullets: &[String]) -> Vec<String> {
    let mut scored: Vec<(u32, usize, &String)> = bullets
        .iter()
        .enumerate()
        .map(|(i, b)| (metric_first_score(b), i, b))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, _, b)| b.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(bullets: &[&str]) -> HistoryEntry {
        HistoryEntry {
            title: "Shift Lead".into(),
            company: "Acme".into(),
            dates: "2019 – 2022".into(),
            bullets: bullets.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn ranked(scores: &[f64]) -> Vec<RankedBullet> {
        scores
            .iter()
            .enumerate()
            .map(|(index, &combined_score)| RankedBullet {
                index,
                text: format!("b{index}"),
                combined_score,
            })
            .collect()
    }

    #[test]
    fn test_limit_drops_lowest_and_later_ties() {
        let (kept, dropped) = apply_bullet_limit(ranked(&[0.5, 0.9, 0.5, 0.1, 0.5]), 3);
        let kept: Vec<_> = kept.iter().map(|b| b.text.as_str()).collect();
        let dropped: Vec<_> = dropped.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(kept, vec!["b0", "b1", "b2"]);
        assert_eq!(dropped, vec!["b3", "b4"]);
    }

    #[test]
    fn test_under_limit_keeps_everything() {
        let (kept, dropped) = apply_bullet_limit(ranked(&[0.1, 0.2]), 6);
        assert_eq!(kept.len(), 2);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_no_role_exceeds_cap() {
        let bullets: Vec<String> = (0..10).map(|i| format!("Handled task {i}")).collect();
        let refs: Vec<&str> = bullets.iter().map(String::as_str).collect();
        let result = select_content(&[role(&refs)], &[], 6, 95);
        assert_eq!(result.roles[0].bullets.len(), 6);
        assert_eq!(result.excluded.len(), 4);
        // All scores tie, so the first six survive in order.
        assert_eq!(result.roles[0].bullets[0], "Handled task 0");
        assert_eq!(result.roles[0].bullets[5], "Handled task 5");
    }

    #[test]
    fn test_duplicates_are_excluded_with_reason() {
        let result = select_content(
            &[role(&["Cut waste 10%", "cut waste 10%.", "Opened 2 stores"])],
            &[],
            6,
            95,
        );
        assert_eq!(result.roles[0].bullets, vec!["Cut waste 10%", "Opened 2 stores"]);
        assert_eq!(result.excluded[0].reason, "Duplicate of an earlier bullet");
        assert_eq!(result.excluded[0].role, "Shift Lead — Acme (2019 – 2022)");
    }

    #[test]
    fn test_relevant_bullet_survives_cap() {
        let result = select_content(
            &[role(&["Stocked shelves", "Cleaned floors", "Led sales team to 20% growth"])],
            &["sales".to_string()],
            1,
            95,
        );
        assert_eq!(result.roles[0].bullets, vec!["Led sales team to 20% growth"]);
    }

    #[test]
    fn test_long_bullets_are_clamped() {
        let long = "Coordinated ".to_string() + &"inventory counts ".repeat(20);
        let result = select_content(&[role(&[&long])], &[], 6, 40);
        assert_eq!(result.clamped, 1);
        let (lines, _) = crate::layout::contract::simulate_lines(&result.roles[0].bullets[0], 40);
        assert!(lines <= 2);
    }

    #[test]
    fn test_metric_first_ordering() {
        let bullets: Vec<String> = ["Answered phones", "Grew repeat visits", "Cut costs 15%"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            rank_metric_first(&bullets),
            vec!["Cut costs 15%", "Grew repeat visits", "Answered phones"]
        );
    }
}
