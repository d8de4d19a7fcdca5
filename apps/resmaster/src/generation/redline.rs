//! Redline report: what changed between the uploaded resume and the tailored one.

use std::collections::HashSet;

use crate::generation::jd_parser::JobRequirement;
use crate::generation::terms::{contains_phrase, stems};
use crate::models::resume::{AssembledDocument, Block, DocumentKind};

/// Above this many cells the diff degrades to "all removed, all added".
const MAX_DIFF_CELLS: usize = 4_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum DiffLine<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Line-level diff via longest common subsequence.
pub fn diff_lines<'a>(before: &[&'a str], after: &[&'a str]) -> Vec<DiffLine<'a>> {
    let (n, m) = (before.len(), after.len());
    if n.saturating_mul(m) > MAX_DIFF_CELLS {
        return before
            .iter()
            .map(|l| DiffLine::Removed(*l))
            .chain(after.iter().map(|l| DiffLine::Added(*l)))
            .collect();
    }

    // lcs[i][j] = LCS length of before[i..] and after[j..]
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if before[i] == after[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if before[i] == after[j] {
            out.push(DiffLine::Same(before[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(DiffLine::Removed(before[i]));
            i += 1;
        } else {
            out.push(DiffLine::Added(after[j]));
            j += 1;
        }
    }
    out.extend(before[i..].iter().map(|l| DiffLine::Removed(*l)));
    out.extend(after[j..].iter().map(|l| DiffLine::Added(*l)));
    out
}

fn keyword_count(text: &str) -> usize {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| w.len() >= 2)
        .map(str::to_lowercase)
        .collect::<HashSet<_>>()
        .len()
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_digit).count()
}

fn posting_terms_covered(text: &str, job: &JobRequirement) -> (usize, usize) {
    let terms = job.scoring_terms();
    let hay = stems(text);
    let hits = terms
        .iter()
        .filter(|t| contains_phrase(&hay, &stems(t)))
        .count();
    (hits, terms.len())
}

pub fn assemble_redline(
    original: &str,
    tailored: &AssembledDocument,
    job: &JobRequirement,
) -> AssembledDocument {
    let after_text = tailored.to_plain_text();
    let mut doc = AssembledDocument::new(DocumentKind::Redline, tailored.style, "Redline");
    doc.push(Block::Title("Redline Summary".into()));

    doc.push(Block::Paragraph(format!(
        "Keywords covered (approx unique): {} → {}",
        keyword_count(original),
        keyword_count(&after_text)
    )));
    doc.push(Block::Paragraph(format!(
        "Numeric evidence (digit count): {} → {}",
        digit_count(original),
        digit_count(&after_text)
    )));
    let (before_hits, total) = posting_terms_covered(original, job);
    let (after_hits, _) = posting_terms_covered(&after_text, job);
    if total > 0 {
        doc.push(Block::Paragraph(format!(
            "Posting terms present: {before_hits}/{total} → {after_hits}/{total}"
        )));
    }
    doc.push(Block::Paragraph(
        "Clarity: acronyms expanded on first mention; single-column layout enforced.".into(),
    ));

    let before: Vec<&str> = original.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let after: Vec<&str> = after_text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let diff = diff_lines(&before, &after);

    doc.push(Block::Heading("Line Changes".into()));
    doc.push(Block::Paragraph(
        "Lines marked - were removed or reworded, + were added; unmarked lines are unchanged.".into(),
    ));
    for line in diff {
        doc.push(Block::Paragraph(match line {
            DiffLine::Same(l) => format!("  {l}"),
            DiffLine::Removed(l) => format!("- {l}"),
            DiffLine::Added(l) => format!("+ {l}"),
        }));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::jd_parser::parse_job;
    use crate::generation::style::StylePack;

    #[test]
    fn test_diff_keeps_common_lines() {
        let before = ["Jane", "old line", "Skills"];
        let after = ["Jane", "Skills", "new line"];
        assert_eq!(
            diff_lines(&before, &after),
            vec![
                DiffLine::Same("Jane"),
                DiffLine::Removed("old line"),
                DiffLine::Same("Skills"),
                DiffLine::Added("new line"),
            ]
        );
    }

    #[test]
    fn test_diff_from_empty_is_all_added() {
        let diff = diff_lines(&[], &["a", "b"]);
        assert_eq!(diff, vec![DiffLine::Added("a"), DiffLine::Added("b")]);
    }

    #[test]
    fn test_summary_counts() {
        let job = parse_job("Title: Buyer\nRequirements: sourcing, excel", None).unwrap();
        let mut tailored = AssembledDocument::new(DocumentKind::Resume, StylePack::Classic, "r");
        tailored.push(Block::Title("Sam Lee".into()));
        tailored.push(Block::Bullet("Cut sourcing costs 12% in Excel".into()));

        let doc = assemble_redline("Sam Lee\nBought things", &tailored, &job);
        let text = doc.to_plain_text();
        assert!(text.contains("Numeric evidence (digit count): 0 → 2"));
        assert!(text.contains("Posting terms present: 0/2 → 2/2"));
        assert!(text.contains("  Sam Lee"));
        assert!(text.contains("- Bought things"));
        assert!(text.contains("+ • Cut sourcing costs 12% in Excel"));
    }
}
