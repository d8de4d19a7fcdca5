use std::collections::HashSet;

/// Comparison key: lowercase, single-spaced, trailing punctuation dropped.
pub fn normalize_bullet(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ';', ',', '!'])
        .to_lowercase()
}

/// Indices of bullets that repeat an earlier one. The first occurrence is never reported.
pub fn find_duplicates(bullets: &[String]) -> Vec<usize> {
    let mut seen = HashSet::new();
    bullets
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            let key = normalize_bullet(b);
            !key.is_empty() && !seen.insert(key)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Collapses whitespace and strips leading bullet glyphs.
pub fn tighten(text: &str) -> String {
    text.trim()
        .trim_start_matches(['•', '-', '*', '▪', '◦', '·'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ignores_case_spacing_and_period() {
        assert_eq!(
            normalize_bullet("  Cut  costs 10%. "),
            normalize_bullet("cut costs 10%")
        );
    }

    #[test]
    fn test_find_duplicates_reports_later_copies() {
        let b: Vec<String> = ["A one", "B two", "a  one.", "B two", "C"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(find_duplicates(&b), vec![2, 3]);
    }
}
