use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::resume::{AssembledDocument, Block};

const ACRONYMS: &[(&str, &str)] = &[
    ("ATS", "Applicant Tracking System"),
    ("KPI", "Key Performance Indicator"),
    ("API", "Application Programming Interface"),
    ("CV", "Curriculum Vitae"),
    ("GS", "General Schedule"),
    ("KSA", "Knowledge, Skills, and Abilities"),
    ("EMR", "Electronic Medical Record"),
    ("EHR", "Electronic Health Record"),
];

static RE_ACRONYM: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = ACRONYMS.iter().map(|(a, _)| *a).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"\b({alternation})\b")).unwrap()
});

/// Expands each known acronym on its first mention within one document:
/// `ATS` → `Applicant Tracking System (ATS)`. Later mentions stay short.
#[derive(Debug, Default)]
pub struct AcronymExpander {
    seen: HashSet<&'static str>,
}

impl AcronymExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand_once(&mut self, text: &str) -> String {
        // Already spelled out by the author.
        for (short, long) in ACRONYMS {
            if text.contains(&format!("{long} ({short})")) {
                self.seen.insert(short);
            }
        }

        RE_ACRONYM
            .replace_all(text, |caps: &Captures| {
                let found = &caps[1];
                match ACRONYMS.iter().find(|(short, _)| *short == found) {
                    Some((short, long)) if self.seen.insert(short) => format!("{long} ({short})"),
                    _ => found.to_string(),
                }
            })
            .into_owned()
    }

    /// Expands across a whole document in reading order.
    pub fn expand_document(doc: &mut AssembledDocument) {
        let mut expander = Self::new();
        for text in doc.blocks.iter_mut().filter_map(Block::text_mut) {
            *text = expander.expand_once(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_mention_only() {
        let mut ex = AcronymExpander::new();
        assert_eq!(
            ex.expand_once("Tuned ATS keywords and KPI reports"),
            "Tuned Applicant Tracking System (ATS) keywords and Key Performance Indicator (KPI) reports"
        );
        assert_eq!(ex.expand_once("More ATS work"), "More ATS work");
    }

    #[test]
    fn test_whole_words_only() {
        let mut ex = AcronymExpander::new();
        assert_eq!(ex.expand_once("CVS pharmacy and GSA"), "CVS pharmacy and GSA");
    }

    #[test]
    fn test_existing_expansion_is_respected() {
        let mut ex = AcronymExpander::new();
        let text = "Electronic Health Record (EHR) migration; EHR audits";
        assert_eq!(ex.expand_once(text), text);
    }
}
