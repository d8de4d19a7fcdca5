//! Style packs: fixed section orders per resume convention, plus signal-based
//! auto-suggestion when the caller does not pick one.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StylePack {
    Classic,
    Hybrid,
    #[value(alias = "tech_ic", alias = "tech")]
    Technical,
    Executive,
    Healthcare,
    Federal,
    #[value(name = "academic-cv", alias = "academic", alias = "academic_cv")]
    AcademicCv,
}

/// Canonical ordering; also the tie-breaker for suggestions.
pub const ALL_STYLES: [StylePack; 7] = [
    StylePack::Classic,
    StylePack::Hybrid,
    StylePack::Technical,
    StylePack::Executive,
    StylePack::Healthcare,
    StylePack::Federal,
    StylePack::AcademicCv,
];

/// Logical resume sections. Assemblers map each to concrete blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Highlights,
    Skills,
    TechStack,
    Projects,
    Experience,
    Education,
    Certifications,
    Publications,
    Licenses,
    Compliance,
    SpecializedAlignment,
    Awards,
}

impl Section {
    pub fn heading(&self) -> &'static str {
        match self {
            Section::Summary => "Summary",
            Section::Highlights => "Highlights",
            Section::Skills => "Skills",
            Section::TechStack => "Technical Stack",
            Section::Projects => "Selected Projects",
            Section::Experience => "Experience",
            Section::Education => "Education",
            Section::Certifications => "Certifications",
            Section::Publications => "Publications",
            Section::Licenses => "Licenses",
            Section::Compliance => "Compliance & Training",
            Section::SpecializedAlignment => "Specialized Experience Alignment",
            Section::Awards => "Awards",
        }
    }
}

impl StylePack {
    /// Used in file names.
    pub fn display_name(&self) -> &'static str {
        match self {
            StylePack::Classic => "Classic",
            StylePack::Hybrid => "Hybrid",
            StylePack::Technical => "Technical",
            StylePack::Executive => "Executive",
            StylePack::Healthcare => "Healthcare",
            StylePack::Federal => "Federal",
            StylePack::AcademicCv => "AcademicCV",
        }
    }

    pub fn sections(&self) -> &'static [Section] {
        use Section::*;
        match self {
            StylePack::Classic => &[Summary, Skills, Experience, Education, Certifications],
            StylePack::Hybrid => &[
                Summary,
                Highlights,
                Skills,
                Experience,
                Education,
                Certifications,
            ],
            StylePack::Technical => &[
                Summary,
                TechStack,
                Projects,
                Experience,
                Education,
                Certifications,
            ],
            StylePack::Executive => &[Summary, Highlights, Experience, Education, Certifications],
            StylePack::Healthcare => &[
                Summary,
                Licenses,
                Compliance,
                Skills,
                Experience,
                Education,
            ],
            StylePack::Federal => &[
                Summary,
                SpecializedAlignment,
                Experience,
                Education,
                Certifications,
                Awards,
            ],
            StylePack::AcademicCv => &[Summary, Education, Experience, Publications],
        }
    }

    /// Federal resumes spell out hours and month/year on every role.
    pub fn is_federal(&self) -> bool {
        matches!(self, StylePack::Federal)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Auto-suggestion
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Federal,
    Healthcare,
    Academic,
    Executive,
    Technical,
    MetricHeavy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSuggestion {
    pub suggested: StylePack,
    pub confidence: f32,
    pub also_good: StylePack,
    pub signals: Vec<Signal>,
}

const FEDERAL_CUES: &[&str] = &["usajobs", "gs-", "specialized experience"];
const HEALTHCARE_CUES: &[&str] = &["rn", "emt", "hipaa", "epic", "cerner", "clinic", "ehr", "emr"];
const ACADEMIC_CUES: &[&str] = &["curriculum vitae", "publication", "postdoc", "grant"];
const EXECUTIVE_CUES: &[&str] = &[
    "vp",
    "vice president",
    "director",
    "p&l",
    "profit and loss",
    "org of",
    "grew",
];
const TECHNICAL_CUES: &[&str] = &[
    "python",
    "sql",
    "aws",
    "git",
    "ci/cd",
    "docker",
    "kubernetes",
    "microservice",
];

static RE_PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{1,3}%").unwrap());

/// Cue present as a whole word (or word prefix for stems like "publication").
fn has_cue(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| {
        text.match_indices(cue).any(|(i, _)| {
            let before_ok = text[..i]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let open_ended = cue.ends_with(|c: char| !c.is_alphanumeric());
            let after_ok = open_ended
                || text[i + cue.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !c.is_alphanumeric() || c == 's');
            before_ok && after_ok
        })
    })
}

pub fn detect_signals(resume: &str, posting: &str) -> BTreeSet<Signal> {
    let text = format!("{resume} {posting}").to_lowercase();
    let mut signals = BTreeSet::new();

    if has_cue(&text, FEDERAL_CUES) {
        signals.insert(Signal::Federal);
    }
    if has_cue(&text, HEALTHCARE_CUES) {
        signals.insert(Signal::Healthcare);
    }
    if has_cue(&text, ACADEMIC_CUES) {
        signals.insert(Signal::Academic);
    }
    if has_cue(&text, EXECUTIVE_CUES) {
        signals.insert(Signal::Executive);
    }
    if has_cue(&text, TECHNICAL_CUES) {
        signals.insert(Signal::Technical);
    }
    if RE_PERCENT.find_iter(&text).count() >= 3 {
        signals.insert(Signal::MetricHeavy);
    }
    signals
}

fn signal_weights(signal: Signal) -> &'static [(StylePack, f32)] {
    match signal {
        Signal::Federal => &[(StylePack::Federal, 0.6), (StylePack::Classic, 0.2)],
        Signal::Healthcare => &[(StylePack::Healthcare, 0.5), (StylePack::Classic, 0.2)],
        Signal::Academic => &[(StylePack::AcademicCv, 0.6), (StylePack::Classic, 0.2)],
        Signal::Executive => &[(StylePack::Executive, 0.5), (StylePack::Classic, 0.2)],
        Signal::Technical => &[(StylePack::Technical, 0.5), (StylePack::Hybrid, 0.2)],
        Signal::MetricHeavy => &[(StylePack::Hybrid, 0.3), (StylePack::Classic, 0.2)],
    }
}

/// Ranks every style by summed signal weight. Ties (including the no-signal
/// case) resolve in canonical order, so Classic wins when nothing stands out.
pub fn suggest_style(resume: &str, posting: &str) -> StyleSuggestion {
    let signals = detect_signals(resume, posting);

    let mut scores: Vec<(StylePack, f32)> = ALL_STYLES.iter().map(|s| (*s, 0.0)).collect();
    for signal in &signals {
        for (style, weight) in signal_weights(*signal) {
            if let Some(slot) = scores.iter_mut().find(|(s, _)| s == style) {
                slot.1 += weight;
            }
        }
    }
    // Stable sort keeps canonical order among equal scores.
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (suggested, confidence) = scores[0];
    let also_good = scores
        .get(1)
        .map(|(s, _)| *s)
        .filter(|s| *s != suggested)
        .unwrap_or(StylePack::Classic);

    StyleSuggestion {
        suggested,
        confidence: (confidence * 100.0).round() / 100.0,
        also_good,
        signals: signals.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_signals_defaults_to_classic() {
        let s = suggest_style("Cashier at a grocery store", "Cashier wanted");
        assert_eq!(s.suggested, StylePack::Classic);
        assert_eq!(s.confidence, 0.0);
        assert!(s.signals.is_empty());
    }

    #[test]
    fn test_usajobs_posting_suggests_federal() {
        let s = suggest_style(
            "Program analyst",
            "Apply on USAJOBS. Specialized experience at the GS-11 level.",
        );
        assert_eq!(s.suggested, StylePack::Federal);
        assert_eq!(s.also_good, StylePack::Classic);
        assert!(s.signals.contains(&Signal::Federal));
    }

    #[test]
    fn test_technical_cues_suggest_technical() {
        let s = suggest_style("Built Python services on AWS with Docker", "Backend role");
        assert_eq!(s.suggested, StylePack::Technical);
        assert_eq!(s.also_good, StylePack::Hybrid);
    }

    #[test]
    fn test_short_cues_need_word_boundaries() {
        // "learn" and "turn" contain "rn" but must not flag healthcare.
        let sig = detect_signals("Eager to learn and turn ideas around", "");
        assert!(!sig.contains(&Signal::Healthcare));
        let sig = detect_signals("Licensed RN, 6 years ICU", "");
        assert!(sig.contains(&Signal::Healthcare));
    }

    #[test]
    fn test_metric_heavy_needs_three_percentages() {
        let sig = detect_signals("cut 10% then 20% then 30%", "");
        assert!(sig.contains(&Signal::MetricHeavy));
        let sig = detect_signals("cut 10% then 20%", "");
        assert!(!sig.contains(&Signal::MetricHeavy));
    }

    #[test]
    fn test_every_style_orders_experience() {
        for style in ALL_STYLES {
            assert!(style.sections().contains(&Section::Experience), "{style:?}");
            assert_eq!(style.sections()[0], Section::Summary);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(StylePack::AcademicCv.display_name(), "AcademicCV");
        assert_eq!(StylePack::Technical.display_name(), "Technical");
    }
}
