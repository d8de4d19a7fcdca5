//! JD Parser: extracts structured requirements, keywords, and tone from a raw job description.
//!
//! Heuristic and deterministic: ordered pattern lists per field, first match wins.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::terms::{is_keyword_candidate, split_terms, tokenize};

/// Detected tone of a job description. Drives verb selection and the cover-letter register.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum JDTone {
    AggressiveStartup,
    #[default]
    CollaborativeEnterprise,
    ResearchOriented,
    ProductOriented,
}

/// A single keyword from the JD, weighted by position and frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// title=1.0, requirements=0.8, responsibilities=0.6, body=0.3
    pub position_weight: f32,
    /// frequency * position_weight
    pub weighted_score: f32,
}

/// Structured posting. Produced once per pair, read-only afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub title: String,
    pub company: String,
    pub required_terms: Vec<String>,
    pub preferred_terms: Vec<String>,
    pub specialized_experience: Vec<String>,
    pub keyword_inventory: Vec<KeywordEntry>,
    pub detected_tone: JDTone,
    /// Federal postings that close at 11:59 p.m. Eastern.
    pub closing_note: Option<String>,
    /// Posting may close early after an application cap.
    pub has_cutoff: bool,
    pub source_url: Option<String>,
    pub raw_text: String,
}

/// How many inventory keywords stand in for requirements when none are listed.
pub const FALLBACK_TERM_COUNT: usize = 10;
const INVENTORY_LIMIT: usize = 40;

impl JobRequirement {
    /// Terms the scorer measures coverage against.
    pub fn scoring_terms(&self) -> Vec<String> {
        if !self.required_terms.is_empty() {
            return self.required_terms.clone();
        }
        self.keyword_inventory
            .iter()
            .take(FALLBACK_TERM_COUNT)
            .map(|k| k.keyword.clone())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

static RE_TITLE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:job\s*title|title|position)\s*[:\-]\s*(.+?)\s*$").unwrap()
});
static RE_COMPANY_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:company|employer|organization|agency)\s*[:\-]\s*(.+?)\s*$").unwrap()
});
static RE_ABOUT_COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:About|ABOUT)\s+([A-Z][A-Za-z0-9&.\-]*(?:\s+[A-Z][A-Za-z0-9&.\-]*){0,3})")
        .unwrap()
});
static RE_AT_COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+at\s+([A-Z][A-Za-z0-9&.\-]*(?:\s+[A-Z][A-Za-z0-9&.\-]*){0,3})\s*$").unwrap()
});
static RE_INLINE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(requirements?|required(?:\s+qualifications)?|minimum\s+qualifications|basic\s+qualifications|qualifications|must[- ]haves?|preferred(?:\s+qualifications)?|nice[- ]to[- ]haves?|desired)\s*:|\b(requiring|must\s+have)\s+",
    )
    .unwrap()
});
static RE_SPECIALIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)specialized\s+experience\b[^:\n]*?(?:is|includes?|:)\s*([^\n]+)").unwrap()
});
static RE_CLOSING_ET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)11:\s*59\s*p\.?m\.?\s*eastern").unwrap());
static RE_CUTOFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cut-?off|first\s+\d+\s+applicants|cap\s+on\s+applications").unwrap()
});
static RE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[•\-\*▪◦·]|\d{1,2}[.)])\s+(.+)$").unwrap());

const TITLE_NOISE_SUFFIXES: &[&str] = &["Careers", "Jobs", "Job", "Hiring", "Openings"];
const ABOUT_REJECT: &[&str] = &["Us", "Our", "The", "You", "This", "Role", "Company", "Team"];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Zone {
    Title,
    Required,
    Preferred,
    Specialized,
    Responsibilities,
    Body,
}

impl Zone {
    fn weight(&self) -> f32 {
        match self {
            Zone::Title => 1.0,
            Zone::Required | Zone::Preferred | Zone::Specialized => 0.8,
            Zone::Responsibilities => 0.6,
            Zone::Body => 0.3,
        }
    }
}

/// Classifies a line as a section header. Returns the zone and any inline
/// content after the colon.
fn header_zone(line: &str) -> Option<(Zone, &str)> {
    let trimmed = line.trim().trim_start_matches(['#', '*']).trim();
    let (label, rest) = match trimmed.split_once(':') {
        Some((l, r)) => (l.trim(), r.trim()),
        None => (trimmed.trim_end_matches(['*']), ""),
    };
    if label.split_whitespace().count() > 5 {
        return None;
    }
    let l = label.to_lowercase();
    let zone = if l.contains("specialized experience") {
        Zone::Specialized
    } else if l.starts_with("preferred") || l.starts_with("nice to have") || l.starts_with("bonus") || l.starts_with("desired") {
        Zone::Preferred
    } else if l.starts_with("requirement")
        || l.starts_with("required")
        || l.contains("qualifications")
        || l.starts_with("must have")
        || l.starts_with("what you'll need")
        || l.starts_with("what you bring")
    {
        Zone::Required
    } else if l.starts_with("responsibilit")
        || l.starts_with("duties")
        || l.starts_with("what you'll do")
        || l.starts_with("the role")
    {
        Zone::Responsibilities
    } else if l.starts_with("about") || l.starts_with("benefits") || l.starts_with("who we are") {
        Zone::Body
    } else {
        return None;
    };
    Some((zone, rest))
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses a posting into a `JobRequirement`. Whitespace-only input is an error.
pub fn parse_job(text: &str, source_url: Option<&str>) -> Result<JobRequirement, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput("job posting has no text".to_string()));
    }

    let title = detect_title(text);
    let company = detect_company(text, source_url);

    let mut required: Vec<String> = Vec::new();
    let mut preferred: Vec<String> = Vec::new();
    let mut specialized: Vec<String> = Vec::new();
    let mut zoned_lines: Vec<(Zone, &str)> = Vec::new();

    let mut zone = Zone::Body;
    let mut seen_title = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !seen_title {
            seen_title = true;
            zoned_lines.push((Zone::Title, line));
            continue;
        }
        if let Some((z, inline)) = header_zone(line) {
            zone = z;
            let inline = label_content(inline);
            if !inline.trim().is_empty() {
                collect_into(z, inline, &mut required, &mut preferred, &mut specialized);
            }
            zoned_lines.push((z, line));
            continue;
        }
        if let Some(caps) = RE_BULLET.captures(line) {
            let item = caps.get(1).map_or("", |m| m.as_str());
            collect_into(zone, item, &mut required, &mut preferred, &mut specialized);
        }
        zoned_lines.push((zone, line));
    }

    collect_inline_labels(text, &mut required, &mut preferred);
    for caps in RE_SPECIALIZED.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            push_unique(&mut specialized, truncate_phrase(m.as_str()));
        }
    }
    preferred.retain(|p| !required.contains(p));

    let closing_note = RE_CLOSING_ET
        .is_match(text)
        .then(|| "Submit by 11:59 p.m. Eastern Time on the closing date.".to_string());

    Ok(JobRequirement {
        keyword_inventory: build_inventory(&zoned_lines),
        detected_tone: detect_tone(text),
        title,
        company,
        required_terms: required,
        preferred_terms: preferred,
        specialized_experience: specialized,
        closing_note,
        has_cutoff: RE_CUTOFF.is_match(text),
        source_url: source_url.map(str::to_string),
        raw_text: text.to_string(),
    })
}

fn collect_into(
    zone: Zone,
    item: &str,
    required: &mut Vec<String>,
    preferred: &mut Vec<String>,
    specialized: &mut Vec<String>,
) {
    match zone {
        Zone::Required => split_terms(item).into_iter().for_each(|t| push_unique(required, t)),
        Zone::Preferred => split_terms(item).into_iter().for_each(|t| push_unique(preferred, t)),
        Zone::Specialized => push_unique(specialized, truncate_phrase(item)),
        _ => {}
    }
}

/// Handles labels embedded mid-line, e.g. "Required: Java, SQL. Preferred: Kubernetes."
fn collect_inline_labels(text: &str, required: &mut Vec<String>, preferred: &mut Vec<String>) {
    for line in text.lines() {
        let labels: Vec<_> = RE_INLINE_LABEL.captures_iter(line).collect();
        for (i, caps) in labels.iter().enumerate() {
            let Some(whole) = caps.get(0) else { continue };
            let label = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map_or(String::new(), |m| m.as_str().to_lowercase());
            let end = labels
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |m| m.start());
            let content = &line[whole.end()..end];
            let content = sentence_prefix(content);
            if content.trim().is_empty() {
                continue;
            }
            let bucket = if label.starts_with("preferred")
                || label.starts_with("nice")
                || label.starts_with("desired")
            {
                &mut *preferred
            } else {
                &mut *required
            };
            split_terms(content)
                .into_iter()
                .for_each(|t| push_unique(bucket, t));
        }
    }
}

/// Inline header content, stopping at the next embedded label or sentence end.
fn label_content(s: &str) -> &str {
    let end = RE_INLINE_LABEL.find(s).map_or(s.len(), |m| m.start());
    sentence_prefix(&s[..end])
}

/// Text up to the first sentence break (". " or end).
fn sentence_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'.' && bytes.get(i + 1).map_or(true, |n| n.is_ascii_whitespace()) {
            return &s[..i];
        }
    }
    s
}

fn truncate_phrase(s: &str) -> String {
    let s = s.trim();
    if s.chars().count() <= 200 {
        s.to_string()
    } else {
        s.chars().take(200).collect()
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !item.is_empty() && !list.contains(&item) {
        list.push(item);
    }
}

fn detect_title(text: &str) -> String {
    let mut title = RE_TITLE_LABEL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            text.lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(|l| {
                    let l = RE_AT_COMPANY.replace(l, "");
                    l.chars().take(80).collect::<String>()
                })
        })
        .unwrap_or_default();

    for noise in TITLE_NOISE_SUFFIXES {
        if let Some(stripped) = title.strip_suffix(noise) {
            title = stripped.trim_end_matches([' ', '-', '|']).to_string();
        }
    }
    title.trim().to_string()
}

fn detect_company(text: &str, source_url: Option<&str>) -> String {
    if let Some(m) = RE_COMPANY_LABEL.captures(text).and_then(|c| c.get(1)) {
        return m.as_str().to_string();
    }
    for caps in RE_ABOUT_COMPANY.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            let first = m.as_str().split_whitespace().next().unwrap_or_default();
            if !ABOUT_REJECT.contains(&first) {
                return m.as_str().to_string();
            }
        }
    }
    if let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) {
        if let Some(m) = RE_AT_COMPANY.captures(first).and_then(|c| c.get(1)) {
            return m.as_str().to_string();
        }
    }
    source_url.and_then(company_from_url).unwrap_or_default()
}

/// Second-level label of the URL host, capitalized.
fn company_from_url(url: &str) -> Option<String> {
    let host = url
        .split("://")
        .nth(1)?
        .split(['/', '?', '#'])
        .next()?
        .split(':')
        .next()?;
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 {
        return None;
    }
    let label = parts[parts.len() - 2];
    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

fn build_inventory(zoned_lines: &[(Zone, &str)]) -> Vec<KeywordEntry> {
    let mut counts: HashMap<String, (u32, f32)> = HashMap::new();
    for (zone, line) in zoned_lines {
        for token in tokenize(line) {
            if !is_keyword_candidate(&token) {
                continue;
            }
            let slot = counts.entry(token).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 = slot.1.max(zone.weight());
        }
    }

    let mut inventory: Vec<KeywordEntry> = counts
        .into_iter()
        .map(|(keyword, (frequency, position_weight))| KeywordEntry {
            weighted_score: frequency as f32 * position_weight,
            keyword,
            frequency,
            position_weight,
        })
        .collect();
    inventory.sort_by(|a, b| {
        b.weighted_score
            .partial_cmp(&a.weighted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    inventory.truncate(INVENTORY_LIMIT);
    inventory
}

const STARTUP_CUES: &[&str] = &[
    "startup", "start-up", "fast-paced", "move fast", "series a", "series b", "series c",
    "equity", "own everything", "end-to-end", "disrupt", "scrappy", "founding",
];
const RESEARCH_CUES: &[&str] = &[
    "research", "publish", "publication", "phd", "investigate", "neurips", "icml", "scientist",
    "lab", "peer-reviewed",
];
const PRODUCT_CUES: &[&str] = &[
    "product", "customer", "user experience", "ship", "launch", "roadmap", "users",
];
const ENTERPRISE_CUES: &[&str] = &[
    "collaborat", "partner", "stakeholder", "enterprise", "cross-functional", "global",
    "team",
];

/// Cue counts per tone; the highest wins. Ties and zero fall back to enterprise.
pub fn detect_tone(text: &str) -> JDTone {
    let t = text.to_lowercase();
    let count = |cues: &[&str]| -> usize { cues.iter().map(|c| t.matches(c).count()).sum() };

    let ranked = [
        (JDTone::CollaborativeEnterprise, count(ENTERPRISE_CUES)),
        (JDTone::AggressiveStartup, count(STARTUP_CUES)),
        (JDTone::ResearchOriented, count(RESEARCH_CUES)),
        (JDTone::ProductOriented, count(PRODUCT_CUES)),
    ];
    let mut best = JDTone::default();
    let mut best_count = 0;
    for (tone, n) in ranked {
        if n > best_count {
            best = tone;
            best_count = n;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    // JD fixture: Aggressive startup
    const STARTUP_JD: &str = r#"
        Senior Rust Engineer — Core Infrastructure
        We move fast and own everything end-to-end. You will architect distributed systems,
        spearhead performance initiatives, and drive reliability from zero to production.
        Requirements: 5+ years Rust required, systems programming required, distributed systems expertise required.
        Nice to have: Kubernetes, Kafka experience a plus.
        About Us: Fast-paced Series B startup disrupting fintech infrastructure.
    "#;

    // JD fixture: Collaborative enterprise
    const ENTERPRISE_JD: &str = r#"
        Software Engineer — Platform Team
        Join our collaborative team to contribute to our microservices platform.
        You will partner with product managers and support reliability goals.
        Required: Java, Spring Boot, SQL. Preferred: Kubernetes, CI/CD experience.
        About Globex: Global enterprise with 50,000 employees focused on financial services.
    "#;

    // JD fixture: Research role
    const RESEARCH_JD: &str = r#"
        Research Scientist — ML Systems
        Investigate novel approaches to large language model training efficiency.
        Publish findings in top venues (NeurIPS, ICML). Evaluate proposed architectures.
        Required: PhD in CS/ML, experience with PyTorch. Preferred: Publications at top venues.
        About: Research lab at the frontier of AI.
    "#;

    const FEDERAL_JD: &str = "Job Title: Management Analyst\n\
        Agency: Department of Examples\n\
        Specialized experience is experience developing budget justifications and analyzing program data.\n\
        Applications close at 11:59 p.m. Eastern Time. This announcement has a cut-off after the first 100 applicants.\n";

    #[test]
    fn test_startup_fixture() {
        let jd = parse_job(STARTUP_JD, None).unwrap();
        assert_eq!(jd.detected_tone, JDTone::AggressiveStartup);
        assert_eq!(jd.title, "Senior Rust Engineer — Core Infrastructure");
        assert_eq!(
            jd.required_terms,
            vec!["rust", "systems programming", "distributed systems"]
        );
        assert!(jd.preferred_terms.contains(&"kubernetes".to_string()));
        assert!(jd.preferred_terms.contains(&"kafka".to_string()));
    }

    #[test]
    fn test_enterprise_fixture_splits_labels_on_one_line() {
        let jd = parse_job(ENTERPRISE_JD, None).unwrap();
        assert_eq!(jd.detected_tone, JDTone::CollaborativeEnterprise);
        assert_eq!(jd.required_terms, vec!["java", "spring boot", "sql"]);
        assert_eq!(jd.preferred_terms, vec!["kubernetes", "ci/cd"]);
        assert_eq!(jd.company, "Globex");
    }

    #[test]
    fn test_research_fixture() {
        let jd = parse_job(RESEARCH_JD, None).unwrap();
        assert_eq!(jd.detected_tone, JDTone::ResearchOriented);
        assert!(jd.required_terms.contains(&"pytorch".to_string()));
    }

    #[test]
    fn test_simple_requirements_line() {
        let jd = parse_job("Sales Lead\nRequirements: leadership, sales", None).unwrap();
        assert_eq!(jd.required_terms, vec!["leadership", "sales"]);
        assert_eq!(jd.scoring_terms(), vec!["leadership", "sales"]);
    }

    #[test]
    fn test_bulleted_requirements_section() {
        let text = "Warehouse Associate at Initech\n\
            Qualifications\n\
            - Forklift certification\n\
            - Inventory management\n\
            Responsibilities\n\
            - Load trucks\n";
        let jd = parse_job(text, None).unwrap();
        assert_eq!(
            jd.required_terms,
            vec!["forklift certification", "inventory management"]
        );
        assert_eq!(jd.company, "Initech");
        assert_eq!(jd.title, "Warehouse Associate");
    }

    #[test]
    fn test_federal_signals() {
        let jd = parse_job(FEDERAL_JD, None).unwrap();
        assert_eq!(jd.title, "Management Analyst");
        assert_eq!(jd.company, "Department of Examples");
        assert_eq!(jd.specialized_experience.len(), 1);
        assert!(jd.specialized_experience[0].starts_with("experience developing budget"));
        assert!(jd.closing_note.is_some());
        assert!(jd.has_cutoff);
    }

    #[test]
    fn test_company_from_url_host() {
        let jd = parse_job(
            "Barista\nMake coffee.",
            Some("https://careers.bluebottle.com/jobs/123"),
        )
        .unwrap();
        assert_eq!(jd.company, "Bluebottle");
        assert_eq!(jd.source_url.as_deref(), Some("https://careers.bluebottle.com/jobs/123"));
    }

    #[test]
    fn test_no_requirements_falls_back_to_inventory() {
        let jd = parse_job("Barista\nMake espresso drinks and steam milk.", None).unwrap();
        assert!(jd.required_terms.is_empty());
        let terms = jd.scoring_terms();
        assert!(!terms.is_empty());
        assert_eq!(terms[0], "barista", "title token carries the highest weight");
    }

    #[test]
    fn test_empty_posting_is_error() {
        let err = parse_job("  \n\t ", None).unwrap_err();
        assert_eq!(err.code(), "EMPTY_INPUT");
    }

    #[test]
    fn test_jd_tone_serde_roundtrip_names() {
        let tone: JDTone = serde_json::from_str(r#""ResearchOriented""#).unwrap();
        assert_eq!(tone, JDTone::ResearchOriented);
    }

    #[test]
    fn test_keyword_entry_weighted_score_is_freq_times_weight() {
        let jd = parse_job(STARTUP_JD, None).unwrap();
        for entry in &jd.keyword_inventory {
            let expected = entry.frequency as f32 * entry.position_weight;
            assert!((entry.weighted_score - expected).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_jd_tone_default_is_collaborative() {
        assert_eq!(detect_tone("Cashier"), JDTone::CollaborativeEnterprise);
    }
}
