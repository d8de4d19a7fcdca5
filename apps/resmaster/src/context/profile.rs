//! Resume field extraction: normalized text → `ExtractedProfile`.
//!
//! Ordered pattern lists per field; the first pattern that matches wins and
//! anything not found stays empty.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::dedup::tighten;
use crate::errors::AppError;
use crate::models::profile::{ContactInfo, ExtractedProfile, HistoryEntry};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResumeSection {
    Header,
    Summary,
    Experience,
    Skills,
    Education,
    Certifications,
    Publications,
    Projects,
    Awards,
    Other,
}

const HEADINGS: &[(&str, ResumeSection)] = &[
    ("summary", ResumeSection::Summary),
    ("professional summary", ResumeSection::Summary),
    ("career summary", ResumeSection::Summary),
    ("profile", ResumeSection::Summary),
    ("professional profile", ResumeSection::Summary),
    ("objective", ResumeSection::Summary),
    ("about me", ResumeSection::Summary),
    ("experience", ResumeSection::Experience),
    ("work experience", ResumeSection::Experience),
    ("professional experience", ResumeSection::Experience),
    ("relevant experience", ResumeSection::Experience),
    ("employment history", ResumeSection::Experience),
    ("employment", ResumeSection::Experience),
    ("work history", ResumeSection::Experience),
    ("skills", ResumeSection::Skills),
    ("technical skills", ResumeSection::Skills),
    ("key skills", ResumeSection::Skills),
    ("core competencies", ResumeSection::Skills),
    ("competencies", ResumeSection::Skills),
    ("tech stack", ResumeSection::Skills),
    ("education", ResumeSection::Education),
    ("education and training", ResumeSection::Education),
    ("certifications", ResumeSection::Certifications),
    ("certificates", ResumeSection::Certifications),
    ("licenses", ResumeSection::Certifications),
    ("licenses and certifications", ResumeSection::Certifications),
    ("certifications and licenses", ResumeSection::Certifications),
    ("licensure", ResumeSection::Certifications),
    ("publications", ResumeSection::Publications),
    ("presentations", ResumeSection::Publications),
    ("publications and presentations", ResumeSection::Publications),
    ("projects", ResumeSection::Projects),
    ("selected projects", ResumeSection::Projects),
    ("awards", ResumeSection::Awards),
    ("honors", ResumeSection::Awards),
    ("awards and honors", ResumeSection::Awards),
    ("volunteer", ResumeSection::Other),
    ("volunteer experience", ResumeSection::Other),
    ("interests", ResumeSection::Other),
    ("references", ResumeSection::Other),
];

const BULLET_GLYPHS: &[char] = &['•', '-', '*', '▪', '◦', '·'];
const MONTHS: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?";

static RE_NAME_TITLECASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-zA-Z'\-]+(?:\s+[A-Z]\.)?(?:\s+[A-Z][a-zA-Z'\-]+){1,2})$").unwrap()
});
static RE_NAME_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Name\s*[:\-]\s*([A-Z][a-zA-Z'\-]+(?:\s+[A-Z]\.)?(?:\s+[A-Z][a-zA-Z'\-]+){1,2})")
        .unwrap()
});
static RE_NAME_UPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Z'\-]+(?:\s+[A-Z]\.)?(?:\s+[A-Z][A-Z'\-]+){1,2})$").unwrap()
});
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}\s?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap()
});
static RE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?://[^\s<>"')\]|]+|\b(?:www\.)?(?:linkedin\.com|github\.com)/[^\s<>"')\]|]+)"#)
        .unwrap()
});
static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-zA-Z.]+(?:\s[A-Z][a-zA-Z.]+){0,2},\s*[A-Z]{2})\b(?:\s+\d{5})?").unwrap()
});
static RE_STREET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d{1,6}\s+(?:[A-Z][A-Za-z0-9.]*\s+){1,4}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl)\b\.?(?:\s*(?:Apt|Suite|Unit|#)\s*\w+)?",
    )
    .unwrap()
});
static RE_DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let point = format!(r"(?:{MONTHS}\s+)?(?:\d{{1,2}}/)?\d{{4}}");
    Regex::new(&format!(
        r"(?i)\b{point}\s*(?:-|–|—|to)\s*(?:{point}|present|current|now)\b"
    ))
    .unwrap()
});
static RE_ROLE_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^|]+?)\s+[—–-]\s+([^|]+)$").unwrap());
static RE_ROLE_PIPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^|]+?)\s*\|\s*([^|]+?)(?:\s*\|.*)?$").unwrap());
static RE_ROLE_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+at\s+([A-Z].*)$").unwrap());
static RE_ROLE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^,]+),\s*([^,]+?)(?:,.*)?$").unwrap());

/// Extracts profile fields from normalized resume text.
pub fn extract_profile(text: &str) -> Result<ExtractedProfile, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput("resume has no text".to_string()));
    }

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let name = detect_name(&lines, text);
    let contact = detect_contact(&lines);

    let mut profile = ExtractedProfile {
        name: name.clone().unwrap_or_default(),
        contact,
        raw_text: text.to_string(),
        ..Default::default()
    };

    let mut section = ResumeSection::Header;
    let mut saw_experience_heading = false;
    let mut summary_lines: Vec<String> = Vec::new();
    let mut loose_bullets: Vec<String> = Vec::new();
    let mut loose_lines: Vec<String> = Vec::new();

    for line in &lines {
        if let Some((heading, inline)) = match_heading(line) {
            section = heading;
            if heading == ResumeSection::Experience {
                saw_experience_heading = true;
            }
            if !inline.is_empty() {
                absorb_line(&mut profile, &mut summary_lines, heading, inline);
            }
            continue;
        }

        match section {
            ResumeSection::Experience => push_experience_line(&mut profile.history, line),
            ResumeSection::Header | ResumeSection::Other => {
                if is_contact_line(line) || name.as_deref() == Some(*line) {
                    continue;
                }
                if let Some(b) = strip_bullet(line) {
                    loose_bullets.push(b);
                } else if line.split_whitespace().count() >= 5 {
                    loose_lines.push(tighten(line));
                }
            }
            other => absorb_line(&mut profile, &mut summary_lines, other, line),
        }
    }

    if !summary_lines.is_empty() {
        profile.summary = Some(summary_lines.join(" "));
    }

    // No experience heading: bullets (or substantive lines) become one untitled role.
    if !saw_experience_heading && profile.history.is_empty() {
        let bullets = if loose_bullets.is_empty() {
            loose_lines
        } else {
            loose_bullets
        };
        if !bullets.is_empty() {
            profile.history.push(HistoryEntry {
                bullets,
                ..Default::default()
            });
        }
    }

    Ok(profile)
}

fn absorb_line(
    profile: &mut ExtractedProfile,
    summary: &mut Vec<String>,
    section: ResumeSection,
    line: &str,
) {
    let item = strip_bullet(line).unwrap_or_else(|| tighten(line));
    if item.is_empty() {
        return;
    }
    match section {
        ResumeSection::Summary => summary.push(item),
        ResumeSection::Skills => {
            for skill in item.split([',', ';', '|', '•', '·']) {
                let skill = skill.trim().trim_end_matches('.');
                if !skill.is_empty() && !profile.skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                    profile.skills.push(skill.to_string());
                }
            }
        }
        ResumeSection::Education => profile.education.push(item),
        ResumeSection::Certifications => profile.certifications.push(item),
        ResumeSection::Publications => profile.publications.push(item),
        ResumeSection::Projects => profile.projects.push(item),
        ResumeSection::Awards => profile.awards.push(item),
        ResumeSection::Experience => push_experience_line(&mut profile.history, line),
        ResumeSection::Header | ResumeSection::Other => {}
    }
}

/// A heading line, optionally with inline content after a colon ("Skills: Rust, SQL").
fn match_heading(line: &str) -> Option<(ResumeSection, &str)> {
    let (label, rest) = match line.split_once(':') {
        Some((l, r)) => (l, r.trim()),
        None => (line, ""),
    };
    let key = label
        .trim()
        .trim_matches(|c: char| c == '#' || c == '*' || c == '=')
        .trim()
        .replace('&', "and")
        .to_lowercase();
    HEADINGS
        .iter()
        .find(|(h, _)| *h == key)
        .map(|(_, s)| (*s, rest))
}

fn strip_bullet(line: &str) -> Option<String> {
    let first = line.chars().next()?;
    if BULLET_GLYPHS.contains(&first) {
        let rest = line[first.len_utf8()..].trim();
        // a lone dash is a separator
        if first == '-' && rest.is_empty() {
            return None;
        }
        return Some(tighten(rest));
    }
    None
}

fn is_contact_line(line: &str) -> bool {
    RE_EMAIL.is_match(line)
        || RE_PHONE.is_match(line)
        || RE_LINK.is_match(line)
        || RE_STREET.is_match(line)
}

fn push_experience_line(history: &mut Vec<HistoryEntry>, line: &str) {
    if let Some(bullet) = strip_bullet(line) {
        match history.last_mut() {
            Some(entry) => entry.bullets.push(bullet),
            None => history.push(HistoryEntry {
                bullets: vec![bullet],
                ..Default::default()
            }),
        }
        return;
    }

    // A bare date range right after a header belongs to that role.
    if let Some(m) = RE_DATE_RANGE.find(line) {
        if m.as_str().len() + 2 >= line.len() {
            if let Some(entry) = history.last_mut() {
                if entry.dates.is_empty() {
                    entry.dates = m.as_str().to_string();
                }
            }
            return;
        }
    }

    // Wrapped continuation of the previous bullet.
    if let Some(entry) = history.last_mut() {
        if let Some(last) = entry.bullets.last_mut() {
            if line.chars().next().is_some_and(|c| c.is_lowercase()) {
                last.push(' ');
                last.push_str(line);
                return;
            }
        }
    }

    if line.chars().count() <= 90 && !line.ends_with('.') {
        if let Some(entry) = parse_role_header(line) {
            history.push(entry);
            return;
        }
    }

    match history.last_mut() {
        Some(entry) => entry.bullets.push(tighten(line)),
        None => history.push(HistoryEntry {
            bullets: vec![tighten(line)],
            ..Default::default()
        }),
    }
}

/// Removes a date range from a header line, returning `(rest, dates)`.
fn split_dates(line: &str) -> (String, String) {
    let trim_edge = |c: char| c.is_whitespace() || ",|()-–—".contains(c);
    match RE_DATE_RANGE.find(line) {
        Some(m) => {
            let rest = format!("{} {}", &line[..m.start()], &line[m.end()..]);
            (
                rest.trim_matches(trim_edge).to_string(),
                m.as_str().to_string(),
            )
        }
        None => (line.trim().to_string(), String::new()),
    }
}

/// Role header patterns, tried in order: `Title — Company (dates)`,
/// `Title | Company | dates`, `Title at Company, dates`, `Title, Company`.
pub fn parse_role_header(line: &str) -> Option<HistoryEntry> {
    let (core, dates) = split_dates(line);
    if core.is_empty() {
        return None;
    }
    let entry = |title: &str, company: &str| HistoryEntry {
        title: title.trim().to_string(),
        company: company.trim().trim_end_matches([',', '.', ';']).to_string(),
        dates: dates.clone(),
        bullets: Vec::new(),
    };

    if let Some(c) = RE_ROLE_DASH.captures(&core) {
        return Some(entry(&c[1], &c[2]));
    }
    if let Some(c) = RE_ROLE_PIPE.captures(&core) {
        return Some(entry(&c[1], &c[2]));
    }
    if let Some(c) = RE_ROLE_AT.captures(&core) {
        return Some(entry(&c[1], &c[2]));
    }
    if core.split_whitespace().count() <= 10 {
        if let Some(c) = RE_ROLE_COMMA.captures(&core) {
            return Some(entry(&c[1], &c[2]));
        }
    }
    // A short title-cased line on its own is a role with no company.
    let words: Vec<&str> = core.split_whitespace().collect();
    let title_cased = words
        .iter()
        .all(|w| w.starts_with(|c: char| c.is_uppercase() || c.is_ascii_digit() || c == '&'));
    if (1..=6).contains(&words.len()) && title_cased {
        return Some(entry(&core, ""));
    }
    None
}

fn detect_name(lines: &[&str], text: &str) -> Option<String> {
    for line in lines.iter().take(5) {
        if match_heading(line).is_some() {
            continue;
        }
        if !line.chars().any(char::is_lowercase) {
            continue;
        }
        if let Some(c) = RE_NAME_TITLECASE.captures(line) {
            return Some(c[1].to_string());
        }
    }
    if let Some(c) = RE_NAME_LABEL.captures(text) {
        return Some(c[1].to_string());
    }
    for line in lines.iter().take(5) {
        if match_heading(line).is_some() {
            continue;
        }
        if let Some(c) = RE_NAME_UPPER.captures(line) {
            return Some(title_case(&c[1]));
        }
    }
    None
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn detect_contact(lines: &[&str]) -> ContactInfo {
    let header: Vec<&str> = lines.iter().take(8).copied().collect();
    let header_text = header.join("\n");
    let all_text = lines.join("\n");

    let mut links: Vec<String> = Vec::new();
    for m in RE_LINK.find_iter(&all_text) {
        let link = m.as_str().trim_end_matches(['.', ',', ';']).to_string();
        if !links.contains(&link) {
            links.push(link);
        }
    }

    ContactInfo {
        email: RE_EMAIL.find(&all_text).map(|m| m.as_str().to_string()),
        phone: RE_PHONE.find(&header_text).map(|m| m.as_str().trim().to_string()),
        location: RE_LOCATION
            .captures(&header_text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        street: RE_STREET.find(&header_text).map(|m| m.as_str().to_string()),
        links,
    }
}
