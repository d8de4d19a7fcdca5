//! Term handling shared by the posting parser and the scorer: tokenizing,
//! light stemming, qualifier stripping and the related-term table.

use std::sync::LazyLock;

use regex::Regex;

pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "or", "the", "but", "with", "for", "to", "from", "on", "in", "at", "as",
    "by", "of", "be", "is", "are", "was", "were", "will", "would", "shall", "should", "can",
    "could", "into", "within", "without", "among", "across", "per", "plus", "via", "than", "then",
    "that", "this", "those", "it", "its", "your", "you", "we", "our", "they", "them", "their",
    "he", "she", "his", "her", "who", "whom", "which", "what", "when", "where", "why", "how",
];

/// Posting boilerplate that never counts as a skill on its own.
const NOISE: &[&str] = &[
    "experience", "experienced", "years", "year", "yrs", "ability", "able", "strong",
    "excellent", "good", "solid", "knowledge", "skills", "skill", "work", "working",
    "including", "etc", "role", "job", "position", "candidate", "candidates", "required",
    "requirements", "preferred", "must", "have", "has", "using", "also", "well", "new", "other",
    "all", "any", "more", "least", "minimum", "demonstrated", "proven", "related", "field",
    "equivalent", "similar", "relevant", "familiarity", "understanding", "plus", "ideal",
    "looking", "join", "help", "responsibilities", "qualifications", "nice",
];

/// Related phrasings credited toward a posting term.
const RELATED_TERMS: &[(&str, &[&str])] = &[
    (
        "leadership",
        &["managed", "led", "lead", "team of", "supervised", "mentored", "directed", "headed"],
    ),
    ("management", &["managed", "oversaw", "supervised", "directed"]),
    ("communication", &["presented", "communicated", "briefed", "documented", "wrote"]),
    ("collaboration", &["partnered", "collaborated", "cross-functional", "coordinated"]),
    ("teamwork", &["partnered", "collaborated", "team of", "coordinated"]),
    ("sales", &["sold", "revenue", "quota", "pipeline"]),
    ("customer service", &["customers", "clients", "client service", "resolved tickets"]),
    ("project management", &["managed projects", "delivered projects", "scrum", "agile", "roadmap"]),
    ("analysis", &["analyzed", "analytics", "insights", "dashboards", "reporting"]),
    ("analytics", &["analyzed", "analysis", "insights", "dashboards", "reporting"]),
    ("problem solving", &["resolved", "troubleshot", "diagnosed", "solved"]),
    ("training", &["trained", "onboarded", "coached", "mentored"]),
    ("budgeting", &["budget", "cost", "p&l", "forecast"]),
];

static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9][a-z0-9+#&./-]*").unwrap());
static RE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,;]\s*|\s+(?:and|or|&)\s+").unwrap());
static RE_LEAD_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d+\s*\+?\s*(?:years?|yrs?)\s*(?:of\s+)?|(?:strong|excellent|solid|proven|demonstrated|deep|working|hands-on)\s+|(?:experience|expertise|proficiency|knowledge|familiarity|background)\s+(?:with|in|of|using)\s+|(?:ability|able)\s+to\s+|(?:a|an|the)\s+)",
    )
    .unwrap()
});
static RE_TRAIL_QUALIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s+(?:is\s+)?(?:required|preferred|a\s+plus|experience|expertise|skills?|knowledge|background|proficiency|desired)$",
    )
    .unwrap()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

fn is_noise(word: &str) -> bool {
    is_stopword(word) || NOISE.contains(&word)
}

/// Lowercased word tokens, keeping `c++`, `ci/cd`, `node.js` intact.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().trim_end_matches(['.', '/', '-', '&']).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Suffix stripping good enough to equate plurals and simple tenses.
pub fn stem(word: &str) -> String {
    let w = word.to_lowercase();
    let n = w.chars().count();
    let stripped = if n > 5 && w.ends_with("ing") {
        &w[..w.len() - 3]
    } else if n > 4 && w.ends_with("ed") {
        &w[..w.len() - 2]
    } else if n > 3 && w.ends_with('s') && !w.ends_with("ss") {
        &w[..w.len() - 1]
    } else {
        &w
    };
    if stripped.chars().count() > 4 && stripped.ends_with('e') {
        stripped[..stripped.len() - 1].to_string()
    } else {
        stripped.to_string()
    }
}

pub fn stems(text: &str) -> Vec<String> {
    tokenize(text).iter().map(|t| stem(t)).collect()
}

/// True when `needle`'s stems occur contiguously in `haystack`.
pub fn contains_phrase(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Strips qualifiers like "5+ years of" or "experience with" from a raw
/// posting fragment. Returns `None` for fragments that carry no skill.
pub fn clean_term(raw: &str) -> Option<String> {
    let mut term = raw
        .trim()
        .trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '-' | '•' | '*' | '·' | ':' | ';' | '.' | '(' | ')' | '"' | '\'')
        })
        .to_lowercase();
    term = term.split_whitespace().collect::<Vec<_>>().join(" ");

    for _ in 0..4 {
        let before = term.clone();
        term = RE_LEAD_QUALIFIER.replace(&term, "").trim().to_string();
        term = RE_TRAIL_QUALIFIER.replace(&term, "").trim().to_string();
        if term == before {
            break;
        }
    }

    let words: Vec<&str> = term.split_whitespace().collect();
    if words.is_empty() || words.len() > 5 || words.iter().all(|w| is_noise(w)) {
        return None;
    }
    Some(term)
}

/// Splits an inline list ("Java, Spring Boot and SQL") into clean terms.
pub fn split_terms(list: &str) -> Vec<String> {
    RE_SPLIT.split(list).filter_map(clean_term).collect()
}

pub fn related_terms(term: &str) -> &'static [&'static str] {
    RELATED_TERMS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(term))
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// Whether a single token is worth counting in the keyword inventory.
pub fn is_keyword_candidate(token: &str) -> bool {
    token.chars().count() >= 2
        && !is_noise(token)
        && !token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '+')
}
