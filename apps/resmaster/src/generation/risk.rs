//! Posting risk signals: scam patterns, reposting-aggregator source, salary-transparency nudge.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamFlag {
    UpfrontFee,
    MessagingAppOnly,
    FakeChecks,
    CryptoTasks,
}

impl ScamFlag {
    pub fn describe(&self) -> &'static str {
        match self {
            ScamFlag::UpfrontFee => "Asks for payment before you start (application, training or setup fee).",
            ScamFlag::MessagingAppOnly => "Interview happens only over Telegram or WhatsApp.",
            ScamFlag::FakeChecks => "Mentions cashier's checks, overpayment or reimbursement by check.",
            ScamFlag::CryptoTasks => "Involves crypto or gift-card \"tasks\".",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub scam_flags: Vec<ScamFlag>,
    /// Posting was sourced from a known reposting aggregator.
    pub reposted_listing: bool,
    pub salary_nudge: Option<String>,
}

impl RiskReport {
    pub fn is_clear(&self) -> bool {
        self.scam_flags.is_empty() && !self.reposted_listing && self.salary_nudge.is_none()
    }
}

static SCAM_PATTERNS: LazyLock<Vec<(ScamFlag, Regex)>> = LazyLock::new(|| {
    vec![
        (
            ScamFlag::UpfrontFee,
            Regex::new(r"(?i)(pay.*(application|training|setup))|(payment.*before.*start)").unwrap(),
        ),
        (
            ScamFlag::MessagingAppOnly,
            Regex::new(r"(?i)(telegram|whatsapp)\s*(interview|chat|hr)").unwrap(),
        ),
        (
            ScamFlag::FakeChecks,
            Regex::new(r"(?i)(cashier'?s?\s*check|overpayment|reimburse\s*via\s*check)").unwrap(),
        ),
        (
            ScamFlag::CryptoTasks,
            Regex::new(r"(?i)(bitcoin|crypto|gift\s*card).*task").unwrap(),
        ),
    ]
});

const REPOST_HOSTS: &[&str] = &["jofdav.com"];
const PAY_TRANSPARENCY_PLACES: &[&str] = &[
    "california",
    "ca",
    "los angeles",
    "san francisco",
    "seattle",
    "new york",
    "colorado",
    "washington",
];

pub fn assess(posting: &str, source_url: Option<&str>) -> RiskReport {
    let scam_flags = SCAM_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(posting))
        .map(|(flag, _)| *flag)
        .collect();

    let reposted_listing = source_url
        .map(|u| {
            let u = u.to_lowercase();
            REPOST_HOSTS.iter().any(|h| u.contains(h))
        })
        .unwrap_or(false);

    RiskReport {
        scam_flags,
        reposted_listing,
        salary_nudge: salary_nudge(posting),
    }
}

fn salary_nudge(posting: &str) -> Option<String> {
    let words: Vec<String> = posting
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let padded = format!(" {} ", words.join(" "));
    let hit = PAY_TRANSPARENCY_PLACES
        .iter()
        .any(|place| padded.contains(&format!(" {place} ")));
    hit.then(|| {
        "Salary range may be required by local law; check the posting or ask the recruiter."
            .to_string()
    })
}
