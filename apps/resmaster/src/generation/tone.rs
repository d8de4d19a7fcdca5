//! Tone calibration: maps the detected posting tone to verb sets and to the
//! cover-letter register (warm / professional / direct).

use serde::{Deserialize, Serialize};

use crate::generation::jd_parser::JDTone;

/// Register of the cover letter's opening and closing paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CoverTone {
    Warm,
    Professional,
    Direct,
}

impl CoverTone {
    pub fn from_posting(tone: &JDTone) -> Self {
        match tone {
            JDTone::AggressiveStartup => CoverTone::Direct,
            JDTone::CollaborativeEnterprise | JDTone::ResearchOriented => CoverTone::Professional,
            JDTone::ProductOriented => CoverTone::Warm,
        }
    }

    pub fn opener(&self, addressee: &str, title: &str, company: &str) -> String {
        match self {
            CoverTone::Warm => format!(
                "Dear {addressee}, I'm reaching out because the {title} role at {company} lines up with the work I've already done and valued."
            ),
            CoverTone::Professional => format!(
                "Dear {addressee}, I'm writing regarding the {title} position at {company}. My background closely matches your priorities."
            ),
            CoverTone::Direct => format!(
                "Dear {addressee}, The {title} role at {company} fits my experience and outcomes."
            ),
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            CoverTone::Warm => "If this reads like a match, I'd welcome a short conversation to compare notes and share examples.",
            CoverTone::Professional => "I would welcome the opportunity to discuss how I can contribute to your goals.",
            CoverTone::Direct => "Happy to share specifics and start quickly if there's a fit.",
        }
    }
}

/// Verb sets and phrasing calibrated to a specific posting tone.
#[derive(Debug, Clone)]
pub struct ToneExamples {
    pub strong_verbs: Vec<&'static str>,
    pub avoid_verbs: Vec<&'static str>,
}

/// Returns tone-calibrated verb sets. The interview guide offers these as
/// rewrites for bullets flagged with a vague verb.
pub fn get_tone_examples(tone: &JDTone) -> ToneExamples {
    match tone {
        JDTone::AggressiveStartup => ToneExamples {
            strong_verbs: vec!["Built", "Shipped", "Launched", "Led", "Drove", "Owned"],
            avoid_verbs: vec!["assisted", "helped", "supported", "participated in"],
        },
        JDTone::CollaborativeEnterprise => ToneExamples {
            strong_verbs: vec![
                "Partnered with",
                "Delivered",
                "Coordinated",
                "Enabled",
                "Facilitated",
                "Standardized",
            ],
            avoid_verbs: vec!["spearheaded", "solely built", "owned end-to-end"],
        },
        JDTone::ResearchOriented => ToneExamples {
            strong_verbs: vec![
                "Investigated",
                "Designed and evaluated",
                "Published",
                "Analyzed",
                "Proposed",
            ],
            avoid_verbs: vec!["shipped", "launched", "moved fast", "disrupted"],
        },
        JDTone::ProductOriented => ToneExamples {
            strong_verbs: vec!["Shipped", "Delivered", "Launched", "Improved", "Reduced"],
            avoid_verbs: vec!["investigated", "evaluated", "researched"],
        },
    }
}
