//! Evidence-only profile enrichment: military occupation codes and
//! healthcare credentials the resume already shows, surfaced where a reader
//! looks for them.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::profile::ExtractedProfile;

const VET_CROSSWALK: &[(&str, &str)] = &[
    ("11B", "Infantryman → Security/Operations Specialist"),
    ("88M", "Motor Transport → Logistics/Driver Ops"),
    ("68W", "Combat Medic → EMT/Patient Care Tech"),
    ("35F", "Intel Analyst → Business/Threat Intelligence"),
    ("3D1", "Client Systems → IT Support/Helpdesk"),
    ("3D2", "Cyber Systems → Systems Admin/SRE"),
];

const MED_CERTS: &[&str] = &[
    "CNA", "LPN", "LVN", "RN", "BSN", "MSN", "NP", "PA-C", "MD", "DO", "EMT", "EMT-B", "EMT-I",
    "EMT-P", "Paramedic", "RRT", "CRT", "PT", "DPT", "OT", "COTA", "SLP", "PharmD", "RPh", "CPhT",
    "CRCST", "ARRT", "CNMT", "CPR", "BLS", "ACLS", "PALS", "NRP", "TNCC", "ENPC", "ATLS", "RHIT",
    "RHIA", "CPC", "CCS", "CCA", "COC", "CIC", "CHDA", "CRCR",
];
const MED_COMPLIANCE: &[&str] = &[
    "HIPAA", "OSHA", "JCAHO", "The Joint Commission", "CLIA", "CAP", "IRB", "GCP", "ICH-GCP",
    "FDA", "EMA", "21 CFR Part 11",
];
const MED_EMR: &[&str] = &[
    "Epic", "EpicCare", "Cerner", "Oracle Health", "Meditech", "Allscripts", "athenahealth",
    "eClinicalWorks", "NextGen", "Practice Fusion",
];
const MED_SPECIALTIES: &[&str] = &[
    "Emergency", "ICU", "CCU", "Telemetry", "Oncology", "Pediatrics", "OB/GYN",
    "Labor & Delivery", "Surgery", "Perioperative", "PACU", "Cath Lab", "Radiology", "Cardiology",
    "Pulmonology", "Nephrology", "Psychiatry", "Behavioral Health", "Primary Care", "Urgent Care",
    "Family Medicine", "Internal Medicine", "Clinical Research", "Pharmacovigilance",
    "Regulatory Affairs", "Revenue Cycle", "Medical Billing", "Coding",
];
const MEDICAL_NEEDLES: &[&str] = &[
    "patient", "clinic", "hospital", "emr", "ehr", "epic", "cerner", "meditech", "provider",
    "nurse", "physician", "pharmac", "radiology", "respiratory", "triage", "icd-10", "inpatient",
    "outpatient", "charting", "revenue cycle", "clinical trial",
];

const MAX_CERTS: usize = 6;
const MAX_EMR: usize = 4;
const MAX_COMPLIANCE: usize = 4;
const MAX_SPECIALTIES: usize = 6;

/// Case-sensitive credential matchers: `RN` must not match `rn` in "learn".
static CERT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile(MED_CERTS, false));
static COMPLIANCE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile(MED_COMPLIANCE, false));
static EMR_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile(MED_EMR, false));
static SPECIALTY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile(MED_SPECIALTIES, true));
static VET_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let codes: Vec<&str> = VET_CROSSWALK.iter().map(|(code, _)| *code).collect();
    compile(&codes, false)
});

fn compile(terms: &[&'static str], ignore_case: bool) -> Vec<(&'static str, Regex)> {
    let flag = if ignore_case { "(?i)" } else { "" };
    terms
        .iter()
        .map(|t| {
            // `\b` fails next to non-word edges such as the `&` in "Labor & Delivery"
            let pattern = format!(r"{flag}(?:^|[^\w-]){}(?:$|[^\w-])", regex::escape(t));
            (*t, Regex::new(&pattern).unwrap())
        })
        .collect()
}

fn found_in(patterns: &[(&'static str, Regex)], text: &str, cap: usize) -> Vec<String> {
    patterns
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(term, _)| term.to_string())
        .take(cap)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Military occupation codes
// ────────────────────────────────────────────────────────────────────────────

/// Civilian translations for every military occupation code the resume names.
pub fn military_translations(resume: &str) -> Vec<String> {
    VET_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(resume))
        .filter_map(|(code, _)| VET_CROSSWALK.iter().find(|(c, _)| c == code))
        .map(|(_, translation)| translation.to_string())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Healthcare
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthcareSignals {
    pub certifications: Vec<String>,
    pub emr_systems: Vec<String>,
    pub compliance: Vec<String>,
    pub specialties: Vec<String>,
}

impl HealthcareSignals {
    pub fn detect(text: &str) -> Self {
        Self {
            certifications: found_in(&CERT_PATTERNS, text, MAX_CERTS),
            emr_systems: found_in(&EMR_PATTERNS, text, MAX_EMR),
            compliance: found_in(&COMPLIANCE_PATTERNS, text, MAX_COMPLIANCE),
            specialties: found_in(&SPECIALTY_PATTERNS, text, MAX_SPECIALTIES),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.certifications.is_empty()
            && self.emr_systems.is_empty()
            && self.compliance.is_empty()
            && self.specialties.is_empty()
    }

    /// Entries of `self` that `other` lacks.
    fn without(&self, other: &Self) -> Self {
        let minus = |a: &[String], b: &[String]| -> Vec<String> {
            a.iter().filter(|x| !b.contains(x)).cloned().collect()
        };
        Self {
            certifications: minus(&self.certifications, &other.certifications),
            emr_systems: minus(&self.emr_systems, &other.emr_systems),
            compliance: minus(&self.compliance, &other.compliance),
            specialties: minus(&self.specialties, &other.specialties),
        }
    }
}

/// What the resume shows, and what only the posting asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthcareReport {
    pub in_resume: HealthcareSignals,
    /// Never written onto the resume; listed in the interview guide.
    pub posting_only: HealthcareSignals,
}

pub fn looks_medical(text: &str) -> bool {
    let lower = text.to_lowercase();
    MEDICAL_NEEDLES.iter().any(|n| lower.contains(n))
}

pub fn is_compliance_term(text: &str) -> bool {
    COMPLIANCE_PATTERNS.iter().any(|(_, re)| re.is_match(text))
}

pub fn healthcare_report(resume: &str, posting: &str) -> HealthcareReport {
    let in_resume = HealthcareSignals::detect(resume);
    let posting_only = HealthcareSignals::detect(posting).without(&in_resume);
    HealthcareReport {
        in_resume,
        posting_only,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Applying to the profile
// ────────────────────────────────────────────────────────────────────────────

/// Adds resume-evidenced items the extractor left out of the skills and
/// certifications lists. Returns the healthcare report when it applies.
pub fn enrich_profile(
    profile: &mut ExtractedProfile,
    posting: &str,
    healthcare: bool,
) -> Option<HealthcareReport> {
    let resume = profile.raw_text.clone();
    push_missing(&mut profile.skills, military_translations(&resume));

    if !healthcare {
        return None;
    }
    let report = healthcare_report(&resume, posting);
    let signals = &report.in_resume;
    push_missing(&mut profile.certifications, signals.certifications.clone());
    push_missing(
        &mut profile.skills,
        signals
            .emr_systems
            .iter()
            .chain(&signals.compliance)
            .chain(&signals.specialties)
            .cloned(),
    );
    Some(report)
}

/// Appends items not already mentioned by any existing entry (case-insensitive).
fn push_missing(list: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    let mut seen: HashSet<String> = list.iter().map(|s| s.to_lowercase()).collect();
    for item in items {
        let key = item.to_lowercase();
        let mentioned = list.iter().any(|s| {
            let s = s.to_lowercase();
            s.split(|c: char| !c.is_alphanumeric() && c != '-')
                .any(|w| w == key)
        });
        if !mentioned && seen.insert(key) {
            list.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(raw: &str, skills: &[&str]) -> ExtractedProfile {
        ExtractedProfile {
            raw_text: raw.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_military_codes_need_whole_tokens() {
        assert_eq!(
            military_translations("US Army 68W, 2015-2019; later 3D1 duties"),
            vec![
                "Combat Medic → EMT/Patient Care Tech",
                "Client Systems → IT Support/Helpdesk"
            ]
        );
        assert!(military_translations("Part 111B and X68WZ").is_empty());
    }

    #[test]
    fn test_credentials_are_case_sensitive() {
        let signals = HealthcareSignals::detect("Learned to turn patients. BLS and ACLS current.");
        assert_eq!(signals.certifications, vec!["BLS", "ACLS"]);
        assert!(!signals.certifications.contains(&"RN".to_string()));
    }

    #[test]
    fn test_specialties_match_any_case_and_punctuation() {
        let signals = HealthcareSignals::detect("Floated to labor & delivery and the ICU; charted in Epic.");
        assert_eq!(signals.specialties, vec!["ICU", "Labor & Delivery"]);
        assert_eq!(signals.emr_systems, vec!["Epic"]);
    }

    #[test]
    fn test_posting_only_items_stay_off_the_resume() {
        let mut p = profile("RN, BLS. Charted in Epic on the Telemetry unit.", &["Patient care"]);
        let posting = "Telemetry RN. Cerner experience and HIPAA training required.";
        let report = enrich_profile(&mut p, posting, true).unwrap();

        assert_eq!(p.certifications, vec!["RN", "BLS"]);
        assert_eq!(p.skills, vec!["Patient care", "Epic", "Telemetry"]);
        assert_eq!(report.posting_only.emr_systems, vec!["Cerner"]);
        assert_eq!(report.posting_only.compliance, vec!["HIPAA"]);
        assert!(report.posting_only.certifications.is_empty());
        assert!(!p.skills.iter().any(|s| s == "Cerner"));
    }

    #[test]
    fn test_existing_entries_are_not_repeated() {
        let mut p = profile("Epic charting; BLS", &["Epic EHR", "BLS certified"]);
        p.certifications = vec!["BLS - American Heart Association".into()];
        enrich_profile(&mut p, "", true);
        assert_eq!(p.skills, vec!["Epic EHR", "BLS certified"]);
        assert_eq!(p.certifications, vec!["BLS - American Heart Association"]);
    }

    #[test]
    fn test_non_healthcare_only_adds_military_skills() {
        let mut p = profile("Served as 88M. RN on the side.", &[]);
        assert!(enrich_profile(&mut p, "", false).is_none());
        assert_eq!(p.skills, vec!["Motor Transport → Logistics/Driver Ops"]);
        assert!(p.certifications.is_empty());
    }

    #[test]
    fn test_looks_medical() {
        assert!(looks_medical("Outpatient clinic seeks charge nurse"));
        assert!(!looks_medical("Warehouse associate, forklift required"));
    }
}
