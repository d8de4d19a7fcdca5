//! Template assembly: turns the extracted profile, the parsed posting and the
//! selected bullets into block documents for each style pack.
//!
//! Every style produces the same document set: resume, optional metric-first
//! variant B, cover letter, interview guide, ATS text and redline. Federal adds
//! the USAJOBS checklist when the federal gate is on.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::Toggles;
use crate::context::scoring::{compute_jd_relevance, score_bullet, ScoringWeights};
use crate::generation::acronyms::AcronymExpander;
use crate::generation::content_selector::{rank_metric_first, SelectionResult};
use crate::generation::cover_letter::assemble_cover_letter;
use crate::generation::enrich::{is_compliance_term, HealthcareReport};
use crate::generation::fit_scoring::ScoreReport;
use crate::generation::guide::{assemble_interview_guide, assemble_usajobs_checklist};
use crate::generation::jd_parser::JobRequirement;
use crate::generation::redline::assemble_redline;
use crate::generation::risk::RiskReport;
use crate::generation::style::{Section, StylePack};
use crate::generation::terms::tokenize;
use crate::generation::tone::CoverTone;
use crate::models::profile::{ExtractedProfile, HistoryEntry};
use crate::models::resume::{AssembledDocument, Block, DocumentKind};

/// Skills listed on one line, at most.
pub const MAX_SKILLS: usize = 18;
const MAX_HIGHLIGHTS: usize = 3;

const LICENSE_CUES: &[&str] = &[
    "license", "licensed", "rn", "lpn", "bls", "acls", "pals", "cna", "emt", "np", "pa-c",
];
const COMPLIANCE_CUES: &[&str] = &[
    "hipaa", "osha", "compliance", "infection control", "safety", "jcaho", "cpr", "training",
];

static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap());
static RE_STREET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,5}\s+\w+.*?\b(Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct)\b\.?")
        .unwrap()
});

// ────────────────────────────────────────────────────────────────────────────
// Pair context
// ────────────────────────────────────────────────────────────────────────────

/// Everything the assemblers read for one resume/posting pair.
pub struct PairContext<'a> {
    pub profile: &'a ExtractedProfile,
    pub job: &'a JobRequirement,
    pub report: &'a ScoreReport,
    pub risk: &'a RiskReport,
    pub selection: &'a SelectionResult,
    pub healthcare: Option<&'a HealthcareReport>,
    /// Resolved from CLI hints first, then the extracted fields.
    pub candidate: String,
    pub company: String,
    pub title: String,
    pub tone: CoverTone,
}

/// Builds every document for every requested style.
pub fn assemble_all(
    ctx: &PairContext<'_>,
    styles: &[StylePack],
    toggles: &Toggles,
) -> Vec<AssembledDocument> {
    let mut docs = Vec::new();
    for &style in styles {
        let resume = assemble_resume(ctx, style);
        let redline = assemble_redline(&ctx.profile.raw_text, &resume, ctx.job);
        let checklist = (style.is_federal() && toggles.federal_gate)
            .then(|| assemble_usajobs_checklist(ctx, &resume));
        let variant = toggles.variant_b.then(|| assemble_variant_b(ctx, style));

        docs.push(resume);
        docs.extend(variant);
        docs.push(assemble_cover_letter(ctx, style));
        docs.push(assemble_interview_guide(ctx, style));
        docs.push(assemble_ats(ctx, style, toggles.safe_share));
        docs.push(redline);
        docs.extend(checklist);
    }
    debug!("Assembled {} document(s) for {} style(s)", docs.len(), styles.len());
    docs
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

pub fn assemble_resume(ctx: &PairContext<'_>, style: StylePack) -> AssembledDocument {
    let mut doc = resume_document(ctx, style, DocumentKind::Resume, &ctx.selection.roles);
    AcronymExpander::expand_document(&mut doc);
    doc
}

/// Same content, each role's bullets re-ordered metric-first.
pub fn assemble_variant_b(ctx: &PairContext<'_>, style: StylePack) -> AssembledDocument {
    let roles: Vec<HistoryEntry> = ctx
        .selection
        .roles
        .iter()
        .map(|role| HistoryEntry {
            bullets: rank_metric_first(&role.bullets),
            ..role.clone()
        })
        .collect();
    let mut doc = resume_document(ctx, style, DocumentKind::ResumeVariantB, &roles);
    AcronymExpander::expand_document(&mut doc);
    doc
}

/// Plain single-column copy for applicant tracking systems.
pub fn assemble_ats(ctx: &PairContext<'_>, style: StylePack, safe_share: bool) -> AssembledDocument {
    let mut doc = resume_document(ctx, style, DocumentKind::AtsText, &ctx.selection.roles);
    if safe_share {
        if let Some(Block::Paragraph(contact)) = doc
            .blocks
            .iter_mut()
            .find(|b| matches!(b, Block::Paragraph(p) if is_contact_paragraph(p, ctx)))
        {
            *contact = mask_contact(contact);
        }
    }
    doc.blocks.insert(
        0,
        Block::Paragraph(
            "Plain-text copy for applicant tracking systems: single column, no tables or graphics."
                .into(),
        ),
    );
    AcronymExpander::expand_document(&mut doc);
    doc
}

fn is_contact_paragraph(text: &str, ctx: &PairContext<'_>) -> bool {
    !ctx.profile.contact.is_empty() && text == ctx.profile.contact.line()
}

/// Hides phone numbers and street addresses.
pub fn mask_contact(text: &str) -> String {
    let masked = RE_PHONE.replace_all(text, "[phone hidden]");
    RE_STREET.replace_all(&masked, "[street hidden]").into_owned()
}

fn resume_document(
    ctx: &PairContext<'_>,
    style: StylePack,
    kind: DocumentKind,
    roles: &[HistoryEntry],
) -> AssembledDocument {
    let mut doc = AssembledDocument::new(kind, style, format!("{} Resume", ctx.candidate));
    doc.push(Block::Title(ctx.candidate.clone()));
    if !ctx.title.is_empty() {
        doc.push(Block::Subtitle(ctx.title.clone()));
    }
    if !ctx.profile.contact.is_empty() {
        doc.push(Block::Paragraph(ctx.profile.contact.line()));
    }

    for section in style.sections() {
        let body = section_blocks(ctx, *section, roles);
        if body.is_empty() {
            continue;
        }
        doc.push(Block::Heading(section.heading().to_string()));
        doc.blocks.extend(body);
    }
    doc
}

fn section_blocks(ctx: &PairContext<'_>, section: Section, roles: &[HistoryEntry]) -> Vec<Block> {
    let p = ctx.profile;
    match section {
        Section::Summary => summary(p).map(Block::Paragraph).into_iter().collect(),
        Section::Highlights => highlights(roles, &ctx.job.scoring_terms())
            .into_iter()
            .map(Block::Bullet)
            .collect(),
        Section::Skills | Section::TechStack => {
            let skills = ordered_skills(p, ctx.report);
            if skills.is_empty() {
                Vec::new()
            } else {
                vec![Block::Paragraph(skills.join(" | "))]
            }
        }
        Section::Projects => bullets(&p.projects),
        Section::Experience => roles
            .iter()
            .flat_map(|role| {
                std::iter::once(Block::Subheading(role.header()))
                    .chain(role.bullets.iter().cloned().map(Block::Bullet))
            })
            .collect(),
        Section::Education => bullets(&p.education),
        Section::Certifications => bullets(&p.certifications),
        Section::Publications => bullets(&p.publications),
        Section::Licenses => bullets(&licenses(p)),
        Section::Compliance => bullets(&compliance(p)),
        Section::SpecializedAlignment => specialized_alignment(ctx, roles)
            .into_iter()
            .map(Block::Bullet)
            .collect(),
        Section::Awards => bullets(&p.awards),
    }
}

fn bullets(items: &[String]) -> Vec<Block> {
    items.iter().cloned().map(Block::Bullet).collect()
}

/// The resume's own summary, else a line built from the most recent role.
fn summary(profile: &ExtractedProfile) -> Option<String> {
    if let Some(s) = profile.summary.as_ref().filter(|s| !s.trim().is_empty()) {
        return Some(s.clone());
    }
    let recent = profile.history.first()?;
    let mut companies: Vec<&str> = Vec::new();
    for h in &profile.history {
        if !h.company.is_empty() && !companies.contains(&h.company.as_str()) {
            companies.push(&h.company);
        }
    }
    match (recent.title.is_empty(), companies.is_empty()) {
        (true, true) => None,
        (false, true) => Some(format!("{} with hands-on, results-focused experience.", recent.title)),
        (true, false) => Some(format!("Experience at {}.", companies.join(", "))),
        (false, false) => Some(format!(
            "{} with experience at {}.",
            recent.title,
            companies.join(", ")
        )),
    }
}

/// Top bullets across all roles. Ties keep resume order.
fn highlights(roles: &[HistoryEntry], job_terms: &[String]) -> Vec<String> {
    let weights = ScoringWeights::default();
    let mut scored: Vec<(f64, usize, &String)> = roles
        .iter()
        .flat_map(|r| r.bullets.iter())
        .enumerate()
        .map(|(i, b)| (score_bullet(b, job_terms, &weights), i, b))
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });
    scored
        .into_iter()
        .take(MAX_HIGHLIGHTS)
        .map(|(_, _, b)| b.clone())
        .collect()
}

/// Skills the posting asks for come first. Case-insensitive de-duplication.
pub fn ordered_skills(profile: &ExtractedProfile, report: &ScoreReport) -> Vec<String> {
    let matched: HashSet<String> = report
        .matched_terms()
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let mut seen = HashSet::new();
    let unique: Vec<&String> = profile
        .skills
        .iter()
        .filter(|s| seen.insert(s.trim().to_lowercase()))
        .collect();

    let (first, rest): (Vec<&String>, Vec<&String>) = unique
        .into_iter()
        .partition(|s| matched.contains(&s.trim().to_lowercase()));
    first
        .into_iter()
        .chain(rest)
        .take(MAX_SKILLS)
        .cloned()
        .collect()
}

fn has_any_cue(text: &str, cues: &[&str]) -> bool {
    let lower = text.to_lowercase();
    let words = tokenize(&lower);
    cues.iter().any(|cue| {
        if cue.contains(' ') || cue.contains('-') {
            lower.contains(cue)
        } else {
            words.iter().any(|w| w == cue)
        }
    })
}

/// License-like certifications; every certification when none look like one.
fn licenses(profile: &ExtractedProfile) -> Vec<String> {
    let found: Vec<String> = profile
        .certifications
        .iter()
        .filter(|c| has_any_cue(c, LICENSE_CUES))
        .cloned()
        .collect();
    if found.is_empty() {
        profile.certifications.clone()
    } else {
        found
    }
}

fn compliance(profile: &ExtractedProfile) -> Vec<String> {
    let licensed = licenses(profile);
    profile
        .skills
        .iter()
        .chain(profile.certifications.iter())
        .filter(|s| {
            (has_any_cue(s, COMPLIANCE_CUES) || is_compliance_term(s)) && !licensed.contains(s)
        })
        .cloned()
        .collect()
}

/// Each specialized-experience phrase paired with the resume bullet that best
/// supports it. Without such phrases, each matched posting term with its
/// strongest bullet.
fn specialized_alignment(ctx: &PairContext<'_>, roles: &[HistoryEntry]) -> Vec<String> {
    if ctx.job.specialized_experience.is_empty() {
        return ctx
            .report
            .matched_terms()
            .into_iter()
            .filter_map(|term| {
                best_evidence(term, roles).map(|bullet| format!("{term}: {bullet}"))
            })
            .collect();
    }

    ctx.job
        .specialized_experience
        .iter()
        .map(|phrase| match best_evidence(phrase, roles) {
            Some(bullet) => format!("{phrase}: {bullet}"),
            None => format!("{phrase}: no matching example yet"),
        })
        .collect()
}

/// The bullet touching the most content words of `phrase`. Ties keep the
/// earlier bullet.
pub fn best_evidence<'a>(phrase: &str, roles: &'a [HistoryEntry]) -> Option<&'a String> {
    let terms: Vec<String> = tokenize(phrase)
        .into_iter()
        .filter(|t| t.len() > 3 || phrase.split_whitespace().count() == 1)
        .collect();
    roles
        .iter()
        .flat_map(|r| r.bullets.iter())
        .map(|b| (compute_jd_relevance(b, &terms), b))
        .filter(|(score, _)| *score > 0.0)
        .fold(None::<(f64, &String)>, |best, cur| match best {
            Some(b) if b.0 >= cur.0 => Some(b),
            _ => Some(cur),
        })
        .map(|(_, b)| b)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::context::profile::extract_profile;
    use crate::generation::content_selector::select_content;
    use crate::generation::fit_scoring::compute_keyword_fit;
    use crate::generation::jd_parser::parse_job;
    use crate::generation::risk::assess;

    pub const RESUME: &str = "Jane Doe\n\
jane@example.com | 303-555-0142 | 12 Oak St | Denver, CO\n\
\n\
Summary\n\
Operations lead focused on inventory accuracy.\n\
\n\
Experience\n\
Shift Supervisor — Acme Freight (03/2019 – 06/2022)\n\
• Managed a team of 5 and increased sales 20%\n\
• Helped with scheduling\n\
• Cut shrink 12% by auditing ATS reports\n\
Stock Associate | Beta Mart | 2016 – 2019\n\
• Stocked shelves\n\
\n\
Skills\n\
Excel, Forklift, Leadership, HIPAA training\n\
\n\
Education\n\
A.A.S., Logistics\n";

    pub const POSTING: &str = "Job Title: Operations Manager\n\
Company: Northwind\n\
Requirements: leadership, sales, inventory\n\
We are a collaborative team.\n\
You will lead daily operations and own inventory accuracy.\n\
Experience with scheduling required.\n";

    pub struct Fixture {
        pub profile: ExtractedProfile,
        pub job: JobRequirement,
        pub report: ScoreReport,
        pub risk: RiskReport,
        pub selection: SelectionResult,
        pub healthcare: Option<HealthcareReport>,
    }

    impl Fixture {
        pub fn new(resume: &str, posting: &str) -> Self {
            let profile = extract_profile(resume).unwrap();
            let job = parse_job(posting, None).unwrap();
            let report = compute_keyword_fit(&profile, &job);
            let risk = assess(posting, None);
            let selection = select_content(&profile.history, &job.scoring_terms(), 6, 95);
            Self {
                profile,
                job,
                report,
                risk,
                selection,
                healthcare: None,
            }
        }

        pub fn standard() -> Self {
            Self::new(RESUME, POSTING)
        }

        pub fn ctx(&self) -> PairContext<'_> {
            PairContext {
                profile: &self.profile,
                job: &self.job,
                report: &self.report,
                risk: &self.risk,
                selection: &self.selection,
                healthcare: self.healthcare.as_ref(),
                candidate: "Jane Doe".into(),
                company: "Northwind".into(),
                title: "Operations Manager".into(),
                tone: CoverTone::Professional,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Fixture;
    use super::*;

    fn headings(doc: &AssembledDocument) -> Vec<&str> {
        doc.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_resume_follows_style_section_order() {
        let fx = Fixture::standard();
        let doc = assemble_resume(&fx.ctx(), StylePack::Classic);
        assert_eq!(doc.kind, DocumentKind::Resume);
        assert_eq!(headings(&doc), vec!["Summary", "Skills", "Experience", "Education"]);
        assert_eq!(doc.blocks[0], Block::Title("Jane Doe".into()));
    }

    #[test]
    fn test_resume_expands_acronyms_once() {
        let fx = Fixture::standard();
        let text = assemble_resume(&fx.ctx(), StylePack::Classic).to_plain_text();
        assert!(text.contains("Applicant Tracking System (ATS) reports"));
    }

    #[test]
    fn test_ats_copy_masks_phone_and_street() {
        let fx = Fixture::standard();
        let text = assemble_ats(&fx.ctx(), StylePack::Classic, true).to_plain_text();
        assert!(text.starts_with("Plain-text copy"));
        assert!(text.contains("[phone hidden]"));
        assert!(text.contains("[street hidden]"));
        assert!(!text.contains("303-555-0142"));

        let open = assemble_ats(&fx.ctx(), StylePack::Classic, false).to_plain_text();
        assert!(open.contains("303-555-0142"));
    }

    #[test]
    fn test_mask_contact_patterns() {
        assert_eq!(
            mask_contact("call 555.123.4567 or visit 1200 Grant Blvd"),
            "call [phone hidden] or visit [street hidden]"
        );
        assert_eq!(mask_contact("jane@example.com"), "jane@example.com");
    }

    #[test]
    fn test_variant_b_puts_metrics_first() {
        let fx = Fixture::standard();
        let doc = assemble_variant_b(&fx.ctx(), StylePack::Classic);
        let sections = doc.bullets_by_section();
        let (_, first_role) = sections
            .iter()
            .find(|(h, _)| h.starts_with("Shift Supervisor"))
            .unwrap();
        assert!(first_role[0].contains('%'));
        assert_eq!(first_role.last().unwrap(), "Helped with scheduling");
    }

    #[test]
    fn test_matched_skills_lead() {
        let fx = Fixture::standard();
        let skills = ordered_skills(&fx.profile, &fx.report);
        assert_eq!(skills[0], "Leadership");
        assert!(skills.len() <= MAX_SKILLS);
    }

    #[test]
    fn test_healthcare_sections() {
        let fx = Fixture::standard();
        let doc = assemble_resume(&fx.ctx(), StylePack::Healthcare);
        assert!(headings(&doc).contains(&"Compliance & Training"));
    }

    #[test]
    fn test_regulatory_terms_count_as_compliance() {
        let mut fx = Fixture::standard();
        fx.profile.skills.push("IRB submissions".into());
        let doc = assemble_resume(&fx.ctx(), StylePack::Healthcare);
        let at = doc
            .blocks
            .iter()
            .position(|b| *b == Block::Heading("Compliance & Training".into()))
            .unwrap();
        assert!(doc.blocks[at + 1..]
            .iter()
            .take_while(|b| matches!(b, Block::Bullet(_)))
            .any(|b| b.text() == "IRB submissions"));
    }

    #[test]
    fn test_assemble_all_document_set() {
        let fx = Fixture::standard();
        let toggles = Toggles::default();
        let docs = assemble_all(&fx.ctx(), &[StylePack::Classic, StylePack::Federal], &toggles);
        let kinds: Vec<DocumentKind> = docs.iter().map(|d| d.kind).collect();
        assert_eq!(
            &kinds[..6],
            &[
                DocumentKind::Resume,
                DocumentKind::ResumeVariantB,
                DocumentKind::CoverLetter,
                DocumentKind::InterviewGuide,
                DocumentKind::AtsText,
                DocumentKind::Redline,
            ]
        );
        assert_eq!(kinds.len(), 13);
        assert!(docs
            .iter()
            .any(|d| d.kind == DocumentKind::UsajobsChecklist && d.style == StylePack::Federal));

        let off = Toggles {
            variant_b: false,
            ..Toggles::default()
        };
        let docs = assemble_all(&fx.ctx(), &[StylePack::Classic], &off);
        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0].kind, DocumentKind::Resume);
    }
}
