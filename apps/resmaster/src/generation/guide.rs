//! Interview guide and the USAJOBS readiness checklist.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::validation::{is_quantified, IssueKind};
use crate::generation::assemble::{best_evidence, PairContext};
use crate::generation::style::StylePack;
use crate::generation::tone::get_tone_examples;
use crate::models::resume::{AssembledDocument, Block, DocumentKind};

const TOP_KEYWORDS: usize = 5;
const EVIDENCE_BULLETS: usize = 2;
const MAX_FIXES: usize = 8;

static RE_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{4}\b").unwrap());
static RE_HOURS_WEEK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}|40)\s*(hours|hrs)\s*/\s*week\b").unwrap()
});

// ────────────────────────────────────────────────────────────────────────────
// Interview guide
// ────────────────────────────────────────────────────────────────────────────

pub fn assemble_interview_guide(ctx: &PairContext<'_>, style: StylePack) -> AssembledDocument {
    let report = ctx.report;
    let mut doc = AssembledDocument::new(DocumentKind::InterviewGuide, style, "Interview Guide");
    doc.push(Block::Title("Interview Guide".into()));
    doc.push(Block::Subtitle(format!(
        "Role: {} | Company: {}",
        ctx.title, ctx.company
    )));

    doc.push(Block::Heading("Scores".into()));
    doc.push(Block::Paragraph(format!(
        "Grade {} | Match {}% | Scan {} | Hire {}%",
        report.grade, report.coverage, report.scan_health, report.hire_likelihood
    )));
    doc.push(Block::Paragraph(report.recommendation.clone()));

    doc.push(Block::Heading("What to Know".into()));
    doc.push(Block::Paragraph(
        "Target these keywords from the posting in your answers:".into(),
    ));
    for keyword in top_keywords(ctx) {
        doc.push(Block::Bullet(keyword));
    }

    let evidence: Vec<&String> = ctx
        .selection
        .roles
        .iter()
        .flat_map(|r| r.bullets.iter())
        .filter(|b| is_quantified(b))
        .take(EVIDENCE_BULLETS)
        .collect();
    if evidence.is_empty() {
        doc.push(Block::Paragraph(
            "No quantified results found. Prepare two numbers (volume, savings, time saved) before the interview."
                .into(),
        ));
    } else {
        doc.push(Block::Paragraph("Bring these metrics:".into()));
        for b in &evidence {
            doc.push(Block::Bullet((*b).clone()));
        }
    }

    if !report.gaps.is_empty() {
        doc.push(Block::Heading("Gaps to Prepare For".into()));
        for gap in &report.gaps {
            let advice = gap
                .suggestion
                .as_deref()
                .unwrap_or("Prepare an honest example of adjacent experience.");
            doc.push(Block::Bullet(format!("{}: {advice}", gap.term)));
        }
    }

    if !report.issues.is_empty() {
        let verbs = get_tone_examples(&ctx.job.detected_tone).strong_verbs.join(", ");
        doc.push(Block::Heading("Bullet Fixes".into()));
        for issue in report.issues.iter().take(MAX_FIXES) {
            let mut line = format!("\"{}\": {} {}", issue.bullet, issue.reason, issue.suggestion);
            if issue.kind == IssueKind::VagueVerb {
                line.push_str(&format!(" Try: {verbs}."));
            }
            doc.push(Block::Bullet(line));
        }
    }

    doc.push(Block::Heading("STAR Prompts".into()));
    if evidence.is_empty() {
        star_prompt(&mut doc, "a result you are proud of");
    } else {
        for b in &evidence {
            star_prompt(&mut doc, b);
        }
    }

    let prep = healthcare_prep(ctx);
    if !prep.is_empty() {
        doc.push(Block::Heading("Healthcare Prep".into()));
        doc.blocks.extend(prep.into_iter().map(Block::Bullet));
    }

    let notes = posting_notes(ctx);
    if !notes.is_empty() {
        doc.push(Block::Heading("Posting Checks".into()));
        doc.blocks.extend(notes.into_iter().map(Block::Bullet));
    }
    doc
}

fn top_keywords(ctx: &PairContext<'_>) -> Vec<String> {
    let from_inventory: Vec<String> = ctx
        .job
        .keyword_inventory
        .iter()
        .take(TOP_KEYWORDS)
        .map(|k| k.keyword.clone())
        .collect();
    if from_inventory.is_empty() {
        ctx.job.scoring_terms().into_iter().take(TOP_KEYWORDS).collect()
    } else {
        from_inventory
    }
}

fn star_prompt(doc: &mut AssembledDocument, anchor: &str) {
    doc.push(Block::Subheading(format!("Story: {anchor}")));
    doc.push(Block::Bullet("S: Where were you and what was at stake?".into()));
    doc.push(Block::Bullet("T: What were you asked to change, and by when?".into()));
    doc.push(Block::Bullet("A: Which steps did you personally take?".into()));
    doc.push(Block::Bullet("R: Which number proves it worked?".into()));
}

/// Credentials and systems the posting names that the resume does not show.
/// They stay off the resume; the candidate prepares an honest answer instead.
fn healthcare_prep(ctx: &PairContext<'_>) -> Vec<String> {
    let Some(report) = ctx.healthcare else {
        return Vec::new();
    };
    let gaps = &report.posting_only;
    let mut lines = Vec::new();
    for (label, items) in [
        ("Credentials", &gaps.certifications),
        ("EMR systems", &gaps.emr_systems),
        ("Compliance", &gaps.compliance),
        ("Specialties", &gaps.specialties),
    ] {
        if !items.is_empty() {
            lines.push(format!(
                "{label} in the posting but not on your resume: {}. Be ready to describe adjacent experience or training plans.",
                items.join(", ")
            ));
        }
    }
    if !report.in_resume.emr_systems.is_empty() {
        lines.push(format!(
            "Have a charting example ready for {}.",
            report.in_resume.emr_systems.join(", ")
        ));
    }
    lines
}

fn posting_notes(ctx: &PairContext<'_>) -> Vec<String> {
    let mut notes: Vec<String> = ctx
        .risk
        .scam_flags
        .iter()
        .map(|f| format!("Caution: {}", f.describe()))
        .collect();
    if ctx.risk.reposted_listing {
        notes.push(
            "This listing comes from a reposting site. Confirm it on the employer's own careers page."
                .into(),
        );
    }
    if let Some(nudge) = &ctx.risk.salary_nudge {
        notes.push(nudge.clone());
    }
    if let Some(note) = &ctx.job.closing_note {
        notes.push(note.clone());
    }
    if ctx.job.has_cutoff {
        notes.push("Cut-off posting: apply early.".into());
    }
    notes
}

// ────────────────────────────────────────────────────────────────────────────
// USAJOBS checklist
// ────────────────────────────────────────────────────────────────────────────

/// Fields a federal resume must show on every role.
pub fn federal_missing_fields(resume_text: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !RE_MONTH_YEAR.is_match(resume_text) {
        missing.push("Add Month/Year dates for each role.");
    }
    if !RE_HOURS_WEEK.is_match(resume_text) {
        missing.push("Add Hours/Week for each role.");
    }
    missing
}

pub fn readiness_badge(missing: &[&str]) -> String {
    if missing.is_empty() {
        "Ready for USAJOBS? ✓".to_string()
    } else {
        format!("Ready for USAJOBS? ✗ — {}", missing.join("; "))
    }
}

pub fn assemble_usajobs_checklist(
    ctx: &PairContext<'_>,
    resume: &AssembledDocument,
) -> AssembledDocument {
    let missing = federal_missing_fields(&resume.to_plain_text());
    let mut doc = AssembledDocument::new(
        DocumentKind::UsajobsChecklist,
        resume.style,
        "USAJOBS Checklist",
    );
    doc.push(Block::Title("USAJOBS Checklist".into()));
    doc.push(Block::Subtitle(format!(
        "Role: {} | Agency: {}",
        ctx.title, ctx.company
    )));
    doc.push(Block::Bullet(readiness_badge(&missing)));
    if let Some(note) = &ctx.job.closing_note {
        doc.push(Block::Bullet(note.clone()));
    }
    if ctx.job.has_cutoff {
        doc.push(Block::Bullet("Cut-off posting: Yes".into()));
    }

    if !ctx.job.specialized_experience.is_empty() {
        doc.push(Block::Heading("Specialized Experience".into()));
        for phrase in &ctx.job.specialized_experience {
            let line = match best_evidence(phrase, &ctx.selection.roles) {
                Some(bullet) => format!("✓ {phrase} (shown by: {bullet})"),
                None => format!("✗ {phrase} (add a role bullet that shows this)"),
            };
            doc.push(Block::Bullet(line));
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::assemble::assemble_resume;
    use crate::generation::assemble::test_support::{Fixture, RESUME};
    use crate::generation::enrich::healthcare_report;

    fn text(doc: &AssembledDocument) -> String {
        doc.to_plain_text()
    }

    #[test]
    fn test_guide_header_and_scores() {
        let fx = Fixture::standard();
        let doc = assemble_interview_guide(&fx.ctx(), StylePack::Classic);
        let t = text(&doc);
        assert!(t.starts_with("Interview Guide\nRole: Operations Manager | Company: Northwind\n"));
        assert!(t.contains(&format!(
            "Grade {} | Match {}% | Scan {} | Hire {}%",
            fx.report.grade, fx.report.coverage, fx.report.scan_health, fx.report.hire_likelihood
        )));
        assert!(t.contains("STAR PROMPTS"));
        assert!(t.contains("• Managed a team of 5 and increased sales 20%"));
    }

    #[test]
    fn test_vague_verbs_get_tone_rewrites() {
        let fx = Fixture::standard();
        let t = text(&assemble_interview_guide(&fx.ctx(), StylePack::Classic));
        assert!(t.contains("BULLET FIXES"));
        assert!(t.contains("\"Helped with scheduling\""));
        assert!(t.contains("Try: Partnered with"));
    }

    #[test]
    fn test_risk_flags_surface_in_guide() {
        let posting = "Job Title: Clerk\nCompany: Quickcash\nInterview on Telegram chat only. Pay the training fee before you start.\nApplications close at 11:59 p.m. Eastern.";
        let fx = Fixture::new(RESUME, posting);
        let t = text(&assemble_interview_guide(&fx.ctx(), StylePack::Classic));
        assert!(t.contains("POSTING CHECKS"));
        assert!(t.contains("Caution: Interview happens only over Telegram or WhatsApp."));
    }

    #[test]
    fn test_healthcare_gaps_go_to_guide() {
        let resume = format!("{RESUME}\nCertifications\nBLS\nCharted in Epic daily.\n");
        let posting = "Job Title: Telemetry RN\nCompany: Mercy\nRN license, BLS and Cerner experience required.";
        let mut fx = Fixture::new(&resume, posting);
        fx.healthcare = Some(healthcare_report(&resume, posting));
        let t = text(&assemble_interview_guide(&fx.ctx(), StylePack::Healthcare));

        assert!(t.contains("HEALTHCARE PREP"));
        assert!(t.contains("Credentials in the posting but not on your resume: RN."));
        assert!(t.contains("EMR systems in the posting but not on your resume: Cerner."));
        assert!(t.contains("Specialties in the posting but not on your resume: Telemetry."));
        assert!(t.contains("Have a charting example ready for Epic."));
    }

    #[test]
    fn test_no_healthcare_section_without_report() {
        let fx = Fixture::standard();
        let t = text(&assemble_interview_guide(&fx.ctx(), StylePack::Classic));
        assert!(!t.contains("HEALTHCARE PREP"));
    }

    #[test]
    fn test_federal_missing_fields() {
        assert_eq!(
            federal_missing_fields("Analyst (2019 – 2021)"),
            vec!["Add Month/Year dates for each role.", "Add Hours/Week for each role."]
        );
        assert!(federal_missing_fields("Analyst 03/2019 – 06/2021, 40 hours/week").is_empty());
        assert_eq!(
            federal_missing_fields("Clerk 01/2020 – 02/2021"),
            vec!["Add Hours/Week for each role."]
        );
    }

    #[test]
    fn test_badge_text() {
        assert_eq!(readiness_badge(&[]), "Ready for USAJOBS? ✓");
        assert_eq!(
            readiness_badge(&["Add Hours/Week for each role."]),
            "Ready for USAJOBS? ✗ — Add Hours/Week for each role."
        );
    }

    #[test]
    fn test_checklist_reflects_federal_resume() {
        let posting = "Job Title: Program Analyst\nCompany: Department of Energy\nSpecialized experience: managing inventory programs.\nThis announcement closes at 11:59 p.m. Eastern. Cut-off: first 100 applicants.";
        let fx = Fixture::new(RESUME, posting);
        let ctx = fx.ctx();
        let resume = assemble_resume(&ctx, StylePack::Federal);
        let doc = assemble_usajobs_checklist(&ctx, &resume);
        assert_eq!(doc.kind, DocumentKind::UsajobsChecklist);
        assert_eq!(doc.style, StylePack::Federal);
        let t = text(&doc);
        // Month/year dates are present, hours per week are not.
        assert!(t.contains("Ready for USAJOBS? ✗ — Add Hours/Week for each role."));
        assert!(t.contains("Cut-off posting: Yes"));
    }
}
