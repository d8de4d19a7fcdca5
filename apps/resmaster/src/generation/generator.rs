//! Pipeline orchestration: one sequential pass per resume/job pair.
//!
//! Flow: load → normalize → extract → score → assess risk → pick styles →
//!       select bullets → assemble → write (fallback chain) → package.
//!
//! A pair that fails is recorded in the manifest and the batch moves on. Only
//! internal errors stop the batch.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::cache::{signature, SignatureInputs, SignaturePerson};
use crate::config::Config;
use crate::context::discovery::{InputPair, InputRef};
use crate::context::ingest::{fetch_document, load_document, NormalizedText};
use crate::context::profile::extract_profile;
use crate::context::validation::IssueKind;
use crate::errors::{AppError, Warning};
use crate::generation::assemble::{assemble_all, PairContext};
use crate::generation::content_selector::select_content;
use crate::generation::enrich::{enrich_profile, looks_medical};
use crate::generation::jd_parser::{parse_job, JobRequirement};
use crate::generation::links::broken_links;
use crate::generation::risk::assess;
use crate::generation::style::{suggest_style, StylePack};
use crate::generation::tone::CoverTone;
use crate::models::profile::{split_name, ExtractedProfile};
use crate::models::resume::OutputFile;
use crate::package::bundle::build_archive;
use crate::package::manifest::{Manifest, PairEntry, PairError, PairStatus};
use crate::package::naming::{archive_name, document_stem, NameParts};
use crate::state::RunContext;

const FALLBACK_CANDIDATE: &str = "Candidate";

// ────────────────────────────────────────────────────────────────────────────
// Batch
// ────────────────────────────────────────────────────────────────────────────

/// Processes every pair in order and returns the manifest (not yet written).
pub async fn run_batch(ctx: &RunContext, pairs: &[InputPair]) -> Manifest {
    let mut manifest = Manifest::new(ctx.config.run_date);

    for pair in pairs {
        info!("Processing {}", pair.label);
        match process_pair(ctx, pair).await {
            Ok(entry) => manifest.pairs.push(entry),
            Err(e) => {
                let fatal = !e.is_pair_local();
                warn!("{} failed [{}]: {e}", pair.label, e.code());
                manifest.pairs.push(PairEntry::failed(
                    &pair.label,
                    pair.resume.as_ref().map(InputRef::display),
                    pair.job.as_ref().map(InputRef::display),
                    &e,
                ));
                if fatal {
                    error!("Stopping the batch after an internal error");
                    break;
                }
            }
        }
    }
    manifest
}

// ────────────────────────────────────────────────────────────────────────────
// One pair
// ────────────────────────────────────────────────────────────────────────────

/// Options that shape the output; hashed into the build signature.
#[derive(Debug, Serialize)]
struct Selection<'a> {
    styles: &'a [StylePack],
    tone: Option<CoverTone>,
    max_bullets: usize,
    chars_per_line: usize,
    run_date: String,
    output_dir: String,
    ocr: bool,
    variant_b: bool,
    federal_gate: bool,
    safe_share: bool,
    link_check: bool,
}

pub async fn process_pair(ctx: &RunContext, pair: &InputPair) -> Result<PairEntry, AppError> {
    let config = &ctx.config;
    let mut warnings = Vec::new();

    let resume = read_side(ctx, pair.resume.as_ref()).await?;
    let posting = read_side(ctx, pair.job.as_ref()).await?;
    if resume.is_empty() && posting.is_empty() {
        return Err(AppError::EmptyInput(
            "the resume and the job posting are both empty; nothing to tailor".into(),
        ));
    }
    if !resume.confident {
        warn!("{}: resume text may be incomplete; output is best effort", pair.label);
    }
    warnings.extend(resume.warnings.iter().cloned());
    warnings.extend(posting.warnings.iter().cloned());

    let resume_label = side_label(pair.resume.as_ref(), "resume");
    let job_label = side_label(pair.job.as_ref(), "job posting");
    let source_url = posting.source_url.as_deref();

    let mut profile = if resume.is_empty() {
        warnings.push(Warning::EmptyExtraction {
            document: resume_label.clone(),
        });
        ExtractedProfile::default()
    } else {
        extract_profile(&resume.text)?
    };
    let job = if posting.is_empty() {
        warnings.push(Warning::EmptyExtraction {
            document: job_label.clone(),
        });
        JobRequirement {
            source_url: source_url.map(str::to_string),
            ..Default::default()
        }
    } else {
        parse_job(&posting.text, source_url)?
    };

    let candidate = resolve(config.name_hint.as_deref(), &profile.name, FALLBACK_CANDIDATE);
    let company = resolve(config.company_hint.as_deref(), &job.company, "");
    let title = resolve(config.title_hint.as_deref(), &job.title, "");
    let (first, last) = split_name(&candidate);
    let parts = NameParts {
        first,
        last,
        company: company.clone(),
        title: title.clone(),
    };

    let (styles, style_suggestion) = if config.styles.is_empty() {
        let suggestion = suggest_style(&resume.text, &posting.text);
        info!(
            "Suggested style {:?} ({:.0}% confidence)",
            suggestion.suggested,
            suggestion.confidence * 100.0
        );
        (vec![suggestion.suggested], Some(suggestion))
    } else {
        (config.styles.clone(), None)
    };

    let sig = build_signature(config, &resume.text, &posting.text, &parts, &candidate, &styles)?;
    if config.toggles.idempotent && !config.force {
        if let Some(entry) = ctx.cache.lookup(&sig).await {
            info!("{}: already up to date, skipping rebuild", pair.label);
            return Ok(entry);
        }
    }

    let healthcare_target =
        styles.contains(&StylePack::Healthcare) || looks_medical(&posting.text);
    let healthcare = enrich_profile(&mut profile, &posting.text, healthcare_target);

    let report = ctx.fit_scorer.score(&profile, &job).await?;
    let risk = assess(&posting.text, source_url);
    let selection = select_content(
        &profile.history,
        &job.scoring_terms(),
        config.max_bullets_per_role,
        config.chars_per_line,
    );
    info!(
        "{}: coverage {}% (grade {}), {} bullet(s) excluded, {} clamped",
        pair.label,
        report.coverage,
        report.grade,
        selection.excluded.len(),
        selection.clamped
    );
    if !risk.is_clear() {
        warn!(
            "{}: posting raised {} scam flag(s), reposted: {}",
            pair.label,
            risk.scam_flags.len(),
            risk.reposted_listing
        );
    }

    let tone = config
        .tone
        .unwrap_or_else(|| CoverTone::from_posting(&job.detected_tone));
    let pair_ctx = PairContext {
        profile: &profile,
        job: &job,
        report: &report,
        risk: &risk,
        selection: &selection,
        healthcare: healthcare.as_ref(),
        candidate: candidate.clone(),
        company: company.clone(),
        title: title.clone(),
        tone,
    };
    let documents = assemble_all(&pair_ctx, &styles, &config.toggles);

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let mut files = Vec::with_capacity(documents.len());
    for doc in &documents {
        let stem = document_stem(&parts, doc.style, config.run_date, doc.kind);
        let (file, writer_warnings) = ctx
            .writers
            .write_with_fallback(doc, &config.output_dir, &stem)
            .await?;
        warnings.extend(writer_warnings);
        files.push(file);
    }

    if config.toggles.link_check {
        let bad = broken_links(&ctx.http, &[&resume.text, &posting.text]).await;
        warnings.extend(bad.into_iter().map(|url| Warning::BrokenLink { url }));
    }

    let (archive, packaging_error) = package(config, &parts, styles[0], &files).await;

    let entry = PairEntry {
        label: pair.label.clone(),
        resume: pair.resume.as_ref().map(InputRef::display),
        job: pair.job.as_ref().map(InputRef::display),
        status: PairStatus::Completed,
        candidate,
        company,
        title,
        styles,
        style_suggestion,
        score: Some(report),
        risk: Some(risk),
        healthcare,
        files,
        archive,
        warnings,
        error: packaging_error,
        signature: Some(sig.clone()),
    };

    // A build with a packaging failure is retried next run.
    if config.toggles.idempotent && entry.error.is_none() {
        if let Err(e) = ctx.cache.record(&sig, &entry).await {
            warn!("Could not record build {sig}: {e}");
        }
    }
    Ok(entry)
}

async fn read_side(ctx: &RunContext, input: Option<&InputRef>) -> Result<NormalizedText, AppError> {
    let doc = match input {
        None => return Ok(NormalizedText::default()),
        Some(InputRef::Path(path)) => load_document(path).await?,
        Some(InputRef::Url(url)) => fetch_document(&ctx.http, url).await?,
    };
    ctx.normalizer.normalize(&doc).await
}

fn side_label(input: Option<&InputRef>, fallback: &str) -> String {
    input.map(InputRef::display).unwrap_or_else(|| fallback.to_string())
}

/// Hint, then extracted value, then fallback; trimmed.
fn resolve(hint: Option<&str>, extracted: &str, fallback: &str) -> String {
    hint.map(str::trim)
        .filter(|h| !h.is_empty())
        .or(Some(extracted.trim()).filter(|e| !e.is_empty()))
        .unwrap_or(fallback)
        .to_string()
}

fn build_signature(
    config: &Config,
    resume: &str,
    posting: &str,
    parts: &NameParts,
    candidate: &str,
    styles: &[StylePack],
) -> Result<String, AppError> {
    signature(&SignatureInputs {
        resume,
        jd: posting,
        person: SignaturePerson {
            name: candidate,
            company: &parts.company,
            title: &parts.title,
        },
        selection: Selection {
            styles,
            tone: config.tone,
            max_bullets: config.max_bullets_per_role,
            chars_per_line: config.chars_per_line,
            run_date: config.run_date.to_string(),
            output_dir: config.output_dir.display().to_string(),
            ocr: config.toggles.ocr,
            variant_b: config.toggles.variant_b,
            federal_gate: config.toggles.federal_gate,
            safe_share: config.toggles.safe_share,
            link_check: config.toggles.link_check,
        },
    })
}

/// Builds the delivery archive. A failure leaves the individual files in
/// place and is reported on the pair instead of failing it.
async fn package(
    config: &Config,
    parts: &NameParts,
    style: StylePack,
    files: &[OutputFile],
) -> (Option<PathBuf>, Option<PairError>) {
    let dest = config
        .output_dir
        .join(archive_name(parts, style, config.run_date));
    match build_archive(&dest, files).await {
        Ok(path) => (Some(path), None),
        Err(e) => {
            warn!("Packaging failed, individual files kept: {e}");
            (None, Some(PairError::from(&e)))
        }
    }
}

/// Human-readable completion summary, one block per pair.
pub fn summary(manifest: &Manifest, output_dir: &Path) -> String {
    let mut out = String::new();
    for pair in &manifest.pairs {
        match pair.status {
            PairStatus::Failed => {
                let reason = pair
                    .error
                    .as_ref()
                    .map(|e| format!("{} ({})", e.message, e.code))
                    .unwrap_or_default();
                out.push_str(&format!("✗ {}: {reason}\n", pair.label));
                continue;
            }
            PairStatus::Cached => {
                out.push_str(&format!("= {}: already up to date\n", pair.label));
            }
            PairStatus::Completed => {
                out.push_str(&format!("✓ {}\n", pair.label));
            }
        }
        out.push_str(&format!(
            "  {} targeting {} @ {}\n",
            pair.candidate,
            or_placeholder(&pair.title, "[role]"),
            or_placeholder(&pair.company, "[company]")
        ));
        if let Some(score) = &pair.score {
            out.push_str(&format!(
                "  Match {}% | Scan {} | Hire {}% | Grade {}\n",
                score.coverage, score.scan_health, score.hire_likelihood, score.grade
            ));
            let missing = score.missing_terms();
            if !missing.is_empty() {
                out.push_str(&format!("  Missing terms: {}\n", missing.join(", ")));
            }
            let metrics = score.issue_count(IssueKind::MissingMetric);
            if metrics > 0 {
                out.push_str(&format!("  Bullets without a metric: {metrics}\n"));
            }
        }
        for file in &pair.files {
            let shown = file.path.strip_prefix(output_dir).unwrap_or(&file.path);
            let note = if file.used_fallback() {
                format!(" (fallback from {})", file.requested.extension())
            } else {
                String::new()
            };
            out.push_str(&format!("  • {}{note}\n", shown.display()));
        }
        if let Some(archive) = &pair.archive {
            let shown = archive.strip_prefix(output_dir).unwrap_or(archive);
            out.push_str(&format!("  • {}\n", shown.display()));
        }
        if let Some(err) = &pair.error {
            out.push_str(&format!("  ! {} ({})\n", err.message, err.code));
        }
        for w in &pair.warnings {
            match w {
                Warning::LowConfidenceExtraction { document, reason } => {
                    out.push_str(&format!("  ! {document}: {reason}\n"));
                }
                Warning::BrokenLink { url } => {
                    out.push_str(&format!("  ! link did not resolve: {url}\n"));
                }
                _ => {}
            }
        }
    }
    out
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
