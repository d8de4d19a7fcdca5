use std::path::PathBuf;

use clap::Parser;

use crate::generation::style::StylePack;
use crate::generation::tone::CoverTone;

/// Tailors a resume to a job posting and packages the deliverables.
///
/// With no arguments, resume and job-posting files are auto-detected in the
/// input directory.
#[derive(Debug, Parser)]
#[command(name = "resmaster", version)]
#[command(about = "ATS-safe resume, cover letter and interview guide builder")]
pub struct Cli {
    /// Resume file. Repeat to process several pairs (paired with --job by position).
    #[arg(long)]
    pub resume: Vec<PathBuf>,

    /// Job posting file. Repeat to process several pairs.
    #[arg(long)]
    pub job: Vec<PathBuf>,

    /// Job posting URL, used when no --job file is given.
    #[arg(long)]
    pub job_url: Option<String>,

    /// Directory scanned for uploads when no explicit files are given.
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output folder.
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Style pack(s); comma-separated. Auto-suggested when omitted.
    #[arg(long, value_delimiter = ',', value_enum)]
    pub styles: Vec<StylePack>,

    /// Cover letter tone. Derived from the posting when omitted.
    #[arg(long, value_enum)]
    pub tone: Option<CoverTone>,

    /// Candidate name override.
    #[arg(long)]
    pub name: Option<String>,

    /// Target company override.
    #[arg(long)]
    pub company: Option<String>,

    /// Target role title override.
    #[arg(long)]
    pub title: Option<String>,

    /// Date stamped into file names (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Maximum bullets kept per role.
    #[arg(long)]
    pub max_bullets: Option<usize>,

    /// Rebuild even when an identical run already completed.
    #[arg(long)]
    pub force: bool,

    /// Skip OCR for images and image-only PDFs.
    #[arg(long)]
    pub no_ocr: bool,

    /// Do not emit the metric-first resume variant.
    #[arg(long)]
    pub no_variant_b: bool,

    /// Keep phone and street address in the ATS copy.
    #[arg(long)]
    pub show_contact: bool,

    /// Skip checking that URLs in the inputs resolve.
    #[arg(long)]
    pub no_link_check: bool,

    /// Neither recall nor remember the last style and tone choice.
    #[arg(long)]
    pub no_style_memory: bool,

    /// Check the release feed for a newer version (network; off by default).
    #[arg(long)]
    pub check_updates: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["resmaster"]).unwrap();
        assert!(cli.resume.is_empty());
        assert!(!cli.check_updates);
        assert!(cli.styles.is_empty());
    }

    #[test]
    fn test_styles_are_comma_separated() {
        let cli = Cli::try_parse_from(["resmaster", "--styles", "federal,classic"]).unwrap();
        assert_eq!(cli.styles, vec![StylePack::Federal, StylePack::Classic]);
    }

    #[test]
    fn test_repeated_pairs() {
        let cli = Cli::try_parse_from([
            "resmaster", "--resume", "a.pdf", "--job", "a.txt", "--resume", "b.pdf", "--job",
            "b.txt",
        ])
        .unwrap();
        assert_eq!(cli.resume.len(), 2);
        assert_eq!(cli.job.len(), 2);
    }
}
