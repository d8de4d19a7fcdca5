use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::cli::Cli;
use crate::generation::style::StylePack;
use crate::generation::tone::CoverTone;

const DEFAULT_UPDATE_FEED: &str =
    "https://api.github.com/repos/resmaster/resmaster/releases/latest";

/// Feature toggles. All default ON except where noted.
#[derive(Debug, Clone)]
pub struct Toggles {
    /// OCR screenshots and image-only uploads when an engine is present.
    pub ocr: bool,
    /// Emit a metric-first resume variant alongside the primary resume.
    pub variant_b: bool,
    /// USAJOBS readiness badge and checklist for the Federal style.
    pub federal_gate: bool,
    /// Hide phone numbers and street addresses in the ATS copy.
    pub safe_share: bool,
    /// Skip regeneration when inputs and options are unchanged.
    pub idempotent: bool,
    /// Warn about URLs in the inputs that do not resolve.
    pub link_check: bool,
    /// Reuse the last explicit style and tone when a run names none.
    pub style_memory: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            ocr: true,
            variant_b: true,
            federal_gate: true,
            safe_share: true,
            idempotent: true,
            link_check: true,
            style_memory: true,
        }
    }
}

/// Run configuration: environment first, then CLI overrides.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub update_feed_url: String,
    pub max_bullets_per_role: usize,
    pub chars_per_line: usize,
    pub tesseract_path: String,
    pub typst_path: String,
    pub pandoc_path: String,
    pub rust_log: String,
    pub toggles: Toggles,
    /// Date stamped into file names. Defaults to today (local time).
    pub run_date: NaiveDate,
    /// Explicit style packs; empty means auto-suggest.
    pub styles: Vec<StylePack>,
    pub tone: Option<CoverTone>,
    pub name_hint: Option<String>,
    pub company_hint: Option<String>,
    pub title_hint: Option<String>,
    pub force: bool,
    pub check_updates: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let defaults = Toggles::default();
        Config {
            input_dir: PathBuf::from(text("RESMASTER_INPUT_DIR", "./inputs")),
            output_dir: PathBuf::from(text("RESMASTER_OUTPUT_DIR", "./out")),
            cache_dir: PathBuf::from(text("RESMASTER_CACHE_DIR", "./.resmaster_cache")),
            update_feed_url: text("RESMASTER_UPDATE_FEED", DEFAULT_UPDATE_FEED),
            max_bullets_per_role: lookup_parse(&get, "RESMASTER_MAX_BULLETS", 6)?,
            chars_per_line: lookup_parse(&get, "RESMASTER_CHARS_PER_LINE", 95)?,
            tesseract_path: text("TESSERACT_PATH", "tesseract"),
            typst_path: text("TYPST_PATH", "typst"),
            pandoc_path: text("PANDOC_PATH", "pandoc"),
            rust_log: text("RUST_LOG", "info"),
            toggles: Toggles {
                ocr: lookup_flag(&get, "RESMASTER_OCR", defaults.ocr)?,
                variant_b: lookup_flag(&get, "RESMASTER_VARIANT_B", defaults.variant_b)?,
                federal_gate: lookup_flag(&get, "RESMASTER_FEDERAL_GATE", defaults.federal_gate)?,
                safe_share: lookup_flag(&get, "RESMASTER_SAFE_SHARE", defaults.safe_share)?,
                idempotent: lookup_flag(&get, "RESMASTER_IDEMPOTENT", defaults.idempotent)?,
                link_check: lookup_flag(&get, "RESMASTER_LINK_CHECK", defaults.link_check)?,
                style_memory: lookup_flag(&get, "RESMASTER_STYLE_MEMORY", defaults.style_memory)?,
            },
            run_date: chrono::Local::now().date_naive(),
            styles: Vec::new(),
            tone: None,
            name_hint: None,
            company_hint: None,
            title_hint: None,
            force: false,
            check_updates: false,
        }
        .validate()
    }

    /// Applies command-line overrides on top of the environment.
    pub fn apply_cli(mut self, cli: &Cli) -> Result<Self> {
        if let Some(dir) = &cli.input_dir {
            self.input_dir = dir.clone();
        }
        if let Some(dir) = &cli.outdir {
            self.output_dir = dir.clone();
        }
        if let Some(max) = cli.max_bullets {
            self.max_bullets_per_role = max;
        }
        if let Some(date) = &cli.date {
            self.run_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("--date must be YYYY-MM-DD, got '{date}'"))?;
        }
        self.styles = cli.styles.clone();
        self.tone = cli.tone;
        self.name_hint = cli.name.clone();
        self.company_hint = cli.company.clone();
        self.title_hint = cli.title.clone();
        self.force = cli.force;
        self.check_updates = cli.check_updates;
        if cli.no_ocr {
            self.toggles.ocr = false;
        }
        if cli.no_variant_b {
            self.toggles.variant_b = false;
        }
        if cli.show_contact {
            self.toggles.safe_share = false;
        }
        if cli.no_link_check {
            self.toggles.link_check = false;
        }
        if cli.no_style_memory {
            self.toggles.style_memory = false;
        }
        self.validate()
    }

    /// Range checks shared by every configuration source.
    fn validate(self) -> Result<Self> {
        if self.max_bullets_per_role == 0 {
            anyhow::bail!("max bullets per role must be at least 1");
        }
        if self.chars_per_line == 0 {
            anyhow::bail!("chars per line must be at least 1");
        }
        Ok(self)
    }
}

fn lookup_parse(get: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> Result<usize> {
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("{key} must be a positive integer, got '{raw}'")),
        None => Ok(default),
    }
}

fn lookup_flag(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match get(key) {
        Some(raw) => parse_flag(&raw).with_context(|| format!("{key} must be on/off, got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognized flag value '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    /// Offline configuration rooted in a scratch directory.
    pub fn for_tests(root: &std::path::Path) -> Self {
        Config {
            input_dir: root.join("in"),
            output_dir: root.join("out"),
            cache_dir: root.join("cache"),
            update_feed_url: String::new(),
            max_bullets_per_role: 6,
            chars_per_line: 95,
            tesseract_path: String::new(),
            typst_path: String::new(),
            pandoc_path: String::new(),
            rust_log: "info".into(),
            toggles: Toggles {
                link_check: false,
                ..Toggles::default()
            },
            run_date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            styles: Vec::new(),
            tone: None,
            name_hint: None,
            company_hint: None,
            title_hint: None,
            force: false,
            check_updates: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag("yes").unwrap());
        assert!(parse_flag(" ON ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_toggles_default_on() {
        let t = Toggles::default();
        assert!(t.ocr && t.variant_b && t.federal_gate && t.safe_share && t.idempotent);
        assert!(t.link_check && t.style_memory);
    }

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_lookup_defaults() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.max_bullets_per_role, 6);
        assert_eq!(cfg.pandoc_path, "pandoc");
        assert!(cfg.toggles.link_check);
    }

    #[test]
    fn test_zero_max_bullets_rejected_from_environment() {
        let err = Config::from_lookup(lookup(&[("RESMASTER_MAX_BULLETS", "0")])).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_zero_max_bullets_rejected_from_cli() {
        let cli = Cli::try_parse_from(["resmaster", "--max-bullets", "0"]).unwrap();
        let err = Config::from_lookup(lookup(&[]))
            .unwrap()
            .apply_cli(&cli)
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_environment_toggles_and_cli_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("RESMASTER_LINK_CHECK", "off"),
            ("RESMASTER_MAX_BULLETS", "4"),
        ]))
        .unwrap();
        assert!(!cfg.toggles.link_check);
        assert_eq!(cfg.max_bullets_per_role, 4);

        let cli = Cli::try_parse_from(["resmaster", "--no-style-memory", "--max-bullets", "3"])
            .unwrap();
        let cfg = cfg.apply_cli(&cli).unwrap();
        assert!(!cfg.toggles.style_memory);
        assert_eq!(cfg.max_bullets_per_role, 3);
    }

    #[test]
    fn test_bad_flag_names_the_key() {
        let err = Config::from_lookup(lookup(&[("RESMASTER_OCR", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("RESMASTER_OCR"));
    }
}
