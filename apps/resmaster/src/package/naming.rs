//! Deterministic output names.
//!
//! `First_Last_Company_Title_Style_YYYY-MM-DD_SUFFIX.ext`: every segment is a
//! pure function of its input, so a rerun with the same inputs and date
//! produces the same paths.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::generation::style::StylePack;
use crate::models::resume::DocumentKind;

const MAX_SEGMENT: usize = 64;

static RE_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Runs of non-alphanumerics become `_`; trimmed; at most 64 characters;
/// empty becomes `NA`.
pub fn safe_name(raw: &str) -> String {
    let replaced = RE_UNSAFE.replace_all(raw, "_");
    let trimmed = replaced.trim_matches('_');
    let capped: String = trimmed.chars().take(MAX_SEGMENT).collect();
    if capped.is_empty() {
        "NA".to_string()
    } else {
        capped
    }
}

/// Identity fields that make up every file name of one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub last: String,
    pub company: String,
    pub title: String,
}

pub fn base_name(parts: &NameParts, style: StylePack, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}",
        safe_name(&parts.first),
        safe_name(&parts.last),
        safe_name(&parts.company),
        safe_name(&parts.title),
        style.display_name(),
        date.format("%Y-%m-%d")
    )
}

/// File stem (no extension) of one document.
pub fn document_stem(parts: &NameParts, style: StylePack, date: NaiveDate, kind: DocumentKind) -> String {
    format!("{}_{}", base_name(parts, style, date), kind.suffix())
}

pub fn archive_name(parts: &NameParts, style: StylePack, date: NaiveDate) -> String {
    format!("{}_DELIVERABLES.tar.gz", base_name(parts, style, date))
}

pub fn manifest_name(date: NaiveDate) -> String {
    format!("RUN_MANIFEST_{}.json", date.format("%Y-%m-%d"))
}
