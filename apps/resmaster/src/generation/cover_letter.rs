//! Evidence-only cover letter: outcomes come from the resume's own bullets,
//! needs from the posting's own lines, nothing else is claimed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::generation::acronyms::AcronymExpander;
use crate::generation::assemble::PairContext;
use crate::generation::style::StylePack;
use crate::models::resume::{AssembledDocument, Block, DocumentKind};

pub const WORD_CAP: usize = 220;
const MAX_SEEDS: usize = 3;
const MAX_NEEDS: usize = 3;
const MAX_NEED_WORDS: usize = 25;
const ADDRESSEE: &str = "Hiring Team";
const SEEDS_LEAD_IN: &str = "Here are a few outcomes I can bring:";
const NEEDS_LEAD_IN: &str = "What you're asking for that I already do:";

static RE_SEED_METRIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:,\d{3})?%|\$?\d{2,}(?:,\d{3})?").unwrap());
static RE_NEED_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(responsib|require|experience|will|own|lead|qualif)").unwrap()
});
static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());
static CLICHES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bI am excited to apply\b[^.]*\.?",
        r"(?i)\bpassionate\b",
        r"(?i)\bfast-paced environment\b",
        r"(?i)\bself-starter\b",
        r"(?i)\bdetail[- ]oriented\b",
        r"(?i)\bteam player\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

#[derive(Clone)]
struct Letter {
    opener: String,
    seeds: Vec<String>,
    needs: Vec<String>,
    close: String,
    signature: String,
}

impl Letter {
    fn word_count(&self) -> usize {
        let mut count = words(&self.opener) + words(&self.close) + words(&self.signature) + 2;
        if !self.seeds.is_empty() {
            count += words(SEEDS_LEAD_IN) + self.seeds.iter().map(|s| words(s)).sum::<usize>();
        }
        if !self.needs.is_empty() {
            count += words(NEEDS_LEAD_IN) + self.needs.iter().map(|s| words(s)).sum::<usize>();
        }
        count
    }

    /// Drops needs, then seeds, from the end until the letter fits.
    fn enforce_cap(&mut self, cap: usize) {
        while self.word_count() > cap {
            if self.needs.pop().is_none() && self.seeds.pop().is_none() {
                let over = self.word_count() - cap;
                let keep = words(&self.opener).saturating_sub(over + 1);
                self.opener = truncate_words(&self.opener, keep);
                break;
            }
        }
    }

    fn into_blocks(self) -> Vec<Block> {
        let mut blocks = vec![Block::Paragraph(self.opener)];
        if !self.seeds.is_empty() {
            blocks.push(Block::Paragraph(SEEDS_LEAD_IN.to_string()));
            blocks.extend(self.seeds.into_iter().map(Block::Bullet));
        }
        if !self.needs.is_empty() {
            blocks.push(Block::Paragraph(NEEDS_LEAD_IN.to_string()));
            blocks.extend(self.needs.into_iter().map(Block::Bullet));
        }
        blocks.push(Block::Paragraph(self.close));
        blocks.push(Block::Paragraph("Best regards,".to_string()));
        blocks.push(Block::Paragraph(self.signature));
        blocks
    }
}

pub fn assemble_cover_letter(ctx: &PairContext<'_>, style: StylePack) -> AssembledDocument {
    let basis = evidence_numbers(&[
        ctx.profile.raw_text.as_str(),
        ctx.job.raw_text.as_str(),
        ctx.title.as_str(),
        ctx.company.as_str(),
        ctx.candidate.as_str(),
    ]);

    let seeds = cover_seeds(ctx.selection.roles.iter().flat_map(|r| r.bullets.iter()))
        .into_iter()
        .map(|s| decliche(&s))
        .filter(|s| !s.is_empty() && is_supported(s, &basis))
        .collect();
    let needs = posting_needs(&ctx.job.raw_text)
        .into_iter()
        .map(|s| decliche(&s))
        .filter(|s| !s.is_empty() && is_supported(s, &basis))
        .collect();

    let title = non_empty_or(&ctx.title, "open");
    let company = non_empty_or(&ctx.company, "your organization");
    let mut letter = Letter {
        opener: ctx.tone.opener(ADDRESSEE, title, company),
        seeds,
        needs,
        close: ctx.tone.close().to_string(),
        signature: non_empty_or(&ctx.candidate, "Candidate").to_string(),
    };

    let mut doc = AssembledDocument::new(
        DocumentKind::CoverLetter,
        style,
        format!("Cover Letter: {title}, {company}"),
    );
    doc.blocks = fit_expanded(letter, WORD_CAP);
    doc
}

/// Expands acronyms, then tightens the budget by whatever the expansions
/// added until the expanded letter fits under `cap`.
fn fit_expanded(letter: Letter, cap: usize) -> Vec<Block> {
    let mut budget = cap;
    loop {
        let mut trial = letter.clone();
        trial.enforce_cap(budget);
        let blocks = expand_blocks(trial.into_blocks());
        let count = block_words(&blocks);
        if count <= cap || budget == 0 {
            return blocks;
        }
        budget = budget.saturating_sub(count - cap);
    }
}

fn expand_blocks(mut blocks: Vec<Block>) -> Vec<Block> {
    let mut expander = AcronymExpander::new();
    for text in blocks.iter_mut().filter_map(Block::text_mut) {
        *text = expander.expand_once(text);
    }
    blocks
}

fn block_words(blocks: &[Block]) -> usize {
    blocks.iter().map(|b| words(b.text())).sum()
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Resume bullets carrying a percentage, a currency amount or a two-digit
/// count, in resume order.
fn cover_seeds<'a>(bullets: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    bullets
        .filter(|b| RE_SEED_METRIC.is_match(b))
        .filter(|b| seen.insert(b.to_lowercase()))
        .take(MAX_SEEDS)
        .cloned()
        .collect()
}

/// Posting lines that state a responsibility or requirement.
fn posting_needs(posting: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    posting
        .lines()
        .map(|l| {
            l.trim()
                .trim_start_matches(['•', '-', '*', '▪', '◦', '·'])
                .trim()
        })
        .filter(|l| l.chars().count() > 6 && !l.ends_with(':'))
        .filter(|l| RE_NEED_CUE.is_match(l))
        .map(|l| truncate_words(first_sentence(l), MAX_NEED_WORDS))
        .filter(|l| seen.insert(l.to_lowercase()))
        .take(MAX_NEEDS)
        .collect()
}

fn first_sentence(line: &str) -> &str {
    match line.find(". ") {
        Some(i) => &line[..=i],
        None => line,
    }
}

fn words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn truncate_words(text: &str, max: usize) -> String {
    let all: Vec<&str> = text.split_whitespace().collect();
    if all.len() <= max {
        return all.join(" ");
    }
    format!("{}…", all[..max].join(" "))
}

/// Strips stock phrases and re-capitalizes what is left.
pub fn decliche(text: &str) -> String {
    let mut out = text.to_string();
    for re in CLICHES.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    let out = out
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches([',', ';', ':', '-'])
        .trim()
        .to_string();
    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn evidence_numbers(texts: &[&str]) -> HashSet<String> {
    texts
        .iter()
        .flat_map(|t| RE_NUMBER.find_iter(t))
        .map(|m| canonical_number(m.as_str()))
        .collect()
}

fn canonical_number(raw: &str) -> String {
    raw.replace(',', "").trim_end_matches('.').to_string()
}

/// Every number in the line also appears somewhere in the inputs.
fn is_supported(line: &str, basis: &HashSet<String>) -> bool {
    RE_NUMBER
        .find_iter(line)
        .all(|m| basis.contains(&canonical_number(m.as_str())))
}
