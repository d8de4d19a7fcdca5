// Tailoring: posting parsing, fit scoring, style packs, bullet selection and
// assembly of every deliverable as format-independent blocks.
// Orchestration of the whole pass lives in `generator`.

pub mod acronyms;
pub mod assemble;
pub mod content_selector;
pub mod cover_letter;
pub mod enrich;
pub mod fit_scoring;
pub mod generator;
pub mod guide;
pub mod jd_parser;
pub mod links;
pub mod redline;
pub mod risk;
pub mod style;
pub mod terms;
pub mod tone;
