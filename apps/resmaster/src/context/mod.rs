// Input side of the pipeline: upload discovery, format readers, text
// normalization and resume field extraction, plus the bullet-level checks
// (impact validation, dedup, scoring) shared with generation.

pub mod dedup;
pub mod discovery;
pub mod ingest;
pub mod profile;
pub mod readers;
pub mod scoring;
pub mod validation;
