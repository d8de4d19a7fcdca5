//! Delivery archive: every output file of a pair, grouped into bucket folders,
//! plus a short README. Built in a temporary file next to the destination and
//! persisted only once complete.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::resume::OutputFile;

pub const README_NAME: &str = "README_first.txt";
const README_TEXT: &str = "Welcome!\nYour files are organized by folder.\nResume, Cover, Guides, Reports, and Federal (if applicable).\n";
const BUCKET_ORDER: [&str; 5] = ["Resume", "Cover", "Guides", "Reports", "Federal"];

/// Archive member paths in the order they are written.
pub fn layout(files: &[OutputFile]) -> Vec<(String, PathBuf)> {
    let mut members: Vec<(usize, String, PathBuf)> = files
        .iter()
        .map(|f| {
            let bucket = f.kind.bucket();
            let rank = BUCKET_ORDER.iter().position(|b| *b == bucket).unwrap_or(BUCKET_ORDER.len());
            (rank, format!("{bucket}/{}", f.file_name()), f.path.clone())
        })
        .collect();
    members.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    members.into_iter().map(|(_, name, path)| (name, path)).collect()
}

/// Writes `dest` as a gzip-compressed tar archive. On any failure nothing is
/// left at `dest` and the individual files are untouched.
pub async fn build_archive(dest: &Path, files: &[OutputFile]) -> Result<PathBuf, AppError> {
    let dest = dest.to_path_buf();
    let members = layout(files);
    let count = members.len();

    // Compression is CPU-bound; keep it off the async scheduler.
    let written = tokio::task::spawn_blocking(move || write_archive_sync(&dest, &members))
        .await
        .map_err(|e| AppError::Packaging(format!("archive task panicked: {e}")))??;

    info!("Packaged {count} files into {}", written.display());
    Ok(written)
}

fn write_archive_sync(dest: &Path, members: &[(String, PathBuf)]) -> Result<PathBuf, AppError> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .prefix(".resmaster-bundle-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| AppError::Packaging(format!("cannot stage archive: {e}")))?;

    let file = staged
        .reopen()
        .map_err(|e| AppError::Packaging(format!("cannot open staged archive: {e}")))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    append_bytes(&mut builder, README_NAME, README_TEXT.as_bytes())?;
    for (name, path) in members {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Packaging(format!("cannot read {}: {e}", path.display())))?;
        append_bytes(&mut builder, name, &bytes)?;
        debug!("Archived {name}");
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| AppError::Packaging(format!("cannot finish tar stream: {e}")))?;
    let file: File = encoder
        .finish()
        .map_err(|e| AppError::Packaging(format!("cannot finish gzip stream: {e}")))?;
    file.sync_all()
        .map_err(|e| AppError::Packaging(format!("cannot flush archive: {e}")))?;

    staged
        .persist(dest)
        .map_err(|e| AppError::Packaging(format!("cannot persist {}: {}", dest.display(), e.error)))?;
    Ok(dest.to_path_buf())
}

fn append_bytes<W: std::io::Write>(
    builder: &mut tar::Builder<W>,
    name: &str,
    bytes: &[u8],
) -> Result<(), AppError> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    // Fixed timestamp keeps identical inputs byte-identical.
    header.set_mtime(0);
    header.set_cksum();
    builder
        .append_data(&mut header, name, bytes)
        .map_err(|e| AppError::Packaging(format!("cannot add {name}: {e}")))
}
