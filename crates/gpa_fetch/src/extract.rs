//! Zip extraction into a destination folder.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use zip::ZipArchive;

fn open<R: Read + Seek>(reader: R) -> Result<ZipArchive<R>> {
    ZipArchive::new(reader).context("archive is not a valid zip file")
}

fn write_entry(entry: &mut impl Read, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut file = File::create(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;
    io::copy(entry, &mut file)
        .with_context(|| format!("failed to write {}", destination.display()))?;
    Ok(())
}

/// Extracts every entry under `folder`, keeping the archive's directory
/// structure. Entries whose names would land outside `folder` are skipped.
///
/// Returns the files written.
pub fn extract_all<R: Read + Seek>(reader: R, folder: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = open(reader)?;
    let mut written = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read archive entry {index}"))?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping archive entry outside the destination");
            continue;
        };
        let destination = folder.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination)
                .with_context(|| format!("failed to create {}", destination.display()))?;
            continue;
        }
        write_entry(&mut entry, &destination)?;
        written.push(destination);
    }

    debug!(files = written.len(), folder = %folder.display(), "archive extracted");
    Ok(written)
}

/// True when `name` starts with `prefix`, ignoring ASCII case.
pub fn has_prefix_ignore_ascii_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn base_name(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?;
    (!base.is_empty() && base != "." && base != "..").then_some(base)
}

/// Extracts the files whose archive path starts with `prefix` (ASCII
/// case-insensitive) directly into `folder` under their base names,
/// replacing existing files. Directory entries are skipped.
///
/// Returns the files written.
pub fn extract_prefixed<R: Read + Seek>(
    reader: R,
    folder: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    let mut archive = open(reader)?;
    let mut written = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read archive entry {index}"))?;
        let name = entry.name().to_owned();
        if !has_prefix_ignore_ascii_case(&name, prefix) || name.ends_with('/') {
            continue;
        }
        let Some(base) = base_name(&name) else {
            continue;
        };

        let destination = folder.join(base);
        debug!(entry = %name, destination = %destination.display(), "extracting");
        write_entry(&mut entry, &destination)?;
        written.push(destination);
    }

    Ok(written)
}
