//! ZIP archive writing.
//!
//! Atomic artifacts: the archive is built at `<output>.tmp`, verified, and
//! only then renamed over `<output>`. On failure the temporary file is
//! removed, so a partial archive never sits at the output path.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::PackError;
use crate::resolve::ResolvedEntry;

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub files: usize,
    /// Size of the finished archive in bytes.
    pub size: u64,
}

/// Write `entries` to `output` in order.
pub fn write_archive(entries: &[ResolvedEntry], output: &Path) -> Result<ArchiveSummary, PackError> {
    if entries.is_empty() {
        return Err(PackError::NothingToPack);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PackError::write_failure(output, e))?;
    }

    let temp = temp_path(output);
    if let Err(err) = build_and_verify(entries, &temp) {
        let _ = fs::remove_file(&temp);
        return Err(PackError::write_failure(output, err));
    }

    fs::rename(&temp, output).map_err(|e| {
        let _ = fs::remove_file(&temp);
        PackError::write_failure(output, e)
    })?;

    let size = fs::metadata(output)
        .map(|m| m.len())
        .map_err(|e| PackError::write_failure(output, e))?;
    tracing::info!(path = %output.display(), files = entries.len(), size, "archive written");

    Ok(ArchiveSummary {
        path: output.to_path_buf(),
        files: entries.len(),
        size,
    })
}

/// Names of all entries stored in an archive, in archive order.
pub fn list_archive(path: &Path) -> zip::result::ZipResult<Vec<String>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    (0..archive.len())
        .map(|i| archive.by_index(i).map(|f| f.name().to_string()))
        .collect()
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn build_and_verify(entries: &[ResolvedEntry], temp: &Path) -> zip::result::ZipResult<()> {
    write_zip(entries, temp)?;

    let stored = ZipArchive::new(File::open(temp)?)?.len();
    if stored != entries.len() {
        return Err(zip::result::ZipError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("archive holds {} entries, expected {}", stored, entries.len()),
        )));
    }
    Ok(())
}

fn write_zip(entries: &[ResolvedEntry], path: &Path) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let mut source = File::open(&entry.source)?;
        let size = source.metadata()?.len();
        zip.start_file(entry.arcname.as_str(), options.large_file(size >= u64::from(u32::MAX)))?;
        io::copy(&mut source, &mut zip)?;
        tracing::debug!(arcname = %entry.arcname, size, "stored");
    }

    zip.finish()?;
    Ok(())
}
