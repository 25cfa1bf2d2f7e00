//! Error kinds for manifest packaging.
//!
//! Only fatal conditions live here. Collisions and excluded entries are
//! warnings and travel through [`crate::report::Report`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal packaging errors.
#[derive(Debug, Error)]
pub enum PackError {
    /// The manifest file does not exist.
    #[error("manifest not found: {}", .path.display())]
    ManifestNotFound { path: PathBuf },

    /// The manifest exists but could not be read.
    #[error("failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest line produced an empty source pattern.
    #[error("line {line}: {reason}")]
    ManifestSyntax { line: usize, reason: String },

    /// The directory the manifest is resolved against does not exist.
    #[error("source directory not found: {}", .path.display())]
    SourceDirectoryNotFound { path: PathBuf },

    /// A wildcard segment could not be compiled.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// One or more add rules matched nothing and the caller chose to abort.
    #[error("{} rule(s) matched no files: {}", .patterns.len(), .patterns.join(", "))]
    RuleMatchedNothing { patterns: Vec<String> },

    /// Resolution finished without a single file to archive.
    #[error("no files to pack")]
    NothingToPack,

    /// Walking the source tree failed.
    #[error("failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Writing the archive failed. The partial archive has been discarded.
    #[error("failed to write archive {}: {reason}", .path.display())]
    WriteFailure { path: PathBuf, reason: String },
}

impl PackError {
    /// Process exit code for this error when surfaced by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RuleMatchedNothing { .. } => 2,
            _ => 1,
        }
    }

    pub(crate) fn write_failure(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::WriteFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
