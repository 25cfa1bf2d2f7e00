//! Source tree scanning.
//!
//! [`SourceTree`] is the only way the resolver sees the filesystem. Paths
//! crossing this boundary are root-relative and `/`-separated.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PackError;
use crate::pattern::Pattern;

/// Read-only view of the directory being packaged.
pub trait SourceTree {
    /// Root directory all relative paths are resolved against.
    fn root(&self) -> &Path;

    /// Every file and directory below the root matching `pattern`.
    ///
    /// Order must be deterministic for an unchanged tree.
    fn list_matches(&self, pattern: &Pattern) -> Result<Vec<String>, PackError>;

    /// True if `rel` names a regular file.
    fn is_regular_file(&self, rel: &str) -> bool;

    /// Absolute path of a root-relative path.
    fn absolute(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }
}

/// A real directory on disk.
#[derive(Debug, Clone)]
pub struct DirTree {
    root: PathBuf,
}

impl DirTree {
    /// Open `root` for scanning. Fails if it is not a directory.
    pub fn new(root: &Path) -> Result<Self, PackError> {
        if !root.is_dir() {
            return Err(PackError::SourceDirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl SourceTree for DirTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_matches(&self, pattern: &Pattern) -> Result<Vec<String>, PackError> {
        if pattern.tokens().is_empty() {
            return Ok(Vec::new());
        }
        let prefix = pattern.literal_prefix();

        // No wildcard: a single existence check.
        if !pattern.has_wildcard() {
            let rel = prefix.join("/");
            return Ok(if self.root.join(&rel).exists() {
                vec![rel]
            } else {
                Vec::new()
            });
        }

        let base = prefix.iter().fold(self.root.clone(), |p, s| p.join(s));
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut walker = WalkDir::new(&base).min_depth(1).sort_by_file_name();
        if let Some(depth) = pattern.fixed_depth() {
            walker = walker.max_depth(depth - prefix.len());
        }

        let mut matches = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| PackError::Scan {
                path: base.clone(),
                source,
            })?;
            let Some(rel) = relative_path(&self.root, entry.path()) else {
                continue;
            };
            if pattern.matches(&rel) {
                matches.push(rel);
            }
        }
        matches.sort();
        Ok(matches)
    }

    fn is_regular_file(&self, rel: &str) -> bool {
        self.root.join(rel).is_file()
    }
}

/// `/`-separated path of `path` relative to `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
