//! Shared test utilities for ziplist tests.
#![allow(dead_code)]

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ziplist::commands::PackOptions;
use ziplist::config::{Config, MissingAction};
use ziplist::resolve::Policy;

/// Files of a typical build output directory.
pub const SAMPLE_TREE: &[&str] = &[
    "SipVoice.dll",
    "Ping.dll",
    "Debug/TrayIconDll.dll",
    "Debug/AgentExe.exe",
    "res/AgentExe.ico",
    "Sounds/a.wav",
    "Sounds/b.mp3",
    "Sounds/sub/c.ogg",
    "Sounds/sub/another.wav",
];

/// Test environment with a temporary source tree.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Source root; manifests are written here too
    pub root: PathBuf,
}

impl TestEnv {
    /// Create an empty test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("Release");
        fs::create_dir_all(&root).expect("Failed to create source root");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Create a test environment populated with [`SAMPLE_TREE`].
    pub fn with_sample_tree() -> Self {
        let env = Self::new();
        for rel in SAMPLE_TREE {
            env.write_file(rel, &format!("contents of {}", rel));
        }
        env
    }

    /// Create `rel` under the root with `contents`, making parent dirs.
    pub fn write_file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Write `pkg.ziplist` into the root and return its path.
    pub fn write_manifest(&self, text: &str) -> PathBuf {
        self.write_file("pkg.ziplist", text)
    }

    /// Pack options for a manifest in this environment.
    pub fn options(&self, manifest: &Path) -> PackOptions {
        PackOptions {
            manifest: manifest.to_path_buf(),
            ..PackOptions::default()
        }
    }

    /// Default archive path for `pkg.ziplist`.
    pub fn archive_path(&self) -> PathBuf {
        self.root.join("pkg.zip")
    }
}

/// Non-interactive config for tests.
pub fn config(policy: Policy, on_missing: MissingAction) -> Config {
    Config {
        policy,
        on_missing,
        output_dir: None,
    }
}

/// Entry names of a zip archive, in archive order.
pub fn archive_names(path: &Path) -> Vec<String> {
    ziplist::archive::list_archive(path).expect("Failed to read archive")
}

/// Contents of one archive entry.
pub fn archive_entry(path: &Path, name: &str) -> String {
    let file = fs::File::open(path).expect("Failed to open archive");
    let mut archive = zip::ZipArchive::new(file).expect("Failed to parse archive");
    let mut entry = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("Archive {} has no entry {}", path.display(), name));
    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .expect("Failed to read archive entry");
    contents
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read file: {}", path.display()));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

/// Assert that a path does not exist.
pub fn assert_not_exists(path: &Path) {
    assert!(!path.exists(), "Expected no file at: {}", path.display());
}
