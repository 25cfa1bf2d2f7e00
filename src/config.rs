//! Configuration management for ziplist.
//!
//! Reads configuration from a `.env` file next to the manifest and from
//! environment variables. Environment variables take precedence over the
//! `.env` file; command-line flags take precedence over both.

use anyhow::{anyhow, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::resolve::Policy;

pub const POLICY_ENV: &str = "ZIPLIST_POLICY";
pub const ON_MISSING_ENV: &str = "ZIPLIST_ON_MISSING";
pub const OUTPUT_DIR_ENV: &str = "ZIPLIST_OUTPUT_DIR";

/// What to do when an add rule matches no files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MissingAction {
    /// Ask the operator (abort when stdin is not a terminal).
    #[default]
    Prompt,
    /// Stop with exit code 2.
    Abort,
    /// Pack whatever the other rules matched.
    Continue,
}

impl fmt::Display for MissingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingAction::Prompt => f.write_str("prompt"),
            MissingAction::Abort => f.write_str("abort"),
            MissingAction::Continue => f.write_str("continue"),
        }
    }
}

impl FromStr for MissingAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(MissingAction::Prompt),
            "abort" => Ok(MissingAction::Abort),
            "continue" => Ok(MissingAction::Continue),
            other => Err(format!(
                "unknown action '{}' (expected 'prompt', 'abort' or 'continue')",
                other
            )),
        }
    }
}

/// ziplist configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Rule precedence policy (default: sequential)
    pub policy: Policy,
    /// Zero-match handling (default: prompt)
    pub on_missing: MissingAction,
    /// Directory for the archive (default: the manifest's directory)
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `<base_dir>/.env` and the environment.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let env_path = base_dir.join(".env");
        if env_path.exists() {
            // Existing environment variables are never overwritten.
            dotenvy::from_path(&env_path)
                .map_err(|e| anyhow!("Failed to read {}: {}", env_path.display(), e))?;
        }
        Self::from_lookup(base_dir, |key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Relative `ZIPLIST_OUTPUT_DIR` values are resolved against `base_dir`.
    pub fn from_lookup(base_dir: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let policy = match lookup(POLICY_ENV).filter(|v| !v.trim().is_empty()) {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow!("{}: {}", POLICY_ENV, e))?,
            None => Policy::default(),
        };

        let on_missing = match lookup(ON_MISSING_ENV).filter(|v| !v.trim().is_empty()) {
            Some(value) => value
                .parse()
                .map_err(|e| anyhow!("{}: {}", ON_MISSING_ENV, e))?,
            None => MissingAction::default(),
        };

        let output_dir = lookup(OUTPUT_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(|s| {
                let path = PathBuf::from(s.trim());
                if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                }
            });

        Ok(Self {
            policy,
            on_missing,
            output_dir,
        })
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  {}: {}", POLICY_ENV, self.policy);
        println!("  {}: {}", ON_MISSING_ENV, self.on_missing);
        match &self.output_dir {
            Some(dir) => println!("  {}: {}", OUTPUT_DIR_ENV, dir.display()),
            None => println!("  {}: (manifest directory)", OUTPUT_DIR_ENV),
        }
    }
}
