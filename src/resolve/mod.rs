//! Resolution engine: rules + source tree -> final archive mapping.
//!
//! ```text
//! rules ──► policy fold ──► raw entries ──► dedupe ──► FinalMapping
//!              │                              │
//!              └──────────── Report ◄─────────┘
//! ```
//!
//! Two precedence policies are supported and must be chosen explicitly:
//!
//! - [`Policy::Sequential`]: rules mutate one mapping in manifest order. An
//!   exclude only removes what earlier add rules put there.
//! - [`Policy::Collect`]: all excludes are gathered first and filter every
//!   add rule, wherever they appear in the manifest.
//!
//! Resolution is a pure function of the rules and the tree. It never
//! prompts; zero-match add rules are reported as
//! [`Event::RuleMatchedNothing`](crate::report::Event) for the caller.

mod collect;
mod sequential;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::dedupe;
use crate::error::PackError;
use crate::manifest::Rule;
use crate::pattern::{self, Pattern};
use crate::report::{Event, Report};
use crate::scan::SourceTree;

/// Rule precedence policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Strict-sequential: rule order gates every mutation.
    #[default]
    #[value(alias = "strict")]
    Sequential,
    /// Collect-then-filter: excludes apply regardless of position.
    #[value(alias = "collect-then-filter")]
    Collect,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Sequential => f.write_str("sequential"),
            Policy::Collect => f.write_str("collect"),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "strict" => Ok(Policy::Sequential),
            "collect" | "collect-then-filter" => Ok(Policy::Collect),
            other => Err(format!(
                "unknown policy '{}' (expected 'sequential' or 'collect')",
                other
            )),
        }
    }
}

/// One matched file and where it lands in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    /// Absolute source path.
    pub source: PathBuf,
    /// Source path relative to the tree root, `/`-separated.
    pub rel: String,
    /// Path inside the archive, `/`-separated.
    pub arcname: String,
    /// Manifest line of the add rule that produced this entry.
    pub line: usize,
}

/// Output of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Final mapping, in write order, one source per archive path.
    pub entries: Vec<ResolvedEntry>,
    pub report: Report,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Archive paths in write order.
    pub fn arcnames(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.arcname.as_str()).collect()
    }

    /// Archive path assigned to a root-relative source, if any.
    pub fn arcname_of(&self, rel: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.rel == rel)
            .map(|e| e.arcname.as_str())
    }
}

/// Resolve `rules` against `tree` under `policy`, then drop duplicate
/// archive paths.
pub fn resolve(
    rules: &[Rule],
    tree: &impl SourceTree,
    policy: Policy,
) -> Result<Resolution, PackError> {
    let mut report = Report::new();
    let raw = resolve_entries(rules, tree, policy, &mut report)?;
    let entries = dedupe::finalize(raw, &mut report);
    Ok(Resolution { entries, report })
}

/// Run the policy fold only. Entries may still share archive paths.
pub fn resolve_entries(
    rules: &[Rule],
    tree: &impl SourceTree,
    policy: Policy,
    report: &mut Report,
) -> Result<Vec<ResolvedEntry>, PackError> {
    tracing::info!(policy = %policy, rules = rules.len(), "resolving manifest");
    match policy {
        Policy::Sequential => sequential::resolve(rules, tree, report),
        Policy::Collect => collect::resolve(rules, tree, report),
    }
}

/// Regular files matched by `pattern`, root-relative. Directories are dropped.
fn matched_files(tree: &impl SourceTree, pattern: &Pattern) -> Result<Vec<String>, PackError> {
    let mut files = tree.list_matches(pattern)?;
    files.retain(|rel| tree.is_regular_file(rel));
    Ok(files)
}

/// Entries an add rule produces. Emits `RuleMatchedNothing` when empty.
fn add_rule_entries(
    tree: &impl SourceTree,
    rule: &Rule,
    report: &mut Report,
) -> Result<Vec<ResolvedEntry>, PackError> {
    let pattern = Pattern::compile(&rule.source)?;
    let files = matched_files(tree, &pattern)?;

    if files.is_empty() {
        tracing::warn!(line = rule.line, rule = %rule, "rule matched no files");
        report.push(Event::RuleMatchedNothing {
            line: rule.line,
            rule: rule.to_string(),
        });
        return Ok(Vec::new());
    }

    Ok(files
        .into_iter()
        .map(|rel| {
            let arcname = pattern::arcname(&pattern, rule.dest.as_deref(), &rel);
            tracing::debug!(line = rule.line, %rel, %arcname, "matched");
            ResolvedEntry {
                source: tree.absolute(&rel),
                rel,
                arcname,
                line: rule.line,
            }
        })
        .collect())
}
