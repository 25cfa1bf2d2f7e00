//! Manifest parsing: `.ziplist` text into an ordered rule list.
//!
//! One rule per line:
//!
//! ```text
//! # comment
//! Sounds/**                      add, keep structure below Sounds/
//! !**/*.wav                      exclude
//! Debug/Agent.exe -> bin/Agent.exe
//! ```
//!
//! Rule order is significant. It is the only tie-break the resolver has.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::PackError;

/// Separator token between source and destination patterns.
pub const ARROW: &str = "->";

/// Whether a rule adds files to the archive or removes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Add,
    Exclude,
}

/// One parsed manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// 1-based line number in the manifest.
    pub line: usize,
    pub kind: RuleKind,
    /// Source pattern, `/`-separated, never empty.
    pub source: String,
    /// Destination pattern, `/`-separated. `None` derives the arcname from the match.
    pub dest: Option<String>,
}

impl Rule {
    pub fn is_exclude(&self) -> bool {
        self.kind == RuleKind::Exclude
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_exclude() {
            write!(f, "!")?;
        }
        write!(f, "{}", self.source)?;
        if let Some(dest) = &self.dest {
            write!(f, " {} {}", ARROW, dest)?;
        }
        Ok(())
    }
}

/// Read the raw lines of a manifest file.
pub fn read_manifest_lines(path: &Path) -> Result<Vec<String>, PackError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PackError::ManifestNotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(PackError::ManifestRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read and parse a manifest file.
pub fn load(path: &Path) -> Result<Vec<Rule>, PackError> {
    let lines = read_manifest_lines(path)?;
    parse_lines(&lines)
}

/// Parse manifest lines into rules, preserving order.
///
/// Comments and blank lines produce nothing. Patterns are not validated
/// beyond being non-empty; a bad pattern simply matches nothing later.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Rule>, PackError> {
    let mut rules = Vec::new();
    for (idx, raw) in lines.iter().enumerate() {
        if let Some(rule) = parse_line(idx + 1, raw.as_ref())? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

/// Parse one line. Returns `Ok(None)` for comments and blank lines.
pub fn parse_line(line: usize, raw: &str) -> Result<Option<Rule>, PackError> {
    let text = raw.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let (kind, text) = match text.strip_prefix('!') {
        Some(rest) => (RuleKind::Exclude, rest.trim_start()),
        None => (RuleKind::Add, text),
    };

    let (source, dest) = match text.split_once(ARROW) {
        Some((lhs, rhs)) => {
            let rhs = rhs.trim();
            (lhs.trim(), (!rhs.is_empty()).then_some(rhs))
        }
        None => (text, None),
    };

    let source = normalize_separators(source);
    if source.is_empty() {
        return Err(PackError::ManifestSyntax {
            line,
            reason: format!("empty source pattern in '{}'", raw.trim()),
        });
    }

    Ok(Some(Rule {
        line,
        kind,
        source,
        dest: dest.map(normalize_separators),
    }))
}

/// Accept both `/` and `\` in the manifest; store `/`.
fn normalize_separators(pattern: &str) -> String {
    pattern.replace('\\', "/")
}
