//! Structured events emitted while resolving and packing.
//!
//! The resolver never prints. It appends [`Event`]s to a [`Report`], and
//! the command layer decides how to render them (console trace, JSON
//! summary, prompt).

use serde::Serialize;
use std::path::PathBuf;

/// One observable step or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// An add rule found no regular files.
    RuleMatchedNothing { line: usize, rule: String },
    /// A rule finished; `count` is the number of files it added or removed.
    RuleApplied {
        line: usize,
        rule: String,
        count: usize,
    },
    /// A file was placed in the mapping.
    EntryAdded {
        line: usize,
        path: String,
        arcname: String,
    },
    /// A file was removed from (or kept out of) the mapping by an exclude.
    EntryExcluded { line: usize, path: String },
    /// A previous output archive matched by the rules was left out.
    OutputSkipped { path: String, arcname: String },
    /// Two different sources claim the same archive path; `replacement` wins.
    DuplicateArcname {
        arcname: String,
        previous: PathBuf,
        replacement: PathBuf,
    },
}

impl Event {
    /// True for events an operator should see as warnings.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::RuleMatchedNothing { .. }
                | Event::DuplicateArcname { .. }
                | Event::OutputSkipped { .. }
        )
    }
}

/// Accumulated events of one packaging run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub events: Vec<Event>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Add rules that matched nothing, in manifest order.
    pub fn missing_rules(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::RuleMatchedNothing { rule, .. } => Some(rule.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_missing_rules(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, Event::RuleMatchedNothing { .. }))
    }

    /// Count of archive path collisions.
    pub fn duplicate_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::DuplicateArcname { .. }))
            .count()
    }

    /// Count of files kept out by exclude rules.
    pub fn excluded_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::EntryExcluded { .. }))
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_warning()).count()
    }

    /// Pretty JSON for automated callers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print the warnings and a one-line summary to stdout.
    pub fn print(&self) {
        for event in &self.events {
            match event {
                Event::RuleMatchedNothing { line, rule } => {
                    println!("  ⚠ [MISSING] line {}: {}", line, rule);
                }
                Event::DuplicateArcname {
                    arcname,
                    previous,
                    replacement,
                } => {
                    println!(
                        "  ⚠ [DUPLICATE] '{}': {} overwrites {}",
                        arcname,
                        replacement.display(),
                        previous.display()
                    );
                }
                Event::OutputSkipped { path, .. } => {
                    println!("  ⚠ [SKIPPED] '{}': the output archive is never packed into itself", path);
                }
                _ => {}
            }
        }

        let rules = self
            .events
            .iter()
            .filter(|e| matches!(e, Event::RuleApplied { .. } | Event::RuleMatchedNothing { .. }))
            .count();
        println!(
            "Summary: {} rule(s), {} excluded, {} warning(s)",
            rules,
            self.excluded_count(),
            self.warning_count()
        );
    }
}
