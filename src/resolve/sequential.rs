//! Strict-sequential policy.
//!
//! Rules are folded in manifest order over a mapping keyed by source file.
//! A later add for the same file replaces its archive path in place; an
//! exclude removes whatever is present at that moment.

use std::collections::HashMap;

use super::{add_rule_entries, matched_files, ResolvedEntry};
use crate::error::PackError;
use crate::manifest::{Rule, RuleKind};
use crate::pattern::Pattern;
use crate::report::{Event, Report};
use crate::scan::SourceTree;

/// Insertion-ordered map from root-relative source path to entry.
#[derive(Debug, Default)]
struct Mapping {
    slots: Vec<Option<ResolvedEntry>>,
    index: HashMap<String, usize>,
}

impl Mapping {
    fn insert(&mut self, entry: ResolvedEntry) {
        match self.index.get(&entry.rel) {
            Some(&slot) => self.slots[slot] = Some(entry),
            None => {
                self.index.insert(entry.rel.clone(), self.slots.len());
                self.slots.push(Some(entry));
            }
        }
    }

    fn remove(&mut self, rel: &str) -> bool {
        match self.index.remove(rel) {
            Some(slot) => self.slots[slot].take().is_some(),
            None => false,
        }
    }

    fn into_entries(self) -> Vec<ResolvedEntry> {
        self.slots.into_iter().flatten().collect()
    }
}

pub(super) fn resolve(
    rules: &[Rule],
    tree: &impl SourceTree,
    report: &mut Report,
) -> Result<Vec<ResolvedEntry>, PackError> {
    let mapping = rules
        .iter()
        .try_fold(Mapping::default(), |mut mapping, rule| {
            match rule.kind {
                RuleKind::Add => apply_add(&mut mapping, tree, rule, report)?,
                RuleKind::Exclude => apply_exclude(&mut mapping, tree, rule, report)?,
            }
            Ok::<_, PackError>(mapping)
        })?;
    Ok(mapping.into_entries())
}

fn apply_add(
    mapping: &mut Mapping,
    tree: &impl SourceTree,
    rule: &Rule,
    report: &mut Report,
) -> Result<(), PackError> {
    let entries = add_rule_entries(tree, rule, report)?;
    if entries.is_empty() {
        return Ok(());
    }

    let count = entries.len();
    for entry in entries {
        report.push(Event::EntryAdded {
            line: rule.line,
            path: entry.rel.clone(),
            arcname: entry.arcname.clone(),
        });
        mapping.insert(entry);
    }
    report.push(Event::RuleApplied {
        line: rule.line,
        rule: rule.to_string(),
        count,
    });
    Ok(())
}

fn apply_exclude(
    mapping: &mut Mapping,
    tree: &impl SourceTree,
    rule: &Rule,
    report: &mut Report,
) -> Result<(), PackError> {
    let pattern = Pattern::compile(&rule.source)?;
    let mut removed = 0;
    for rel in matched_files(tree, &pattern)? {
        if mapping.remove(&rel) {
            tracing::debug!(line = rule.line, %rel, "excluded");
            report.push(Event::EntryExcluded {
                line: rule.line,
                path: rel,
            });
            removed += 1;
        }
    }
    report.push(Event::RuleApplied {
        line: rule.line,
        rule: rule.to_string(),
        count: removed,
    });
    Ok(())
}
