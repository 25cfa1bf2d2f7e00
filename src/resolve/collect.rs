//! Collect-then-filter policy.
//!
//! Every exclude rule is evaluated first into one exclusion set. Add rules
//! then run in manifest order and drop excluded files, so an exclude works
//! no matter where it is declared. Repeated additions of the same file are
//! kept as separate entries.

use std::collections::HashSet;

use super::{add_rule_entries, matched_files, ResolvedEntry};
use crate::error::PackError;
use crate::manifest::Rule;
use crate::pattern::Pattern;
use crate::report::{Event, Report};
use crate::scan::SourceTree;

pub(super) fn resolve(
    rules: &[Rule],
    tree: &impl SourceTree,
    report: &mut Report,
) -> Result<Vec<ResolvedEntry>, PackError> {
    let excluded = exclusion_set(rules, tree, report)?;

    let mut entries = Vec::new();
    for rule in rules.iter().filter(|r| !r.is_exclude()) {
        let matched = add_rule_entries(tree, rule, report)?;
        if matched.is_empty() {
            continue;
        }

        let mut added = 0;
        for entry in matched {
            if excluded.contains(&entry.rel) {
                tracing::debug!(line = rule.line, rel = %entry.rel, "filtered by exclude");
                report.push(Event::EntryExcluded {
                    line: rule.line,
                    path: entry.rel,
                });
                continue;
            }
            report.push(Event::EntryAdded {
                line: rule.line,
                path: entry.rel.clone(),
                arcname: entry.arcname.clone(),
            });
            entries.push(entry);
            added += 1;
        }
        report.push(Event::RuleApplied {
            line: rule.line,
            rule: rule.to_string(),
            count: added,
        });
    }
    Ok(entries)
}

/// Root-relative files matched by any exclude rule.
fn exclusion_set(
    rules: &[Rule],
    tree: &impl SourceTree,
    report: &mut Report,
) -> Result<HashSet<String>, PackError> {
    let mut excluded = HashSet::new();
    for rule in rules.iter().filter(|r| r.is_exclude()) {
        let files = matched_files(tree, &Pattern::compile(&rule.source)?)?;
        report.push(Event::RuleApplied {
            line: rule.line,
            rule: rule.to_string(),
            count: files.len(),
        });
        excluded.extend(files);
    }
    Ok(excluded)
}

#[cfg(test)]
mod tests {
    use super::super::testing::MemTree;
    use super::*;
    use crate::manifest::parse_lines;

    fn run(text: &str, files: &[&str]) -> (Vec<ResolvedEntry>, Report) {
        let lines: Vec<&str> = text.lines().collect();
        let rules = parse_lines(&lines).unwrap();
        let mut report = Report::new();
        let entries = resolve(&rules, &MemTree::new(files), &mut report).unwrap();
        (entries, report)
    }

    #[test]
    fn test_same_source_kept_at_multiple_paths() {
        let (entries, _) = run("Ping.dll\nPing.dll -> lib/Ping.dll", &["Ping.dll"]);
        let arcnames: Vec<_> = entries.iter().map(|e| e.arcname.as_str()).collect();
        assert_eq!(arcnames, ["Ping.dll", "lib/Ping.dll"]);
    }

    #[test]
    fn test_exclude_wins_over_explicit_add() {
        let (entries, report) = run(
            "Debug/AgentExe.exe -> bin/Agent.exe\n!Debug/**",
            &["Debug/AgentExe.exe"],
        );
        assert!(entries.is_empty());
        assert_eq!(report.excluded_count(), 1);
        assert!(!report.has_missing_rules());
    }

    #[test]
    fn test_rule_applied_not_emitted_for_missing_rule() {
        let (_, report) = run("Missing/*.dll", &["Ping.dll"]);
        assert_eq!(report.events.len(), 1);
        assert!(report.has_missing_rules());
    }
}
