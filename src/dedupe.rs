//! Duplicate archive path detection.
//!
//! Last one processed wins. A different source at an already claimed path
//! is a warning; the exact same pair twice is dropped without one.

use std::collections::HashMap;

use crate::report::{Event, Report};
use crate::resolve::ResolvedEntry;

/// Collapse `entries` to one source per archive path, reporting collisions.
///
/// The winner takes the position of the first entry for that path, so write
/// order follows first appearance.
pub fn finalize(entries: Vec<ResolvedEntry>, report: &mut Report) -> Vec<ResolvedEntry> {
    let mut out: Vec<ResolvedEntry> = Vec::with_capacity(entries.len());
    let mut by_arcname: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let Some(&slot) = by_arcname.get(&entry.arcname) else {
            by_arcname.insert(entry.arcname.clone(), out.len());
            out.push(entry);
            continue;
        };

        let previous = &out[slot];
        if previous.source == entry.source {
            tracing::trace!(arcname = %entry.arcname, "redundant entry dropped");
            continue;
        }

        tracing::warn!(
            arcname = %entry.arcname,
            previous = %previous.source.display(),
            replacement = %entry.source.display(),
            "duplicate archive path"
        );
        report.push(Event::DuplicateArcname {
            arcname: entry.arcname.clone(),
            previous: previous.source.clone(),
            replacement: entry.source.clone(),
        });
        out[slot] = entry;
    }
    out
}
