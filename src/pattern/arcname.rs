//! Archive path computation for matched files.
//!
//! | source          | dest     | archive path                                   |
//! |-----------------|----------|------------------------------------------------|
//! | `Sounds/**`     | -        | `sub/c.ogg` (structure below the `**` kept)    |
//! | `Sounds/*.*`    | -        | `a.wav` (flattened)                            |
//! | `Sounds/**`     | `S1/**`  | `S1/sub/c.ogg`                                 |
//! | `Sounds/*.wav`  | `S1/*`   | `S1/a.wav`                                     |
//! | `Debug/A.exe`   | `bin/`   | `bin/A.exe`                                    |
//! | `Debug/A.exe`   | `B.exe`  | `B.exe`                                        |

use super::{split_segments, Pattern};

/// Compute the archive path of `rel_path`, a root-relative file matched by `source`.
///
/// The result is always `/`-separated with no empty or `.` segments.
pub fn arcname(source: &Pattern, dest: Option<&str>, rel_path: &str) -> String {
    let segments: Vec<&str> = split_segments(rel_path).collect();
    let base_name = segments.last().copied().unwrap_or_default();

    match dest {
        None if source.is_recursive() => join(&[], tail(&segments, source.recursive_offset())),
        None => base_name.to_string(),
        Some(dest) if source.is_recursive() => {
            join(&dest_dir(dest), tail(&segments, source.recursive_offset()))
        }
        Some(dest) if source.has_wildcard() => {
            // Path relative to the source's parent directory.
            let parent_depth = source.tokens().len().saturating_sub(1);
            join(&dest_dir(dest), tail(&segments, parent_depth))
        }
        Some(dest) if names_directory(dest) => join(&dest_dir(dest), &[base_name]),
        Some(dest) => join(&[], &split_segments(dest).collect::<Vec<_>>()),
    }
}

/// Leading destination segments before the first wildcard segment.
///
/// `Sounds1/**`, `Sounds1/*.*` and `Sounds1/` all name the directory `Sounds1`.
fn dest_dir(dest: &str) -> Vec<&str> {
    split_segments(dest)
        .take_while(|s| !s.contains(['*', '?']))
        .collect()
}

/// A wildcard-free source maps into a directory when the destination ends in
/// a separator, its last segment is a wildcard, or it names the root (`.`).
fn names_directory(dest: &str) -> bool {
    dest.ends_with('/')
        || split_segments(dest)
            .last()
            .map_or(true, |s| s.contains(['*', '?']))
}

fn tail<'a>(segments: &'a [&'a str], skip: usize) -> &'a [&'a str] {
    &segments[skip.min(segments.len())..]
}

fn join(prefix: &[&str], tail: &[&str]) -> String {
    prefix
        .iter()
        .chain(tail)
        .filter(|s| !s.is_empty() && **s != ".")
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}
