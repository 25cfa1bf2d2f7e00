//! Zero-match confirmation prompt.

use anyhow::Result;
use std::io::{self, BufRead, IsTerminal, Write};

/// Ask the operator whether to pack despite rules that matched nothing.
///
/// Returns `false` without asking when stdin is not a terminal.
pub fn confirm_missing(missing: &[&str]) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        tracing::warn!("stdin is not a terminal, treating missing rules as fatal");
        return Ok(false);
    }
    Ok(ask(missing, &mut stdin.lock(), &mut io::stdout())?)
}

/// Print the missing rules to `out` and read a y/N answer from `input`.
pub fn ask(missing: &[&str], input: &mut impl BufRead, out: &mut impl Write) -> io::Result<bool> {
    writeln!(out, "The following rule(s) matched no files:")?;
    for rule in missing {
        writeln!(out, "  - {}", rule)?;
    }
    write!(out, "Continue packing anyway? [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
