//! CLI command handlers.
//!
//! - `pack` - Resolve a manifest and write the archive
//! - `prompt` - Zero-match confirmation

pub mod pack;
pub mod prompt;

pub use pack::{cmd_pack, PackOptions, PackOutcome};
