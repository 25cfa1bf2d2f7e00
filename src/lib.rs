//! ziplist - pack files into a ZIP archive from a `.ziplist` manifest.
//!
//! A manifest is an ordered list of add and exclude rules:
//!
//! ```text
//! # everything under Sounds/, keeping its subdirectories
//! Sounds/**
//! !**/*.wav
//! Debug/AgentExe.exe -> bin/Agent.exe
//! *.dll -> lib
//! ```
//!
//! [`manifest`] parses the rules, [`resolve`] turns them into a final
//! source-to-archive-path mapping under a chosen [`resolve::Policy`], and
//! [`archive`] writes it. The binary wires these together in
//! [`commands::cmd_pack`].

pub mod archive;
pub mod commands;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod manifest;
pub mod pattern;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod timing;

pub use error::PackError;
