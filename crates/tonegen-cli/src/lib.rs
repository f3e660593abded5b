//! tonegen CLI library.
//!
//! Holds the subcommand implementations behind the `tonegen` binary so they
//! can be driven from tests without spawning a process.

pub mod commands;
