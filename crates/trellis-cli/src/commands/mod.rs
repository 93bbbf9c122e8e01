//! Subcommand handlers.  Each module exposes one `execute` function.

pub mod completions;
pub mod config;
pub mod init;
pub mod new;
pub mod options;
pub mod steps;
