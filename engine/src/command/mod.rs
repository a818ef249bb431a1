//! Command builders
//!
//! Pure functions rendering shell command lines. Nothing in this module
//! executes anything.

pub mod compose;
pub mod database;
pub mod files;
pub mod git;
pub mod naming;
pub mod rsync;
pub mod runner;
pub mod runtime;
pub mod shell;

pub use shell::{quote, ShellCommand};
