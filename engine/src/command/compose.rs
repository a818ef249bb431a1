//! Infrastructure lifecycle commands

use std::path::Path;

use crate::command::shell::ShellCommand;

/// Lifecycle operation against a topology document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Up,
    Start,
    Stop,
    Down,
    Status,
}

impl Lifecycle {
    fn args(&self) -> &'static [&'static str] {
        match self {
            Lifecycle::Up => &["up", "-d", "--remove-orphans"],
            Lifecycle::Start => &["start"],
            Lifecycle::Stop => &["stop"],
            Lifecycle::Down => &["down"],
            Lifecycle::Status => &["ps", "--all", "--format", "json"],
        }
    }
}

/// `<compose> -f <document> <operation...>`
pub fn lifecycle(compose_command: &str, document: &Path, operation: Lifecycle) -> String {
    ShellCommand::new(compose_command)
        .arg("-f")
        .value(document.to_string_lossy())
        .args(operation.args().iter().copied())
        .render()
}
