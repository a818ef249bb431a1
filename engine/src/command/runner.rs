//! Wrappers running application commands inside an environment

use crate::command::naming::primary_container;
use crate::command::shell::{quote, ShellCommand};
use crate::models::environment::CloudEnvironment;

/// Feed `command` to a shell inside the environment's primary container
///
/// The heredoc delimiter is chosen so it never collides with a line of the
/// command itself.
pub fn in_container(container_program: &str, namespace: &str, command: &str) -> String {
    let mut delimiter = String::from("EOF");
    while command.lines().any(|line| line.trim() == delimiter) {
        delimiter.push('_');
    }

    let prefix = ShellCommand::new(container_program)
        .arg("exec")
        .arg("-i")
        .value(primary_container(namespace))
        .arg("bash")
        .render();

    format!("{} <<'{}'\n{}\n{}", prefix, delimiter, command, delimiter)
}

/// Prefix `command` with the task runner's directory on PATH
pub fn with_task_runner(environment: &CloudEnvironment, command: &str) -> String {
    match environment.drush_path.as_deref() {
        Some(drush_path) => format!("export PATH=$PATH:{} && {}", quote(drush_path), command),
        None => command.to_string(),
    }
}

/// `cd <dir> && <command>`, run by the remote login shell
pub fn in_directory(directory: &str, command: &str) -> String {
    format!("cd {} && {}", quote(directory), command)
}
