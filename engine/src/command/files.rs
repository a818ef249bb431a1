//! File copy and removal commands

use std::path::Path;

use crate::command::shell::ShellCommand;

/// Copy a host file into a container
pub fn copy_into_container(
    container_program: &str,
    local_path: &Path,
    container: &str,
    container_path: &str,
) -> String {
    ShellCommand::new(container_program)
        .arg("cp")
        .value(local_path.to_string_lossy())
        .value(format!("{}:{}", container, container_path))
        .render()
}

/// Remove a file inside a container
pub fn remove_in_container(container_program: &str, container: &str, container_path: &str) -> String {
    ShellCommand::new(container_program)
        .arg("exec")
        .value(container)
        .arg("rm")
        .value(container_path)
        .render()
}

/// Remove a file on a cloud host
pub fn remove_remote(remote_path: &str) -> String {
    ShellCommand::new("rm").arg("-f").value(remote_path).render()
}
