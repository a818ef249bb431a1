//! Container runtime housekeeping commands

use crate::command::shell::ShellCommand;

/// Lists networks named exactly `network`, one name per line
pub fn network_list(container_program: &str, network: &str) -> String {
    ShellCommand::new(container_program)
        .args(["network", "ls"])
        .arg("--filter")
        .value(format!("name=^{}$", network))
        .arg("--format")
        .value("{{.Name}}")
        .render()
}

pub fn network_create(container_program: &str, network: &str) -> String {
    ShellCommand::new(container_program)
        .args(["network", "create"])
        .value(network)
        .render()
}

pub fn pull_image(container_program: &str, image: &str) -> String {
    ShellCommand::new(container_program)
        .arg("pull")
        .value(image)
        .render()
}
