//! Release commands run inside a checkout

use crate::command::shell::ShellCommand;
use crate::deploy::tags::ReleaseTag;

pub fn fetch_tags() -> String {
    ShellCommand::new("git").args(["fetch", "--tags"]).render()
}

pub fn list_tags() -> String {
    ShellCommand::new("git").arg("tag").render()
}

/// Annotated tag carrying `annotation`
pub fn create_tag(tag: &ReleaseTag, annotation: &str) -> String {
    ShellCommand::new("git")
        .args(["tag", "-a"])
        .value(tag.to_string())
        .arg("-m")
        .value(annotation)
        .render()
}

pub fn push_tag(tag: &ReleaseTag) -> String {
    ShellCommand::new("git")
        .args(["push", "origin"])
        .value(tag.to_string())
        .render()
}

pub fn checkout(tag: &ReleaseTag) -> String {
    ShellCommand::new("git")
        .arg("checkout")
        .value(tag.to_string())
        .render()
}
