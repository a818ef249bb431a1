//! File synchronization commands, one per (source, destination) kind pair
//!
//! Each command runs on the operator's machine. Transfers touching the local
//! container runtime go through a disposable rsync container; cloud to cloud
//! transfers go through a reverse SSH tunnel opened on the source host.

use crate::command::shell::{quote, ShellCommand};
use crate::models::environment::{CloudEnvironment, DesktopEnvironment};
use crate::storage::settings::SyncSettings;

/// Where the private key is mounted inside the rsync container
const CONTAINER_KEY_PATH: &str = "/keys/id_rsa";

/// Host key verification is disabled for cross-host transfers
const UNVERIFIED_HOST_OPTIONS: [&str; 8] = [
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
    "-o",
    "AddKeysToAgent=yes",
    "-o",
    "GlobalKnownHostsFile=/dev/null",
];

fn desktop_files(sync: &SyncSettings, environment: &DesktopEnvironment) -> String {
    environment
        .root
        .join(&sync.files_path)
        .to_string_lossy()
        .into_owned()
}

fn cloud_files(sync: &SyncSettings, environment: &CloudEnvironment) -> String {
    format!("{}/{}", environment.root.trim_end_matches('/'), sync.files_path)
}

fn mount(host_path: &str, container_path: &str) -> String {
    format!("{}:{}", host_path, container_path)
}

fn container_remote_shell() -> String {
    format!("ssh -i {} -o StrictHostKeyChecking=no", CONTAINER_KEY_PATH)
}

/// Both sides are local bind mounts; permissions and ownership are preserved
pub fn desktop_to_desktop(
    container_program: &str,
    sync: &SyncSettings,
    source: &DesktopEnvironment,
    destination: &DesktopEnvironment,
) -> String {
    ShellCommand::new(container_program)
        .args(["run", "--rm", "-v"])
        .value(mount(&desktop_files(sync, source), "/source"))
        .arg("-v")
        .value(mount(&desktop_files(sync, destination), "/destination"))
        .value(&sync.rsync_image)
        .args(["rsync", "-av", "/source/", "/destination/"])
        .render()
}

/// Pull from the cloud host into the local files directory
pub fn cloud_to_desktop(
    container_program: &str,
    sync: &SyncSettings,
    source: &CloudEnvironment,
    destination: &DesktopEnvironment,
) -> String {
    ShellCommand::new(container_program)
        .args(["run", "--rm", "-v"])
        .value(mount(&source.ssh_key_path.to_string_lossy(), CONTAINER_KEY_PATH))
        .arg("-v")
        .value(mount(&format!("{}/", desktop_files(sync, destination)), "/destination"))
        .value(&sync.rsync_image)
        .args(["rsync", "-avz", "--no-perms", "--no-owner", "--no-group", "-e"])
        .value(container_remote_shell())
        .value(format!("{}:{}/", source.destination(), cloud_files(sync, source)))
        .arg("/destination/")
        .render()
}

/// Push the local files directory to the cloud host
pub fn desktop_to_cloud(
    container_program: &str,
    sync: &SyncSettings,
    source: &DesktopEnvironment,
    destination: &CloudEnvironment,
) -> String {
    ShellCommand::new(container_program)
        .args(["run", "--rm", "-v"])
        .value(mount(&destination.ssh_key_path.to_string_lossy(), CONTAINER_KEY_PATH))
        .arg("-v")
        .value(mount(&format!("{}/", desktop_files(sync, source)), "/source"))
        .value(&sync.rsync_image)
        .args(["rsync", "-avz", "--no-perms", "--no-owner", "--no-group", "-e"])
        .value(container_remote_shell())
        .arg("/source/")
        .value(format!("{}:{}/", destination.destination(), cloud_files(sync, destination)))
        .render()
}

/// Tunnel from the source host back through this machine to the destination
///
/// The source host binds `tunnel_host:tunnel_port`, forwarded to the
/// destination's SSH port, and runs rsync against it with the forwarded agent.
pub fn cloud_to_cloud(
    ssh_program: &str,
    sync: &SyncSettings,
    source: &CloudEnvironment,
    destination: &CloudEnvironment,
) -> String {
    let nested_shell = ShellCommand::new("ssh")
        .arg("-A")
        .args(UNVERIFIED_HOST_OPTIONS)
        .arg("-p")
        .arg(sync.tunnel_port.to_string())
        .render();

    let remote_rsync = ShellCommand::new("rsync")
        .args(["--no-perms", "--no-owner", "--no-group", "-e"])
        .value(nested_shell)
        .arg("-var")
        .value(format!("{}/", cloud_files(sync, source)))
        .value(format!(
            "{}@{}:{}",
            destination.user,
            sync.tunnel_host,
            cloud_files(sync, destination)
        ))
        .render();

    ShellCommand::new(&quote(ssh_program))
        .arg("-A")
        .arg("-i")
        .value(source.ssh_key_path.to_string_lossy())
        .args(UNVERIFIED_HOST_OPTIONS)
        .arg("-R")
        .value(format!(
            "{}:{}:{}:22",
            sync.tunnel_host, sync.tunnel_port, destination.host
        ))
        .value(source.destination())
        .value(remote_rsync)
        .render()
}
