//! Executor backed by the local shell and the system OpenSSH client
//!
//! Every remote call spawns its own `ssh`/`scp` process: one connection,
//! authentication and teardown per call, nothing pooled.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::command::runner::in_directory;
use crate::command::shell::quote;
use crate::exec::capture::{capture, Captured};
use crate::exec::sink::LogStream;
use crate::exec::Executor;
use crate::models::environment::CloudEnvironment;
use crate::models::message::Message;
use crate::storage::settings::{RuntimeSettings, SshSettings};

/// Executes through `sh -c` locally and `ssh`/`scp` remotely
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    search_path: OsString,
    ssh: SshSettings,
}

impl ProcessExecutor {
    pub fn new(runtime: &RuntimeSettings, ssh: &SshSettings) -> Self {
        Self {
            search_path: augmented_path(std::env::var_os("PATH"), &runtime.extra_paths),
            ssh: ssh.clone(),
        }
    }

    /// PATH handed to local commands
    pub fn search_path(&self) -> &OsString {
        &self.search_path
    }

    fn ssh_options(&self, target: &CloudEnvironment) -> Vec<OsString> {
        vec![
            "-i".into(),
            target.ssh_key_path.clone().into_os_string(),
            "-o".into(),
            "BatchMode=yes".into(),
            "-o".into(),
            format!("StrictHostKeyChecking={}", self.ssh.strict_host_key_checking).into(),
        ]
    }

    async fn spawn_and_capture(&self, mut command: Command, stream: &LogStream) -> Result<Captured, String> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| format!("Unable to start command: {}", e))?;

        capture(child, stream)
            .await
            .map_err(|e| format!("Unable to wait for command: {}", e))
    }
}

/// Append `extra` directories to `current` unless already present
pub fn augmented_path(current: Option<OsString>, extra: &[String]) -> OsString {
    let mut paths: Vec<PathBuf> = current
        .as_ref()
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();

    for dir in extra {
        let dir = PathBuf::from(dir);
        if !paths.contains(&dir) {
            paths.push(dir);
        }
    }

    std::env::join_paths(paths).unwrap_or_else(|_| current.unwrap_or_default())
}

fn shell(command: &str) -> Command {
    #[cfg(unix)]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }

    #[cfg(not(unix))]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
}

/// Message for a finished ssh/scp process: stdout (or stderr) on success,
/// stderr (or the exit status) on failure
fn remote_message(captured: &Captured) -> Message {
    let stdout = captured.stdout.trim();
    let stderr = captured.stderr.trim();

    if captured.success() {
        Message::success(if stdout.is_empty() { stderr } else { stdout })
    } else if stderr.is_empty() {
        Message::failure(format!("Remote command failed with {}", captured.status))
    } else {
        Message::failure(stderr)
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn run_local(&self, command: &str, working_dir: Option<&Path>, stream: &LogStream) -> Message {
        debug!("Running local command: {}", command);

        let mut cmd = shell(command);
        cmd.env("PATH", &self.search_path);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        match self.spawn_and_capture(cmd, stream).await {
            Ok(captured) => {
                if !captured.success() {
                    warn!("Local command exited with {}", captured.status);
                }
                Message::from_outcome(captured.success(), captured.combined.trim())
            }
            Err(text) => {
                warn!("{}", text);
                stream.emit(&text);
                Message::failure(text)
            }
        }
    }

    async fn run_remote(&self, command: &str, target: &CloudEnvironment, stream: &LogStream) -> Message {
        debug!("Running remote command on {}: {}", target.host, command);

        let mut cmd = Command::new(&self.ssh.program);
        cmd.args(self.ssh_options(target))
            .arg(target.destination())
            .arg(in_directory(target.working_dir(), command));

        match self.spawn_and_capture(cmd, stream).await {
            Ok(captured) => {
                if !captured.success() {
                    warn!("Remote command on {} exited with {}", target.host, captured.status);
                }
                remote_message(&captured)
            }
            Err(text) => {
                warn!("{}", text);
                stream.emit(&text);
                Message::failure(text)
            }
        }
    }

    async fn fetch_file(&self, target: &CloudEnvironment, remote_path: &str, local_path: &Path) -> Message {
        debug!("Fetching {}:{} into {}", target.host, remote_path, local_path.display());

        let mut cmd = Command::new(&self.ssh.scp_program);
        cmd.args(self.ssh_options(target))
            .arg(format!("{}:{}", target.destination(), quote(remote_path)))
            .arg(local_path);

        match self.spawn_and_capture(cmd, &LogStream::silent()).await {
            Ok(captured) if captured.success() => Message::success(format!(
                "Copied {}:{} to {}",
                target.host,
                remote_path,
                local_path.display()
            )),
            Ok(captured) => remote_message(&captured),
            Err(text) => Message::failure(text),
        }
    }

    async fn push_file(&self, target: &CloudEnvironment, local_path: &Path, remote_path: &str) -> Message {
        debug!("Pushing {} to {}:{}", local_path.display(), target.host, remote_path);

        let mut cmd = Command::new(&self.ssh.scp_program);
        cmd.args(self.ssh_options(target))
            .arg(local_path)
            .arg(format!("{}:{}", target.destination(), quote(remote_path)));

        match self.spawn_and_capture(cmd, &LogStream::silent()).await {
            Ok(captured) if captured.success() => Message::success(format!(
                "Copied {} to {}:{}",
                local_path.display(),
                target.host,
                remote_path
            )),
            Ok(captured) => remote_message(&captured),
            Err(text) => Message::failure(text),
        }
    }
}
