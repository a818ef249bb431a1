//! Command execution against local and remote targets

pub mod capture;
pub mod dispatch;
pub mod process;
pub mod sink;

use std::path::Path;

use async_trait::async_trait;

use crate::models::environment::CloudEnvironment;
use crate::models::message::Message;

pub use dispatch::Dispatcher;
pub use process::ProcessExecutor;
pub use sink::{ChannelSink, ConsoleSink, LogEvent, LogSink, LogStream, NullSink};

/// Runs commands and moves files
///
/// Implementations never fail with an error: spawn, exit and connection
/// problems are all reported as a failed [`Message`].
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `command` through the local shell
    async fn run_local(&self, command: &str, working_dir: Option<&Path>, stream: &LogStream) -> Message;

    /// Run `command` on a cloud host, from its application root
    async fn run_remote(&self, command: &str, target: &CloudEnvironment, stream: &LogStream) -> Message;

    /// Download `remote_path` from a cloud host into `local_path`
    async fn fetch_file(&self, target: &CloudEnvironment, remote_path: &str, local_path: &Path) -> Message;

    /// Upload `local_path` to `remote_path` on a cloud host
    async fn push_file(&self, target: &CloudEnvironment, local_path: &Path, remote_path: &str) -> Message;
}
