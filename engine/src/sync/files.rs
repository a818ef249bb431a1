//! File synchronization strategies

use tracing::{info, warn};

use crate::command::rsync;
use crate::exec::LogStream;
use crate::models::environment::{CloudEnvironment, DesktopEnvironment, Environment, EnvironmentKind};
use crate::models::message::Message;
use crate::storage::settings::Settings;
use crate::sync::SyncMatrix;

/// Transfer strategy chosen from the (source, destination) kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRoute<'a> {
    DesktopToDesktop(&'a DesktopEnvironment, &'a DesktopEnvironment),
    CloudToDesktop(&'a CloudEnvironment, &'a DesktopEnvironment),
    DesktopToCloud(&'a DesktopEnvironment, &'a CloudEnvironment),
    CloudToCloud(&'a CloudEnvironment, &'a CloudEnvironment),
}

impl<'a> FileRoute<'a> {
    pub fn select(source: &'a Environment, destination: &'a Environment) -> Self {
        match (source, destination) {
            (Environment::Desktop(s), Environment::Desktop(d)) => FileRoute::DesktopToDesktop(s, d),
            (Environment::Cloud(s), Environment::Desktop(d)) => FileRoute::CloudToDesktop(s, d),
            (Environment::Desktop(s), Environment::Cloud(d)) => FileRoute::DesktopToCloud(s, d),
            (Environment::Cloud(s), Environment::Cloud(d)) => FileRoute::CloudToCloud(s, d),
        }
    }

    /// `(source, destination)`
    pub fn kinds(&self) -> (EnvironmentKind, EnvironmentKind) {
        use EnvironmentKind::{Cloud, Desktop};
        match self {
            FileRoute::DesktopToDesktop(..) => (Desktop, Desktop),
            FileRoute::CloudToDesktop(..) => (Cloud, Desktop),
            FileRoute::DesktopToCloud(..) => (Desktop, Cloud),
            FileRoute::CloudToCloud(..) => (Cloud, Cloud),
        }
    }

    /// The command transferring the files, run on this machine
    pub fn command(&self, settings: &Settings) -> String {
        let program = &settings.runtime.container_program;
        let sync = &settings.sync;
        match *self {
            FileRoute::DesktopToDesktop(s, d) => rsync::desktop_to_desktop(program, sync, s, d),
            FileRoute::CloudToDesktop(s, d) => rsync::cloud_to_desktop(program, sync, s, d),
            FileRoute::DesktopToCloud(s, d) => rsync::desktop_to_cloud(program, sync, s, d),
            FileRoute::CloudToCloud(s, d) => rsync::cloud_to_cloud(&settings.ssh.program, sync, s, d),
        }
    }
}

impl SyncMatrix {
    /// Copy the public files directory of `source` into `destination`
    pub async fn sync_files(
        &self,
        destination: &Environment,
        source: &Environment,
        stream: &LogStream,
    ) -> Message {
        let route = FileRoute::select(source, destination);
        let (from, to) = route.kinds();
        info!(
            "Synchronizing files {} ({}) -> {} ({})",
            source.machine_name(),
            from,
            destination.machine_name(),
            to
        );

        let message = self
            .executor
            .run_local(&route.command(&self.settings), None, stream)
            .await;

        if !message.is_success() {
            warn!(
                "File synchronization {} -> {} failed",
                source.machine_name(),
                destination.machine_name()
            );
        }
        message
    }
}
