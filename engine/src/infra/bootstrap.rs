//! Host preparation shared by every desktop environment

use std::sync::Arc;

use tracing::{info, warn};

use crate::command::compose::{lifecycle, Lifecycle};
use crate::command::runtime::{network_create, network_list, pull_image};
use crate::exec::{Executor, LogStream};
use crate::models::message::Message;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::{RuntimeSettings, SyncSettings};

/// Outcome of one bootstrap check
#[derive(Debug, Clone)]
pub struct Check {
    pub name: &'static str,
    pub result: Message,
}

pub struct Bootstrap {
    executor: Arc<dyn Executor>,
    layout: StorageLayout,
    runtime: RuntimeSettings,
    sync: SyncSettings,
}

impl Bootstrap {
    pub fn new(
        executor: Arc<dyn Executor>,
        layout: StorageLayout,
        runtime: RuntimeSettings,
        sync: SyncSettings,
    ) -> Self {
        Self {
            executor,
            layout,
            runtime,
            sync,
        }
    }

    /// Create the shared external network unless it exists
    pub async fn ensure_network(&self, stream: &LogStream) -> Message {
        let program = &self.runtime.container_program;
        let network = &self.runtime.network;

        let listing = self
            .executor
            .run_local(&network_list(program, network), None, stream)
            .await;
        if !listing.is_success() {
            return listing;
        }

        if listing.message().lines().any(|line| line.trim() == network) {
            return Message::success(format!("Network {} exists", network));
        }

        info!("Creating network {}", network);
        let created = self
            .executor
            .run_local(&network_create(program, network), None, stream)
            .await;
        if created.is_success() {
            created.with_message(format!("Network {} created", network))
        } else {
            created
        }
    }

    pub async fn pull_sync_image(&self, stream: &LogStream) -> Message {
        self.executor
            .run_local(
                &pull_image(&self.runtime.container_program, &self.sync.rsync_image),
                None,
                stream,
            )
            .await
    }

    /// Bring up the shared reverse proxy
    pub async fn proxy_up(&self, stream: &LogStream) -> Message {
        let proxy = self.layout.proxy_file();
        if !proxy.exists().await {
            return Message::failure(format!(
                "Proxy topology {} does not exist",
                proxy.path().display()
            ));
        }

        let command = lifecycle(&self.runtime.compose_command, proxy.path(), Lifecycle::Up);
        self.executor.run_local(&command, None, stream).await
    }

    /// Run every check in order; later checks run even if earlier ones fail
    pub async fn run(&self, stream: &LogStream) -> Vec<Check> {
        let checks = vec![
            Check {
                name: "network",
                result: self.ensure_network(stream).await,
            },
            Check {
                name: "sync-image",
                result: self.pull_sync_image(stream).await,
            },
            Check {
                name: "proxy",
                result: self.proxy_up(stream).await,
            },
        ];

        for check in checks.iter().filter(|c| !c.result.is_success()) {
            warn!("Bootstrap check '{}' failed: {}", check.name, check.result.message());
        }

        checks
    }
}
