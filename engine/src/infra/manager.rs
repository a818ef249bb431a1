//! Infrastructure manager
//!
//! Owns the per-environment topology documents: seeds them from the base
//! template, toggles optional services and drives their lifecycle through
//! the executor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::compose::{lifecycle, Lifecycle};
use crate::command::naming::{
    database_container, primary_container, primary_hostname, service_container, service_hostname,
};
use crate::errors::EngineError;
use crate::exec::{Executor, LogStream};
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::infra::document::TopologyDocument;
use crate::infra::status::{parse_status_output, StatusEntry};
use crate::models::message::Message;
use crate::storage::layout::StorageLayout;

/// Service serving the application
pub const PRIMARY_SERVICE: &str = "drupal";

/// Service holding the database
pub const DATABASE_SERVICE: &str = "database";

/// Mount point of the environment root inside the primary container
pub const APPLICATION_MOUNT: &str = "/opt/drupal";

/// Result of a status call
#[derive(Debug, Clone, Serialize)]
pub struct InfrastructureStatus {
    pub success: bool,
    pub entries: Vec<StatusEntry>,
}

impl InfrastructureStatus {
    pub fn running(&self) -> usize {
        self.entries.iter().filter(|e| e.is_running()).count()
    }
}

fn is_core_service(service: &str) -> bool {
    service == PRIMARY_SERVICE || service == DATABASE_SERVICE
}

/// Rewrite the container name and hostname label of `service` for `namespace`
fn apply_identity(
    document: &mut TopologyDocument,
    service: &str,
    namespace: &str,
) -> Result<(), EngineError> {
    match service {
        PRIMARY_SERVICE => {
            document.set_container_name(service, &primary_container(namespace))?;
            document.set_public_hostname(service, &primary_hostname(namespace))
        }
        DATABASE_SERVICE => document.set_container_name(service, &database_container(namespace)),
        _ => {
            document.set_container_name(service, &service_container(service, namespace))?;
            document.set_public_hostname(service, &service_hostname(service, namespace))
        }
    }
}

/// Build a document for `namespace` from the base template
///
/// Optional services are kept only when `services` enables them.
pub fn instantiate(
    base: &TopologyDocument,
    namespace: &str,
    environment_root: &Path,
    services: &BTreeMap<String, bool>,
) -> Result<TopologyDocument, EngineError> {
    let mut document = base.clone();

    for service in base.service_names() {
        if is_core_service(&service) {
            continue;
        }
        if !services.get(&service).copied().unwrap_or(false) {
            document.remove_service(&service);
        }
    }

    for service in [PRIMARY_SERVICE, DATABASE_SERVICE] {
        if !document.has_service(service) {
            return Err(EngineError::DocumentError(format!(
                "base template has no '{}' service",
                service
            )));
        }
    }

    for service in document.service_names() {
        apply_identity(&mut document, &service, namespace)?;
    }

    document.set_primary_volume(
        PRIMARY_SERVICE,
        &format!("{}:{}", environment_root.display(), APPLICATION_MOUNT),
    )?;

    Ok(document)
}

/// Enable or disable one optional service in `document`
///
/// Returns whether the document changed.
pub fn toggle_service(
    document: &mut TopologyDocument,
    base: &TopologyDocument,
    namespace: &str,
    service: &str,
    enable: bool,
) -> Result<bool, EngineError> {
    if is_core_service(service) {
        return Err(EngineError::ConfigError(format!(
            "'{}' is a core service and cannot be toggled",
            service
        )));
    }

    match (enable, document.has_service(service)) {
        (true, false) => {
            let definition = base.service(service).cloned().ok_or_else(|| {
                EngineError::DocumentError(format!(
                    "base template has no '{}' service",
                    service
                ))
            })?;
            document.insert_service(service, definition);
            apply_identity(document, service, namespace)?;
            Ok(true)
        }
        (false, true) => Ok(document.remove_service(service).is_some()),
        _ => Ok(false),
    }
}

pub struct InfrastructureManager {
    executor: Arc<dyn Executor>,
    layout: StorageLayout,
    compose_command: String,
}

impl InfrastructureManager {
    pub fn new(executor: Arc<dyn Executor>, layout: StorageLayout, compose_command: impl Into<String>) -> Self {
        Self {
            executor,
            layout,
            compose_command: compose_command.into(),
        }
    }

    pub async fn load_base(&self) -> Result<TopologyDocument, EngineError> {
        TopologyDocument::load(&self.layout.base_template()).await
    }

    /// Write the topology document of `namespace` and return its path
    pub async fn create(
        &self,
        namespace: &str,
        environment_root: &Path,
        services: &BTreeMap<String, bool>,
    ) -> Result<PathBuf, EngineError> {
        info!("Creating infrastructure for {}", namespace);

        let base = self.load_base().await?;
        let document = instantiate(&base, namespace, environment_root, services)?;

        let file = self.layout.infrastructure_file(namespace);
        document.save(&file).await?;
        debug!("Infrastructure document written to {}", file.path().display());

        Ok(file.path().to_path_buf())
    }

    /// Enable or disable `service` in the document at `path`
    ///
    /// The document is only rewritten when it changes.
    pub async fn activate(
        &self,
        namespace: &str,
        service: &str,
        enable: bool,
        path: &Path,
    ) -> Result<bool, EngineError> {
        let file = File::new(path);
        let mut document = TopologyDocument::load(&file).await?;

        // The base template is only needed to add a service
        let base = if enable && !document.has_service(service) {
            self.load_base().await?
        } else {
            document.clone()
        };
        let changed = toggle_service(&mut document, &base, namespace, service, enable)?;

        if changed {
            info!(
                "{} service '{}' for {}",
                if enable { "Enabled" } else { "Disabled" },
                service,
                namespace
            );
            document.save(&file).await?;
        } else {
            debug!(
                "Service '{}' already {} for {}",
                service,
                if enable { "enabled" } else { "disabled" },
                namespace
            );
        }

        Ok(changed)
    }

    async fn run(&self, path: &Path, operation: Lifecycle, stream: &LogStream) -> Message {
        let command = lifecycle(&self.compose_command, path, operation);
        let message = self.executor.run_local(&command, None, stream).await;
        if !message.is_success() {
            warn!("{:?} failed for {}", operation, path.display());
        }
        message
    }

    pub async fn up(&self, path: &Path, stream: &LogStream) -> Message {
        self.run(path, Lifecycle::Up, stream).await
    }

    pub async fn start(&self, path: &Path, stream: &LogStream) -> Message {
        self.run(path, Lifecycle::Start, stream).await
    }

    pub async fn stop(&self, path: &Path, stream: &LogStream) -> Message {
        self.run(path, Lifecycle::Stop, stream).await
    }

    pub async fn down(&self, path: &Path, stream: &LogStream) -> Message {
        self.run(path, Lifecycle::Down, stream).await
    }

    /// Up when `power` is set, stop otherwise
    pub async fn power(&self, path: &Path, power: bool, stream: &LogStream) -> Message {
        if power {
            self.up(path, stream).await
        } else {
            self.stop(path, stream).await
        }
    }

    pub async fn status(&self, path: &Path, stream: &LogStream) -> InfrastructureStatus {
        let message = self.run(path, Lifecycle::Status, stream).await;
        InfrastructureStatus {
            success: message.is_success(),
            entries: parse_status_output(message.message()),
        }
    }

    /// Tear down containers and remove the directory holding the document
    pub async fn destroy(&self, path: &Path, stream: &LogStream) -> Result<Message, EngineError> {
        let message = self.down(path, stream).await;

        let Some(parent) = path.parent() else {
            return Ok(message);
        };
        let dir = Dir::new(parent);
        if dir.exists().await {
            dir.delete().await?;
            info!("Removed {}", parent.display());
        }

        Ok(message)
    }
}
