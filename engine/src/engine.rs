//! The engine facade
//!
//! Wires executor, sinks, journal and settings together and exposes every
//! environment operation. Operations given an identifier stream their
//! output under it and are recorded in the journal.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::command::naming::namespace;
use crate::deploy::orchestrator::{deploy, DeployRunner};
use crate::deploy::pipeline::FailurePolicy;
use crate::deploy::plan::build_plan;
use crate::deploy::tags::today;
use crate::errors::EngineError;
use crate::exec::{Dispatcher, Executor, LogSink, LogStream, ProcessExecutor};
use crate::infra::bootstrap::{Bootstrap, Check};
use crate::infra::{InfrastructureManager, InfrastructureStatus};
use crate::models::deployment::{ActionSet, DeployRequest};
use crate::models::environment::{Environment, Project};
use crate::models::log::LogEntry;
use crate::models::message::Message;
use crate::storage::journal::{FileJournal, Journal};
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::sync::SyncMatrix;

pub struct Engine {
    settings: Settings,
    layout: StorageLayout,
    dispatcher: Dispatcher,
    infrastructure: InfrastructureManager,
    sync: SyncMatrix,
    bootstrap: Bootstrap,
    sink: Arc<dyn LogSink>,
    journal: Option<Arc<dyn Journal>>,
}

impl Engine {
    pub fn new(
        settings: Settings,
        layout: StorageLayout,
        executor: Arc<dyn Executor>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(executor.clone(), &settings.runtime.container_program),
            infrastructure: InfrastructureManager::new(
                executor.clone(),
                layout.clone(),
                &settings.runtime.compose_command,
            ),
            sync: SyncMatrix::new(executor.clone(), settings.clone(), layout.tmp_dir()),
            bootstrap: Bootstrap::new(
                executor,
                layout.clone(),
                settings.runtime.clone(),
                settings.sync.clone(),
            ),
            settings,
            layout,
            sink,
            journal: None,
        }
    }

    /// Engine running real processes and journaling under `layout`
    pub fn with_processes(settings: Settings, layout: StorageLayout, sink: Arc<dyn LogSink>) -> Self {
        let executor = Arc::new(ProcessExecutor::new(&settings.runtime, &settings.ssh));
        let journal = Arc::new(FileJournal::new(layout.journal_file()));
        Self::new(settings, layout, executor, sink).with_journal(journal)
    }

    /// Like [`Engine::with_processes`], reading settings from `layout`
    pub async fn load(layout: StorageLayout, sink: Arc<dyn LogSink>) -> Result<Self, EngineError> {
        layout.setup().await?;
        let settings = Settings::load(&layout.settings_file()).await?;
        Ok(Self::with_processes(settings, layout, sink))
    }

    pub fn with_journal(mut self, journal: Arc<dyn Journal>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn stream(&self, identifier: Option<&str>) -> LogStream {
        LogStream::new(identifier.map(str::to_string), self.sink.clone())
    }

    /// Run `operation`, journaling it when an identifier is given
    async fn journaled<F, Fut>(
        &self,
        identifier: Option<&str>,
        environment: Option<&Environment>,
        command: &str,
        operation: F,
    ) -> Message
    where
        F: FnOnce(LogStream) -> Fut,
        Fut: Future<Output = Message>,
    {
        let stream = self.stream(identifier);
        let journal = identifier.zip(self.journal.as_ref());

        if let Some((identifier, journal)) = journal {
            let entry = LogEntry::pending(
                identifier,
                environment.map(|e| e.machine_name().to_string()),
                command,
            );
            if let Err(e) = journal.begin(entry).await {
                warn!("Unable to journal operation {}: {}", identifier, e);
            }
        }

        let result = operation(stream).await;

        if let Some((identifier, journal)) = journal {
            if let Err(e) = journal.complete(identifier, &result).await {
                warn!("Unable to complete journal entry {}: {}", identifier, e);
            }
        }

        result
    }

    // Infrastructure

    fn desktop_root<'e>(&self, environment: &'e Environment) -> Result<&'e Path, EngineError> {
        match environment {
            Environment::Desktop(desktop) => Ok(&desktop.root),
            Environment::Cloud(_) => Err(EngineError::ConfigError(format!(
                "{} is a cloud environment and has no infrastructure",
                environment.machine_name()
            ))),
        }
    }

    /// Write the topology document of a desktop environment
    pub async fn create_infrastructure(
        &self,
        project: &Project,
        environment: &Environment,
        services: &BTreeMap<String, bool>,
    ) -> Result<PathBuf, EngineError> {
        let root = self.desktop_root(environment)?;
        self.infrastructure
            .create(&namespace(project, environment), root, services)
            .await
    }

    /// Write the topology document and bring it up
    pub async fn build_infrastructure(
        &self,
        project: &Project,
        environment: &Environment,
        services: &BTreeMap<String, bool>,
        identifier: Option<&str>,
    ) -> Result<(PathBuf, Message), EngineError> {
        let path = self.create_infrastructure(project, environment, services).await?;
        let command = format!("infrastructure up {}", path.display());
        let document = path.as_path();
        let message = self
            .journaled(identifier, Some(environment), &command, |stream| async move {
                self.infrastructure.up(document, &stream).await
            })
            .await;
        Ok((path, message))
    }

    pub async fn up(&self, path: &Path, identifier: Option<&str>) -> Message {
        let command = format!("infrastructure up {}", path.display());
        self.journaled(identifier, None, &command, |stream| async move {
            self.infrastructure.up(path, &stream).await
        })
        .await
    }

    pub async fn start(&self, path: &Path, identifier: Option<&str>) -> Message {
        let command = format!("infrastructure start {}", path.display());
        self.journaled(identifier, None, &command, |stream| async move {
            self.infrastructure.start(path, &stream).await
        })
        .await
    }

    pub async fn stop(&self, path: &Path, identifier: Option<&str>) -> Message {
        let command = format!("infrastructure stop {}", path.display());
        self.journaled(identifier, None, &command, |stream| async move {
            self.infrastructure.stop(path, &stream).await
        })
        .await
    }

    pub async fn down(&self, path: &Path, identifier: Option<&str>) -> Message {
        let command = format!("infrastructure down {}", path.display());
        self.journaled(identifier, None, &command, |stream| async move {
            self.infrastructure.down(path, &stream).await
        })
        .await
    }

    pub async fn status(&self, path: &Path) -> InfrastructureStatus {
        self.infrastructure.status(path, &LogStream::silent()).await
    }

    /// Enable or disable an optional service; returns whether the document changed
    pub async fn activate(
        &self,
        project: &Project,
        environment: &Environment,
        service: &str,
        enabled: bool,
        path: &Path,
    ) -> Result<bool, EngineError> {
        self.infrastructure
            .activate(&namespace(project, environment), service, enabled, path)
            .await
    }

    /// Tear down an environment's containers and remove its documents
    pub async fn destroy_infrastructure(
        &self,
        path: &Path,
        identifier: Option<&str>,
    ) -> Result<Message, EngineError> {
        let stream = self.stream(identifier);
        self.infrastructure.destroy(path, &stream).await
    }

    pub async fn bootstrap(&self, identifier: Option<&str>) -> Vec<Check> {
        self.bootstrap.run(&self.stream(identifier)).await
    }

    // Commands

    pub async fn run_desktop(
        &self,
        command: &str,
        project: &Project,
        environment: &Environment,
        identifier: Option<&str>,
    ) -> Message {
        self.journaled(identifier, Some(environment), command, |stream| async move {
            self.dispatcher
                .run_desktop(project, environment, command, &stream)
                .await
        })
        .await
    }

    pub async fn run_cloud(
        &self,
        command: &str,
        environment: &Environment,
        identifier: Option<&str>,
    ) -> Message {
        self.journaled(identifier, Some(environment), command, |stream| async move {
            self.dispatcher.run_cloud(environment, command, &stream).await
        })
        .await
    }

    pub async fn run_os(
        &self,
        command: &str,
        environment: Option<&Environment>,
        identifier: Option<&str>,
    ) -> Message {
        self.journaled(identifier, environment, command, |stream| async move {
            self.dispatcher.run_os(command, environment, &stream).await
        })
        .await
    }

    /// Application command, routed by environment kind
    pub async fn run_command(
        &self,
        command: &str,
        project: &Project,
        environment: &Environment,
        identifier: Option<&str>,
    ) -> Message {
        self.journaled(identifier, Some(environment), command, |stream| async move {
            self.dispatcher
                .run_command(project, environment, command, &stream)
                .await
        })
        .await
    }

    // Synchronization

    pub async fn export_database(
        &self,
        project: &Project,
        environment: &Environment,
        export_dir: &Path,
        identifier: Option<&str>,
    ) -> Message {
        self.journaled(identifier, Some(environment), "database export", |stream| async move {
            self.sync
                .export_database(project, environment, export_dir, &stream)
                .await
        })
        .await
    }

    pub async fn import_database(
        &self,
        project: &Project,
        environment: &Environment,
        dump: &Path,
        identifier: Option<&str>,
    ) -> Message {
        self.journaled(identifier, Some(environment), "database import", |stream| async move {
            self.sync
                .import_database(project, environment, dump, &stream)
                .await
        })
        .await
    }

    pub async fn sync_database(
        &self,
        project: &Project,
        destination: &Environment,
        source: &Environment,
        identifier: Option<&str>,
    ) -> Message {
        let command = format!("database sync from {}", source.machine_name());
        self.journaled(identifier, Some(destination), &command, |stream| async move {
            self.sync
                .sync_database(project, destination, source, &stream)
                .await
        })
        .await
    }

    pub async fn sync_files(
        &self,
        destination: &Environment,
        source: &Environment,
        identifier: Option<&str>,
    ) -> Message {
        let command = format!("files sync from {}", source.machine_name());
        self.journaled(identifier, Some(destination), &command, |stream| async move {
            self.sync.sync_files(destination, source, &stream).await
        })
        .await
    }

    // Deployments

    /// Release `source` as a new tag and check it out on `environment`
    pub async fn deploy(
        &self,
        project: &Project,
        environment: &Environment,
        request: &DeployRequest,
        source: &Environment,
        identifier: Option<&str>,
    ) -> Message {
        let command = format!("deploy from {}", source.machine_name());
        self.journaled(identifier, Some(environment), &command, |stream| async move {
            let steps = build_plan(
                &ActionSet::new(request.actions.iter().cloned()),
                self.layout.backups_dir().path(),
            );
            let runner = DeployRunner::new(
                &self.dispatcher,
                &self.sync,
                project,
                source,
                environment,
                request.commit_message.as_str(),
                today(),
            );
            let policy = FailurePolicy::from_halt(self.settings.deploy.halt_on_failure);

            let report = deploy(&runner, steps, policy, &stream).await;
            if let Some(tag) = runner.release_tag().await {
                info!("Deployment released {}", tag);
            }
            Message::from(report)
        })
        .await
    }
}
