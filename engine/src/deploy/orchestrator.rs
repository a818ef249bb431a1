//! Runs a deployment plan between two environments of a project

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::command::git;
use crate::deploy::pipeline::{FailurePolicy, Pipeline, PipelineReport, Step, StepRunner};
use crate::deploy::plan::{DeployAction, Side, COMPOSER_INSTALL};
use crate::deploy::tags::{next_release_tag, parse_tag_list, ReleaseTag};
use crate::exec::{Dispatcher, LogStream};
use crate::models::environment::{Environment, Project};
use crate::models::message::Message;
use crate::sync::SyncMatrix;

/// Executes [`DeployAction`]s for one deployment
pub struct DeployRunner<'a> {
    dispatcher: &'a Dispatcher,
    sync: &'a SyncMatrix,
    project: &'a Project,
    source: &'a Environment,
    destination: &'a Environment,
    annotation: String,
    today: NaiveDate,
    tag: Mutex<Option<ReleaseTag>>,
}

impl<'a> DeployRunner<'a> {
    pub fn new(
        dispatcher: &'a Dispatcher,
        sync: &'a SyncMatrix,
        project: &'a Project,
        source: &'a Environment,
        destination: &'a Environment,
        annotation: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            dispatcher,
            sync,
            project,
            source,
            destination,
            annotation: annotation.into(),
            today,
            tag: Mutex::new(None),
        }
    }

    /// The tag allocated so far, if any
    pub async fn release_tag(&self) -> Option<ReleaseTag> {
        *self.tag.lock().await
    }

    fn side(&self, side: Side) -> &Environment {
        match side {
            Side::Source => self.source,
            Side::Destination => self.destination,
        }
    }

    async fn with_tag<F>(&self, side: Side, render: F, stream: &LogStream) -> Message
    where
        F: FnOnce(&ReleaseTag) -> String + Send,
    {
        let Some(tag) = self.release_tag().await else {
            return Message::failure("No release tag was allocated");
        };
        self.dispatcher
            .run_os(&render(&tag), Some(self.side(side)), stream)
            .await
    }

    async fn allocate_tag(&self, stream: &LogStream) -> Message {
        let listing = self
            .dispatcher
            .run_os(&git::list_tags(), Some(self.source), stream)
            .await;

        // A failed listing still yields a tag for today
        let tag = next_release_tag(&parse_tag_list(listing.message()), self.today);
        debug!("Allocated release tag {}", tag);
        *self.tag.lock().await = Some(tag);

        listing
    }
}

#[async_trait]
impl StepRunner<DeployAction> for DeployRunner<'_> {
    async fn run(&self, action: &DeployAction, stream: &LogStream) -> Message {
        match action {
            DeployAction::BackupDatabase { export_dir } => {
                self.sync
                    .export_database(self.project, self.destination, export_dir, stream)
                    .await
            }
            DeployAction::Task(command) => {
                self.dispatcher
                    .run_command(self.project, self.destination, command, stream)
                    .await
            }
            DeployAction::FetchTags(side) => {
                self.dispatcher
                    .run_os(&git::fetch_tags(), Some(self.side(*side)), stream)
                    .await
            }
            DeployAction::AllocateTag => self.allocate_tag(stream).await,
            DeployAction::CreateTag => {
                let annotation = self.annotation.clone();
                self.with_tag(Side::Source, move |tag| git::create_tag(tag, &annotation), stream)
                    .await
            }
            DeployAction::PushTag => self.with_tag(Side::Source, git::push_tag, stream).await,
            DeployAction::CheckoutTag => {
                self.with_tag(Side::Destination, git::checkout, stream).await
            }
            DeployAction::ComposerInstall => match self.destination {
                Environment::Desktop(_) => {
                    self.dispatcher
                        .run_command(self.project, self.destination, COMPOSER_INSTALL, stream)
                        .await
                }
                Environment::Cloud(_) => {
                    self.dispatcher
                        .run_os(COMPOSER_INSTALL, Some(self.destination), stream)
                        .await
                }
            },
        }
    }
}

/// Run `steps` in order under `policy`
pub async fn deploy(
    runner: &DeployRunner<'_>,
    steps: Vec<Step<DeployAction>>,
    policy: FailurePolicy,
    stream: &LogStream,
) -> PipelineReport {
    info!(
        "Deploying {} -> {} ({} steps, {:?} on failure)",
        runner.source.machine_name(),
        runner.destination.machine_name(),
        steps.len(),
        policy
    );
    Pipeline::new(steps, policy).execute(runner, stream).await
}
