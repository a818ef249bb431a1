//! Routing of commands to the right kind of target

use std::sync::Arc;

use crate::command::naming::namespace;
use crate::command::runner::{in_container, with_task_runner};
use crate::exec::{Executor, LogStream};
use crate::models::environment::{Environment, Project};
use crate::models::message::Message;

/// Runs commands against an [`Environment`] without callers matching on its kind
#[derive(Clone)]
pub struct Dispatcher {
    executor: Arc<dyn Executor>,
    container_program: String,
}

impl Dispatcher {
    pub fn new(executor: Arc<dyn Executor>, container_program: impl Into<String>) -> Self {
        Self {
            executor,
            container_program: container_program.into(),
        }
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// Raw command on the machine hosting `environment`
    ///
    /// Desktop environments, or none at all, run locally from their working
    /// directory; cloud environments run over SSH.
    pub async fn run_os(&self, command: &str, environment: Option<&Environment>, stream: &LogStream) -> Message {
        match environment {
            None => self.executor.run_local(command, None, stream).await,
            Some(Environment::Desktop(desktop)) => {
                self.executor
                    .run_local(command, Some(desktop.working_dir()), stream)
                    .await
            }
            Some(Environment::Cloud(cloud)) => self.executor.run_remote(command, cloud, stream).await,
        }
    }

    /// Application command: inside the primary container on desktop, with
    /// the task runner on PATH on cloud
    pub async fn run_command(
        &self,
        project: &Project,
        environment: &Environment,
        command: &str,
        stream: &LogStream,
    ) -> Message {
        match environment {
            Environment::Desktop(_) => self.run_desktop(project, environment, command, stream).await,
            Environment::Cloud(_) => self.run_cloud(environment, command, stream).await,
        }
    }

    /// Application command inside the primary container
    pub async fn run_desktop(
        &self,
        project: &Project,
        environment: &Environment,
        command: &str,
        stream: &LogStream,
    ) -> Message {
        let wrapped = in_container(&self.container_program, &namespace(project, environment), command);
        self.executor.run_local(&wrapped, None, stream).await
    }

    /// Application command on a cloud host; fails for desktop environments
    pub async fn run_cloud(&self, environment: &Environment, command: &str, stream: &LogStream) -> Message {
        match environment {
            Environment::Cloud(cloud) => {
                self.executor
                    .run_remote(&with_task_runner(cloud, command), cloud, stream)
                    .await
            }
            Environment::Desktop(_) => Message::failure(format!(
                "{} is not a cloud environment",
                environment.machine_name()
            )),
        }
    }
}
