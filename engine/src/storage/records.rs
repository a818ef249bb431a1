//! JSON-file record store
//!
//! Stands in for the external record store: projects, their environments
//! and each environment's infrastructure, read from `records.json`.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::filesys::file::File;
use crate::models::environment::{Environment, EnvironmentRecord, Project};
use crate::models::infrastructure::Infrastructure;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub name: String,
    pub machine_name: String,
    #[serde(default)]
    pub environments: Vec<EnvironmentRecord>,
}

/// Everything needed to operate on one environment
#[derive(Debug, Clone)]
pub struct ResolvedEnvironment {
    pub project: Project,
    pub environment: Environment,
    pub infrastructure: Option<Infrastructure>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
}

impl Records {
    /// Missing file reads as an empty store
    pub async fn load(file: &File) -> Result<Self, EngineError> {
        file.read_json_or_default().await
    }

    pub async fn save(&self, file: &File) -> Result<(), EngineError> {
        file.write_json(self).await
    }

    pub fn project(&self, machine_name: &str) -> Result<Project, EngineError> {
        let record = self.project_record(machine_name)?;
        Project::new(record.name.clone(), record.machine_name.clone())
    }

    /// Look up and validate `project`/`environment`
    pub fn resolve(&self, project: &str, environment: &str) -> Result<ResolvedEnvironment, EngineError> {
        let project_record = self.project_record(project)?;
        let record = project_record
            .environments
            .iter()
            .find(|env| env.machine_name == environment)
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "environment '{}' in project '{}'",
                    environment, project
                ))
            })?;

        Ok(ResolvedEnvironment {
            project: Project::new(project_record.name.clone(), project_record.machine_name.clone())?,
            infrastructure: record.infrastructure.clone(),
            environment: Environment::try_from(record.clone())?,
        })
    }

    /// Record (or forget) where an environment's topology document lives
    pub fn set_infrastructure(
        &mut self,
        project: &str,
        environment: &str,
        infrastructure: Option<Infrastructure>,
    ) -> Result<(), EngineError> {
        let record = self
            .projects
            .iter_mut()
            .find(|p| p.machine_name == project)
            .and_then(|p| p.environments.iter_mut().find(|e| e.machine_name == environment))
            .ok_or_else(|| {
                EngineError::NotFound(format!(
                    "environment '{}' in project '{}'",
                    environment, project
                ))
            })?;
        record.infrastructure = infrastructure;
        Ok(())
    }

    fn project_record(&self, machine_name: &str) -> Result<&ProjectRecord, EngineError> {
        self.projects
            .iter()
            .find(|p| p.machine_name == machine_name)
            .ok_or_else(|| EngineError::NotFound(format!("project '{}'", machine_name)))
    }
}
