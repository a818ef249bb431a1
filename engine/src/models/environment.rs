//! Project and environment models
//!
//! Records arrive from the record store as flat field bags
//! ([`EnvironmentRecord`]); the engine only ever works with the validated
//! [`Environment`] variant.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::infrastructure::Infrastructure;

/// Environment kind as stored in the `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Desktop,
    Cloud,
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentKind::Desktop => write!(f, "desktop"),
            EnvironmentKind::Cloud => write!(f, "cloud"),
        }
    }
}

/// A project groups environments under one machine-name namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    pub machine_name: String,
}

impl Project {
    pub fn new(name: impl Into<String>, machine_name: impl Into<String>) -> Result<Self, EngineError> {
        let project = Self {
            name: name.into(),
            machine_name: machine_name.into(),
        };
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        validate_machine_name("project", &self.machine_name)
    }
}

/// Environment record as persisted by the record store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    #[serde(default)]
    pub name: String,
    pub machine_name: String,
    #[serde(rename = "type")]
    pub kind: Option<EnvironmentKind>,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub app_root: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub ssh_key_path: Option<String>,
    #[serde(default)]
    pub drush_path: Option<String>,
    #[serde(default)]
    pub production_mode: bool,
    #[serde(default)]
    pub infrastructure: Option<Infrastructure>,
}

/// A locally containerized environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEnvironment {
    pub machine_name: String,
    /// Host directory bind-mounted into the primary container
    pub root: PathBuf,
    pub app_root: Option<PathBuf>,
    pub uri: Option<String>,
    pub drush_path: Option<String>,
    pub production_mode: bool,
}

impl DesktopEnvironment {
    /// Directory local commands run from
    pub fn working_dir(&self) -> &Path {
        self.app_root.as_deref().unwrap_or(&self.root)
    }
}

/// A remote host reached over SSH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudEnvironment {
    pub machine_name: String,
    pub host: String,
    pub user: String,
    pub ssh_key_path: PathBuf,
    /// Application root on the remote host
    pub root: String,
    pub app_root: Option<String>,
    pub uri: Option<String>,
    pub drush_path: Option<String>,
    pub production_mode: bool,
}

impl CloudEnvironment {
    /// `user@host`
    pub fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Directory remote commands run from
    pub fn working_dir(&self) -> &str {
        self.app_root.as_deref().unwrap_or(&self.root)
    }
}

/// One deployment target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Desktop(DesktopEnvironment),
    Cloud(CloudEnvironment),
}

impl Environment {
    pub fn kind(&self) -> EnvironmentKind {
        match self {
            Environment::Desktop(_) => EnvironmentKind::Desktop,
            Environment::Cloud(_) => EnvironmentKind::Cloud,
        }
    }

    pub fn machine_name(&self) -> &str {
        match self {
            Environment::Desktop(env) => &env.machine_name,
            Environment::Cloud(env) => &env.machine_name,
        }
    }

    pub fn production_mode(&self) -> bool {
        match self {
            Environment::Desktop(env) => env.production_mode,
            Environment::Cloud(env) => env.production_mode,
        }
    }
}

impl TryFrom<EnvironmentRecord> for Environment {
    type Error = EngineError;

    fn try_from(record: EnvironmentRecord) -> Result<Self, Self::Error> {
        validate_machine_name("environment", &record.machine_name)?;
        let kind = record.kind.ok_or_else(|| {
            EngineError::InvalidRecord(format!(
                "environment '{}' has no type",
                record.machine_name
            ))
        })?;

        match kind {
            EnvironmentKind::Desktop => {
                let root = require(&record.machine_name, "root", record.root)?;
                Ok(Environment::Desktop(DesktopEnvironment {
                    machine_name: record.machine_name,
                    root: PathBuf::from(root),
                    app_root: non_empty(record.app_root).map(PathBuf::from),
                    uri: non_empty(record.uri),
                    drush_path: non_empty(record.drush_path),
                    production_mode: record.production_mode,
                }))
            }
            EnvironmentKind::Cloud => {
                let host = require(&record.machine_name, "host", record.host)?;
                let user = require(&record.machine_name, "user", record.user)?;
                let key = require(&record.machine_name, "ssh_key_path", record.ssh_key_path)?;
                let root = require(&record.machine_name, "root", record.root)?;
                validate_host(&record.machine_name, &host)?;
                validate_user(&record.machine_name, &user)?;
                Ok(Environment::Cloud(CloudEnvironment {
                    machine_name: record.machine_name,
                    host,
                    user,
                    ssh_key_path: PathBuf::from(key),
                    root,
                    app_root: non_empty(record.app_root),
                    uri: non_empty(record.uri),
                    drush_path: non_empty(record.drush_path),
                    production_mode: record.production_mode,
                }))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require(machine_name: &str, field: &str, value: Option<String>) -> Result<String, EngineError> {
    non_empty(value).ok_or_else(|| {
        EngineError::InvalidRecord(format!(
            "environment '{}' is missing '{}'",
            machine_name, field
        ))
    })
}

/// Machine names end up in container names and hostnames
pub fn validate_machine_name(what: &str, value: &str) -> Result<(), EngineError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidRecord(format!(
            "{} machine name '{}' must only contain letters, digits, '-' or '_'",
            what, value
        )))
    }
}

fn validate_host(machine_name: &str, host: &str) -> Result<(), EngineError> {
    let valid = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '[' | ']'));
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidRecord(format!(
            "environment '{}' has an invalid host '{}'",
            machine_name, host
        )))
    }
}

fn validate_user(machine_name: &str, user: &str) -> Result<(), EngineError> {
    let valid = user
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidRecord(format!(
            "environment '{}' has an invalid user '{}'",
            machine_name, user
        )))
    }
}
