//! Deployment models

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Action keys understood by the orchestrator
pub mod keys {
    pub const BACKUP_DATABASE: &str = "backup-database";
    pub const MAINTENANCE_ON: &str = "turnon-maintenance-mode";
    pub const CLEAR_CACHE: &str = "clear-cache";
    pub const VENDOR: &str = "vendor";
    pub const DATABASE_UPDATES: &str = "database-updates";
    pub const IMPORT_CONFIGURATION: &str = "import-configuration";
    pub const SANITIZE_DATABASE: &str = "sanitize-database";
    pub const MAINTENANCE_OFF: &str = "turnoff-maintenance-mode";
}

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreDeployment,
    Deployment,
    PostDeployment,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::PreDeployment => write!(f, "pre-deployment"),
            Phase::Deployment => write!(f, "deployment"),
            Phase::PostDeployment => write!(f, "post-deployment"),
        }
    }
}

/// Dependency installation tool for the `vendor` action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorTool {
    Composer,
    Rsync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorChoice {
    pub selected: VendorTool,
}

/// A keyed step descriptor supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentAction {
    pub key: String,

    /// Whether the step is enabled
    #[serde(default)]
    pub value: bool,

    /// Phase the step is bound to (`type` in stored payloads)
    #[serde(alias = "type")]
    pub phase: Phase,

    /// Export directory for `backup-database`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Tool selection for `vendor`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<VendorChoice>,
}

impl DeploymentAction {
    pub fn new(key: impl Into<String>, value: bool, phase: Phase) -> Self {
        Self {
            key: key.into(),
            value,
            phase,
            path: None,
            vendor: None,
        }
    }
}

/// Actions re-keyed for lookup
#[derive(Debug, Clone, Default)]
pub struct ActionSet {
    actions: HashMap<String, DeploymentAction>,
}

impl ActionSet {
    /// Later duplicates of a key replace earlier ones
    pub fn new(actions: impl IntoIterator<Item = DeploymentAction>) -> Self {
        Self {
            actions: actions
                .into_iter()
                .map(|action| (action.key.clone(), action))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DeploymentAction> {
        self.actions.get(key)
    }

    /// The action for `key` if it is enabled and bound to `phase`
    pub fn enabled_in(&self, key: &str, phase: Phase) -> Option<&DeploymentAction> {
        self.get(key)
            .filter(|action| action.value && action.phase == phase)
    }
}

/// A deployment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    #[serde(default)]
    pub actions: Vec<DeploymentAction>,

    /// Annotation of the release tag
    #[serde(alias = "commitMessage")]
    pub commit_message: String,
}
