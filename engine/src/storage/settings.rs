//! Settings file management

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level
    pub log_level: LogLevel,

    /// Emit diagnostics as JSON
    pub json_logs: bool,

    /// Also write diagnostics to `<home>/logs/dresktop.log`
    pub log_to_file: bool,

    /// Container runtime configuration
    pub runtime: RuntimeSettings,

    /// SSH client configuration
    pub ssh: SshSettings,

    /// Database credentials inside desktop containers
    pub database: DatabaseSettings,

    /// File and database synchronization
    pub sync: SyncSettings,

    /// Deployment pipeline behaviour
    pub deploy: DeploySettings,
}

impl Settings {
    /// Load settings, defaulting every field missing from `file`
    pub async fn load(file: &File) -> Result<Self, EngineError> {
        file.read_json_or_default().await
    }

    pub async fn save(&self, file: &File) -> Result<(), EngineError> {
        file.write_json(self).await
    }
}

/// Container runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Compose invocation, e.g. `docker compose`
    pub compose_command: String,

    /// Container CLI
    pub container_program: String,

    /// Directories appended to PATH for every local command
    pub extra_paths: Vec<String>,

    /// Shared external network joined by every environment
    pub network: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            compose_command: "docker compose".to_string(),
            container_program: "docker".to_string(),
            extra_paths: vec![
                "/usr/local/bin".to_string(),
                "/opt/homebrew/bin".to_string(),
                "/Applications/Docker.app/Contents/Resources/bin".to_string(),
            ],
            network: "dresktop_network_external".to_string(),
        }
    }
}

/// SSH client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    /// ssh binary
    pub program: String,

    /// scp binary
    pub scp_program: String,

    /// Value for `-o StrictHostKeyChecking=`
    pub strict_host_key_checking: String,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            strict_host_key_checking: "accept-new".to_string(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub user: String,
    pub password: String,
    pub name: String,

    /// SQL client inside the database container
    pub client: String,

    /// Dump utility inside the database container
    pub dump: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            user: "drupal".to_string(),
            password: "drupal".to_string(),
            name: "drupal".to_string(),
            client: "/usr/bin/mariadb".to_string(),
            dump: "/usr/bin/mariadb-dump".to_string(),
        }
    }
}

/// Synchronization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Disposable image providing rsync and ssh
    pub rsync_image: String,

    /// Files directory relative to an environment root
    pub files_path: String,

    /// Host the reverse tunnel binds on the source side
    pub tunnel_host: String,

    /// Port the reverse tunnel binds on the source side
    pub tunnel_port: u16,

    /// Temporary directory inside desktop database containers
    pub desktop_tmp: String,

    /// Temporary directory on cloud hosts
    pub cloud_tmp: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            rsync_image: "jdeg/dresktop-rsync".to_string(),
            files_path: "sites/default/files".to_string(),
            tunnel_host: "localhost".to_string(),
            tunnel_port: 50000,
            desktop_tmp: "/tmp".to_string(),
            cloud_tmp: "/tmp".to_string(),
        }
    }
}

/// Deployment settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    /// Stop the pipeline at the first failed step
    pub halt_on_failure: bool,
}
