//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "DRESKTOP_HOME";

/// File name of every per-environment infrastructure document
pub const INFRASTRUCTURE_FILE_NAME: &str = "dresktop.yml";

/// Storage layout for the engine
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all storage
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> File {
        File::new(self.base_dir.join("settings.json"))
    }

    /// Get the records file path
    pub fn records_file(&self) -> File {
        File::new(self.base_dir.join("records.json"))
    }

    /// Get the journal file path
    pub fn journal_file(&self) -> File {
        File::new(self.logs_dir().path().join("journal.json"))
    }

    /// Get the resources directory (provisioned at install time)
    pub fn resources_dir(&self) -> Dir {
        Dir::new(self.base_dir.join(".resources"))
    }

    /// Get the shared base topology template
    pub fn base_template(&self) -> File {
        File::new(
            self.resources_dir()
                .path()
                .join("infrastructure")
                .join("base.yml"),
        )
    }

    /// Get the shared reverse proxy topology
    pub fn proxy_file(&self) -> File {
        File::new(
            self.resources_dir()
                .path()
                .join("infrastructure")
                .join("dresktop")
                .join("caddy.yml"),
        )
    }

    /// Get the directory holding one environment's infrastructure
    pub fn infrastructure_dir(&self, machine_name: &str) -> Dir {
        Dir::new(self.base_dir.join("infrastructure").join(machine_name))
    }

    /// Get the infrastructure document of one environment
    pub fn infrastructure_file(&self, machine_name: &str) -> File {
        self.infrastructure_dir(machine_name)
            .file(INFRASTRUCTURE_FILE_NAME)
    }

    /// Get the temporary directory used for database dumps in transit
    pub fn tmp_dir(&self) -> Dir {
        Dir::new(self.base_dir.join(".tmp"))
    }

    /// Get the default destination of pre-deployment database backups
    pub fn backups_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("backups"))
    }

    /// Get the logs directory
    pub fn logs_dir(&self) -> Dir {
        Dir::new(self.base_dir.join("logs"))
    }

    /// Setup the storage layout (create directories)
    pub async fn setup(&self) -> Result<(), crate::errors::EngineError> {
        self.tmp_dir().create().await?;
        self.logs_dir().create().await?;
        Ok(())
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Self::new(home);
        }

        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Dresktop");

        Self::new(base_dir)
    }
}
