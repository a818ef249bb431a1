//! Operation journal
//!
//! Entries are appended when an operation starts and patched, by
//! identifier, once it finishes.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::errors::EngineError;
use crate::filesys::file::File;
use crate::models::log::LogEntry;
use crate::models::message::Message;

#[async_trait]
pub trait Journal: Send + Sync {
    /// Append a pending entry
    async fn begin(&self, entry: LogEntry) -> Result<(), EngineError>;

    /// Attach the final result to the entry with `identifier`
    async fn complete(&self, identifier: &str, result: &Message) -> Result<(), EngineError>;

    async fn entries(&self) -> Result<Vec<LogEntry>, EngineError>;
}

/// Journal kept as a JSON array on disk
pub struct FileJournal {
    file: File,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileJournal {
    pub fn new(file: File) -> Self {
        Self {
            file,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<LogEntry>, EngineError> {
        self.file.read_json_or_default().await
    }
}

#[async_trait]
impl Journal for FileJournal {
    async fn begin(&self, entry: LogEntry) -> Result<(), EngineError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.push(entry);
        self.file.write_json(&entries).await
    }

    async fn complete(&self, identifier: &str, result: &Message) -> Result<(), EngineError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;

        match entries.iter_mut().rev().find(|e| e.identifier == identifier) {
            Some(entry) => entry.result = Some(result.clone()),
            None => {
                warn!("No journal entry for operation {}", identifier);
                return Err(EngineError::NotFound(format!("journal entry '{}'", identifier)));
            }
        }

        self.file.write_json(&entries).await
    }

    async fn entries(&self) -> Result<Vec<LogEntry>, EngineError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }
}
