//! Operation journal entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::message::Message;

/// One executed operation, addressable by its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub identifier: String,

    /// Environment the operation ran against, if any
    #[serde(default)]
    pub environment: Option<String>,

    /// Human-readable command or operation name
    pub command: String,

    /// Final outcome, `None` while the operation is running
    #[serde(default)]
    pub result: Option<Message>,

    pub executed_at: DateTime<Utc>,
}

impl LogEntry {
    /// A pending entry stamped now
    pub fn pending(
        identifier: impl Into<String>,
        environment: Option<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            environment,
            command: command.into(),
            result: None,
            executed_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }
}
