//! The result envelope returned by every engine operation

use serde::{Deserialize, Serialize};

/// `{success, message, data?}`
///
/// `data` only ever accompanies a successful message; the constructors and
/// deserialization both enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl Message {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Build from a process outcome
    pub fn from_outcome(success: bool, message: impl Into<String>) -> Self {
        if success {
            Self::success(message)
        } else {
            Self::failure(message)
        }
    }

    /// Attach an artifact. Ignored on failed messages.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        if self.success {
            self.data = Some(data.into());
        }
        self
    }

    /// Replace the human-readable text
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

#[derive(Deserialize)]
struct RawMessage {
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<String>,
}

impl TryFrom<RawMessage> for Message {
    type Error = String;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        if !raw.success && raw.data.is_some() {
            return Err("a failed message cannot carry data".to_string());
        }
        Ok(Self {
            success: raw.success,
            message: raw.message,
            data: raw.data,
        })
    }
}
