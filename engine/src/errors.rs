//! Error types for the dresktop engine
//!
//! Process and connection failures are never errors here: they are reported
//! through [`crate::models::message::Message`]. `EngineError` is reserved for
//! conditions that abort an operation outright.

use thiserror::Error;

/// Fatal error type for the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    #[error("Infrastructure document error: {0}")]
    DocumentError(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
