//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Generate an operation identifier used to key streamed output and journal entries
pub fn generate_identifier() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Milliseconds since the Unix epoch
pub fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
