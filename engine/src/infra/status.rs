//! Parsing of `compose ps --format json` output
//!
//! Output mixes one JSON object per line with free-text warnings; nothing
//! here ever fails.

use serde::Serialize;
use serde_json::{Map, Value};

/// One line of status output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusEntry {
    Container(Map<String, Value>),
    Log { log: String },
}

impl StatusEntry {
    fn field(&self, key: &str) -> Option<&str> {
        match self {
            StatusEntry::Container(fields) => fields.get(key).and_then(Value::as_str),
            StatusEntry::Log { .. } => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, StatusEntry::Container(_))
    }

    /// Container name
    pub fn name(&self) -> Option<&str> {
        self.field("Name")
    }

    pub fn service(&self) -> Option<&str> {
        self.field("Service")
    }

    /// `running`, `exited`, ...
    pub fn state(&self) -> Option<&str> {
        self.field("State")
    }

    pub fn is_running(&self) -> bool {
        self.state() == Some("running")
    }
}

/// A JSON object becomes a container record, anything else a log line
pub fn parse_status_line(line: &str) -> StatusEntry {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(fields)) => StatusEntry::Container(fields),
        _ => StatusEntry::Log {
            log: line.to_string(),
        },
    }
}

/// Split output into lines, drop empty ones and parse the rest
///
/// Older compose releases print a single JSON array instead of one object
/// per line; its objects are flattened into individual records.
pub fn parse_status_output(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();

    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Array(items)) if items.iter().all(Value::is_object) => {
                entries.extend(items.into_iter().filter_map(|item| match item {
                    Value::Object(fields) => Some(StatusEntry::Container(fields)),
                    _ => None,
                }));
            }
            _ => entries.push(parse_status_line(line)),
        }
    }

    entries
}
