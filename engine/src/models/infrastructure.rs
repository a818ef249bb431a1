//! Infrastructure model

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The service topology bound to one environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    /// Persisted topology document, absent until the document is created
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Optional services and whether they are enabled
    #[serde(default)]
    pub services: BTreeMap<String, bool>,
}

impl Infrastructure {
    /// Names of the enabled optional services
    pub fn enabled_services(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
    }

    pub fn is_enabled(&self, service: &str) -> bool {
        self.services.get(service).copied().unwrap_or(false)
    }
}
