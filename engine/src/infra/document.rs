//! Service topology document
//!
//! A compose file kept as a generic YAML mapping so that keys the engine
//! does not know about survive every load, mutate and persist cycle.

use serde_yaml_ng::{Mapping, Value};

use crate::errors::EngineError;
use crate::filesys::file::File;

const SERVICES: &str = "services";
const CONTAINER_NAME: &str = "container_name";
const LABELS: &str = "labels";
const HOSTNAME_LABEL: &str = "caddy";
const VOLUMES: &str = "volumes";

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyDocument {
    /// Top-level entries other than `services`
    root: Mapping,
    /// Position of `services` among the top-level keys
    services_at: usize,
    services: Mapping,
}

impl TopologyDocument {
    /// Parse a document; it must be a mapping with a `services` mapping
    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let value: Value = serde_yaml_ng::from_str(text)
            .map_err(|e| EngineError::DocumentError(format!("unable to parse document: {}", e)))?;

        let Value::Mapping(document) = value else {
            return Err(EngineError::DocumentError(
                "document root must be a mapping".to_string(),
            ));
        };

        let mut root = Mapping::new();
        let mut found = None;
        for (index, (key, value)) in document.into_iter().enumerate() {
            if key.as_str() != Some(SERVICES) {
                root.insert(key, value);
                continue;
            }
            match value {
                Value::Mapping(services) => found = Some((index, services)),
                _ => {
                    return Err(EngineError::DocumentError(
                        "'services' must be a mapping".to_string(),
                    ))
                }
            }
        }

        let (services_at, services) = found.ok_or_else(|| {
            EngineError::DocumentError("document has no 'services'".to_string())
        })?;

        Ok(Self {
            root,
            services_at,
            services,
        })
    }

    pub async fn load(file: &File) -> Result<Self, EngineError> {
        if !file.exists().await {
            return Err(EngineError::DocumentError(format!(
                "{} does not exist",
                file.path().display()
            )));
        }
        Self::parse(&file.read_string().await?)
    }

    pub async fn save(&self, file: &File) -> Result<(), EngineError> {
        file.write_string(&self.to_yaml()?).await
    }

    pub fn to_yaml(&self) -> Result<String, EngineError> {
        let mut document = Mapping::new();
        let mut entries = self.root.iter();
        for (key, value) in entries.by_ref().take(self.services_at) {
            document.insert(key.clone(), value.clone());
        }
        document.insert(
            Value::String(SERVICES.to_string()),
            Value::Mapping(self.services.clone()),
        );
        for (key, value) in entries {
            document.insert(key.clone(), value.clone());
        }
        Ok(serde_yaml_ng::to_string(&document)?)
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services
            .keys()
            .filter_map(|key| key.as_str().map(str::to_string))
            .collect()
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn service(&self, name: &str) -> Option<&Value> {
        self.services.get(name)
    }

    /// Insert or replace a service definition, keeping the position of an
    /// existing entry
    pub fn insert_service(&mut self, name: &str, definition: Value) {
        self.services
            .insert(Value::String(name.to_string()), definition);
    }

    /// Remove a service, preserving the order of the remaining ones
    pub fn remove_service(&mut self, name: &str) -> Option<Value> {
        let removed = self.services.get(name).cloned()?;
        self.services = std::mem::take(&mut self.services)
            .into_iter()
            .filter(|(key, _)| key.as_str() != Some(name))
            .collect();
        Some(removed)
    }

    pub fn set_container_name(&mut self, service: &str, container: &str) -> Result<(), EngineError> {
        self.service_mut(service)?.insert(
            Value::String(CONTAINER_NAME.to_string()),
            Value::String(container.to_string()),
        );
        Ok(())
    }

    /// Set the reverse-proxy hostname label, creating `labels` if needed
    pub fn set_public_hostname(&mut self, service: &str, hostname: &str) -> Result<(), EngineError> {
        let definition = self.service_mut(service)?;
        let labels = definition
            .entry(Value::String(LABELS.to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));

        let Value::Mapping(labels) = labels else {
            return Err(EngineError::DocumentError(format!(
                "labels of service '{}' must be a mapping",
                service
            )));
        };
        labels.insert(
            Value::String(HOSTNAME_LABEL.to_string()),
            Value::String(hostname.to_string()),
        );
        Ok(())
    }

    /// Replace the first volume entry, creating the list if needed
    pub fn set_primary_volume(&mut self, service: &str, volume: &str) -> Result<(), EngineError> {
        let definition = self.service_mut(service)?;
        let volumes = definition
            .entry(Value::String(VOLUMES.to_string()))
            .or_insert_with(|| Value::Sequence(Vec::new()));

        let Value::Sequence(volumes) = volumes else {
            return Err(EngineError::DocumentError(format!(
                "volumes of service '{}' must be a list",
                service
            )));
        };

        let volume = Value::String(volume.to_string());
        match volumes.first_mut() {
            Some(first) => *first = volume,
            None => volumes.push(volume),
        }
        Ok(())
    }

    pub fn container_name(&self, service: &str) -> Option<&str> {
        self.service(service)?.get(CONTAINER_NAME)?.as_str()
    }

    pub fn public_hostname(&self, service: &str) -> Option<&str> {
        self.service(service)?.get(LABELS)?.get(HOSTNAME_LABEL)?.as_str()
    }

    pub fn primary_volume(&self, service: &str) -> Option<&str> {
        self.service(service)?.get(VOLUMES)?.get(0)?.as_str()
    }

    fn service_mut(&mut self, service: &str) -> Result<&mut Mapping, EngineError> {
        match self.services.get_mut(service) {
            Some(Value::Mapping(definition)) => Ok(definition),
            Some(_) => Err(EngineError::DocumentError(format!(
                "service '{}' must be a mapping",
                service
            ))),
            None => Err(EngineError::DocumentError(format!(
                "document has no service '{}'",
                service
            ))),
        }
    }
}
