//! Container and hostname naming
//!
//! Everything is namespaced by `<environment>.<project>` machine names:
//! the primary container is `<ns>.drt`, other services `<service>.<ns>.drt`,
//! public hostnames add `.localhost`.

use crate::models::environment::{Environment, Project};

pub const CONTAINER_SUFFIX: &str = "drt";
pub const HOSTNAME_SUFFIX: &str = "drt.localhost";

/// Service name of the database container
pub const DATABASE_SERVICE: &str = "db";

/// `<environment>.<project>`
pub fn namespace(project: &Project, environment: &Environment) -> String {
    format!("{}.{}", environment.machine_name(), project.machine_name)
}

pub fn primary_container(namespace: &str) -> String {
    format!("{}.{}", namespace, CONTAINER_SUFFIX)
}

pub fn service_container(service: &str, namespace: &str) -> String {
    format!("{}.{}.{}", service, namespace, CONTAINER_SUFFIX)
}

pub fn primary_hostname(namespace: &str) -> String {
    format!("{}.{}", namespace, HOSTNAME_SUFFIX)
}

pub fn service_hostname(service: &str, namespace: &str) -> String {
    format!("{}.{}.{}", service, namespace, HOSTNAME_SUFFIX)
}

pub fn database_container(namespace: &str) -> String {
    service_container(DATABASE_SERVICE, namespace)
}
