//! Environment infrastructure: topology documents and their lifecycle

pub mod bootstrap;
pub mod document;
pub mod manager;
pub mod status;

pub use document::TopologyDocument;
pub use manager::{InfrastructureManager, InfrastructureStatus};
pub use status::{parse_status_line, parse_status_output, StatusEntry};
