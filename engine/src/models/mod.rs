//! Data models

pub mod deployment;
pub mod environment;
pub mod infrastructure;
pub mod log;
pub mod message;
