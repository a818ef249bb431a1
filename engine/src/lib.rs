//! Dresktop Engine Library
//!
//! Core modules for operating desktop (containerized) and cloud (SSH)
//! application environments: command execution, infrastructure topology,
//! file/database synchronization and deployments.

pub mod app;
pub mod command;
pub mod deploy;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod filesys;
pub mod infra;
pub mod logs;
pub mod models;
pub mod storage;
pub mod sync;
pub mod utils;

pub use engine::Engine;
pub use models::message::Message;
