//! Synchronization between environments
//!
//! Files and databases move along a 2x2 matrix of (source kind,
//! destination kind); every operation resolves to a single [`Message`].
//!
//! [`Message`]: crate::models::message::Message

pub mod database;
pub mod files;

use std::sync::Arc;

use crate::exec::Executor;
use crate::filesys::dir::Dir;
use crate::storage::settings::Settings;

pub use files::FileRoute;

pub struct SyncMatrix {
    executor: Arc<dyn Executor>,
    settings: Settings,
    /// Local staging directory for dumps moving between environments
    staging: Dir,
}

impl SyncMatrix {
    pub fn new(executor: Arc<dyn Executor>, settings: Settings, staging: Dir) -> Self {
        Self {
            executor,
            settings,
            staging,
        }
    }
}
