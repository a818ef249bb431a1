//! Shared fixtures: a scripted executor and environment builders

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use dresktop::exec::{Executor, LogSink, LogStream, NullSink};
use dresktop::models::environment::{CloudEnvironment, DesktopEnvironment, Environment, Project};
use dresktop::storage::layout::StorageLayout;
use dresktop::storage::settings::Settings;
use dresktop::{Engine, Message};

pub const BASE_TEMPLATE: &str = include_str!("../../resources/infrastructure/base.yml");

/// One executor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Local {
        command: String,
        working_dir: Option<PathBuf>,
    },
    Remote {
        command: String,
        host: String,
    },
    Fetch {
        remote: String,
        local: PathBuf,
    },
    Push {
        local: PathBuf,
        remote: String,
    },
}

impl Call {
    /// Text the scripted responses are matched against
    fn text(&self) -> String {
        match self {
            Call::Local { command, .. } | Call::Remote { command, .. } => command.clone(),
            Call::Fetch { remote, .. } => format!("fetch {}", remote),
            Call::Push { remote, .. } => format!("push {}", remote),
        }
    }

    pub fn command(&self) -> Option<&str> {
        match self {
            Call::Local { command, .. } | Call::Remote { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Records every call and answers with the first response whose fragment
/// occurs in the command; unmatched calls succeed with empty output
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<Vec<(String, Message)>>,
}

impl RecordingExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, fragment: &str, message: Message) {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.to_string(), message));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|call| call.command().map(str::to_string))
            .collect()
    }

    fn answer(&self, call: Call, stream: &LogStream) -> Message {
        let text = call.text();
        self.calls.lock().unwrap().push(call);

        let message = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| text.contains(fragment.as_str()))
            .map(|(_, message)| message.clone())
            .unwrap_or_else(|| Message::success(""));
        stream.emit(message.message());
        message
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn run_local(&self, command: &str, working_dir: Option<&Path>, stream: &LogStream) -> Message {
        self.answer(
            Call::Local {
                command: command.to_string(),
                working_dir: working_dir.map(Path::to_path_buf),
            },
            stream,
        )
    }

    async fn run_remote(&self, command: &str, target: &CloudEnvironment, stream: &LogStream) -> Message {
        self.answer(
            Call::Remote {
                command: command.to_string(),
                host: target.host.clone(),
            },
            stream,
        )
    }

    async fn fetch_file(&self, _target: &CloudEnvironment, remote_path: &str, local_path: &Path) -> Message {
        let message = self.answer(
            Call::Fetch {
                remote: remote_path.to_string(),
                local: local_path.to_path_buf(),
            },
            &LogStream::silent(),
        );
        // Stand in for the downloaded dump
        if message.is_success() {
            std::fs::write(local_path, b"dump").unwrap();
        }
        message
    }

    async fn push_file(&self, _target: &CloudEnvironment, local_path: &Path, remote_path: &str) -> Message {
        self.answer(
            Call::Push {
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
            },
            &LogStream::silent(),
        )
    }
}

pub fn project() -> Project {
    Project::new("Shop", "shop").unwrap()
}

pub fn desktop(machine_name: &str, root: &Path) -> Environment {
    Environment::Desktop(DesktopEnvironment {
        machine_name: machine_name.to_string(),
        root: root.to_path_buf(),
        app_root: None,
        uri: None,
        drush_path: None,
        production_mode: false,
    })
}

pub fn cloud(machine_name: &str, host: &str) -> Environment {
    Environment::Cloud(CloudEnvironment {
        machine_name: machine_name.to_string(),
        host: host.to_string(),
        user: "deploy".to_string(),
        ssh_key_path: PathBuf::from("/home/dev/.ssh/id_rsa"),
        root: "/var/www/shop/web".to_string(),
        app_root: Some("/var/www/shop".to_string()),
        uri: None,
        drush_path: Some("/var/www/shop/vendor/bin".to_string()),
        production_mode: true,
    })
}

/// Engine over a recording executor, rooted at `home`, with the base
/// template installed
pub async fn engine_at(home: &Path, sink: Option<Arc<dyn LogSink>>) -> (Engine, Arc<RecordingExecutor>) {
    let layout = StorageLayout::new(home);
    layout.setup().await.unwrap();
    layout.base_template().write_string(BASE_TEMPLATE).await.unwrap();

    let executor = RecordingExecutor::new();
    let sink = sink.unwrap_or_else(|| Arc::new(NullSink) as Arc<dyn LogSink>);
    let engine = Engine::new(Settings::default(), layout, executor.clone(), sink);
    (engine, executor)
}
