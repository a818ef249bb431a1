//! Streaming of command output to subscribers

use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One chunk of output belonging to an identified operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub identifier: String,
    pub data: String,
}

/// Receives output chunks as they are produced
pub trait LogSink: Send + Sync {
    fn emit(&self, identifier: &str, chunk: &str);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _identifier: &str, _chunk: &str) {}
}

/// Writes chunks straight to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn emit(&self, _identifier: &str, chunk: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(chunk.as_bytes());
        let _ = stdout.flush();
    }
}

/// Forwards chunks as [`LogEvent`]s over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LogEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<LogEvent>) -> Self {
        Self { tx }
    }

    /// A sink and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl LogSink for ChannelSink {
    fn emit(&self, identifier: &str, chunk: &str) {
        // A dropped receiver only means nobody is listening anymore
        let _ = self.tx.send(LogEvent {
            identifier: identifier.to_string(),
            data: chunk.to_string(),
        });
    }
}

/// The output channel of one operation
///
/// Chunks are only forwarded when the caller supplied an identifier.
#[derive(Clone)]
pub struct LogStream {
    identifier: Option<String>,
    sink: Arc<dyn LogSink>,
}

impl LogStream {
    pub fn new(identifier: Option<String>, sink: Arc<dyn LogSink>) -> Self {
        Self { identifier, sink }
    }

    /// A stream that forwards nothing
    pub fn silent() -> Self {
        Self::new(None, Arc::new(NullSink))
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn emit(&self, chunk: &str) {
        if let Some(identifier) = &self.identifier {
            self.sink.emit(identifier, chunk);
        }
    }
}

impl std::fmt::Debug for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("identifier", &self.identifier)
            .finish()
    }
}
