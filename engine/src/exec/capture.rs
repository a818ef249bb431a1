//! Incremental capture of a child process' output

use std::process::ExitStatus;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::sync::mpsc;

use crate::exec::sink::LogStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stdout,
    Stderr,
}

/// Everything a finished process wrote
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    /// stdout and stderr interleaved in arrival order
    pub combined: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Drain stdout and stderr of `child`, forwarding every chunk to `stream`,
/// then wait for it to exit
pub async fn capture(mut child: Child, stream: &LogStream) -> std::io::Result<Captured> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(pump(stdout, Channel::Stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(pump(stderr, Channel::Stderr, tx.clone()));
    }
    drop(tx);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut combined = Vec::new();

    // Ends once both pumps hit EOF and drop their senders
    while let Some((channel, chunk)) = rx.recv().await {
        stream.emit(&String::from_utf8_lossy(&chunk));
        combined.extend_from_slice(&chunk);
        match channel {
            Channel::Stdout => stdout.extend_from_slice(&chunk),
            Channel::Stderr => stderr.extend_from_slice(&chunk),
        }
    }

    let status = child.wait().await?;

    Ok(Captured {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        combined: String::from_utf8_lossy(&combined).into_owned(),
    })
}

async fn pump<R>(mut reader: R, channel: Channel, tx: mpsc::UnboundedSender<(Channel, Vec<u8>)>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send((channel, buf[..n].to_vec())).is_err() {
                    break;
                }
            }
        }
    }
}
