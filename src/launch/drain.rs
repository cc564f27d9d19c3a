// src/launch/drain.rs

//! Output drains for a spawned TPT process.
//!
//! An unread stdout/stderr pipe fills up and blocks the child, so every
//! spawned process gets one drain per stream. A drain reads lines until the
//! stream closes and forwards them to a [`LineSink`] until it is detached.
//! Detaching only stops forwarding; reading continues so the pipe keeps
//! flowing for the rest of the process lifetime.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Destination of forwarded process output.
pub trait LineSink: Send + Sync {
    fn forward(&self, stream: StreamKind, line: &str);
}

/// Forwards stdout at info and stderr at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LineSink for TracingSink {
    fn forward(&self, stream: StreamKind, line: &str) {
        match stream {
            StreamKind::Stdout => info!(target: "tpt_exec::launch::drain", "{line}"),
            StreamKind::Stderr => error!(target: "tpt_exec::launch::drain", "{line}"),
        }
    }
}

/// Background reader for one process stream.
pub struct OutputDrain {
    stream: StreamKind,
    // `Some` while forwarding. Held locked during each forward so that no
    // line is forwarded once `detach` has returned.
    sink: Arc<Mutex<Option<Arc<dyn LineSink>>>>,
    handle: JoinHandle<()>,
}

impl fmt::Debug for OutputDrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputDrain")
            .field("stream", &self.stream)
            .field("forwarding", &self.is_forwarding())
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

impl OutputDrain {
    /// Start draining `reader` on a background task.
    pub fn spawn<R>(reader: R, stream: StreamKind, sink: Arc<dyn LineSink>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let sink = Arc::new(Mutex::new(Some(sink)));
        let task_sink = Arc::clone(&sink);

        let handle = tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\n', '\r']);
                        forward(&task_sink, stream, line);
                    }
                    Err(e) => {
                        forward(
                            &task_sink,
                            StreamKind::Stderr,
                            &format!("error reading TPT process {stream}: {e}"),
                        );
                        break;
                    }
                }
            }

            debug!(%stream, "TPT output stream closed");
        });

        Self {
            stream,
            sink,
            handle,
        }
    }

    /// Stop forwarding. Reading continues in the background.
    pub fn detach(&self) {
        let mut guard = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn is_forwarding(&self) -> bool {
        let guard = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        guard.is_some()
    }

    /// True once the underlying stream has been read to the end.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }
}

fn forward(sink: &Mutex<Option<Arc<dyn LineSink>>>, stream: StreamKind, line: &str) {
    let guard = sink.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(sink) = guard.as_ref() {
        sink.forward(stream, line);
    }
}

/// Detaches every drain it holds when dropped.
#[derive(Debug, Default)]
pub struct DrainGuard {
    drains: Vec<OutputDrain>,
}

impl DrainGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, drain: OutputDrain) {
        self.drains.push(drain);
    }

    pub fn drains(&self) -> &[OutputDrain] {
        &self.drains
    }
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if self.drains.is_empty() {
            return;
        }
        for drain in &self.drains {
            drain.detach();
        }
        info!("logging output of TPT process stopped");
    }
}
