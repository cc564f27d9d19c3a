//! Fake process launcher and line sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{duplex, DuplexStream};
use tpt_exec::errors::{Result, TptError};
use tpt_exec::launch::{LaunchCommand, LaunchedProcess, LineSink, ProcessLauncher, StreamKind};

/// Write ends of a fake process's stdout and stderr.
pub struct FakePipes {
    pub stdout: DuplexStream,
    pub stderr: DuplexStream,
}

/// Records launch commands and hands out in-memory output streams.
#[derive(Default)]
pub struct FakeLauncher {
    commands: Mutex<Vec<LaunchCommand>>,
    pipes: Mutex<Vec<FakePipes>>,
    fail: AtomicBool,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every launch fails as if the executable could not be started.
    pub fn fail_launches(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn launches(&self) -> Vec<LaunchCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    /// Write ends of the most recent launch. Dropping them closes the
    /// streams.
    pub fn take_pipes(&self) -> Option<FakePipes> {
        self.pipes.lock().unwrap().pop()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, command: &LaunchCommand) -> Result<LaunchedProcess> {
        self.commands.lock().unwrap().push(command.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(TptError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )));
        }

        let (stdout_reader, stdout_writer) = duplex(4096);
        let (stderr_reader, stderr_writer) = duplex(4096);
        self.pipes.lock().unwrap().push(FakePipes {
            stdout: stdout_writer,
            stderr: stderr_writer,
        });

        Ok(LaunchedProcess {
            pid: Some(4242),
            stdout: Some(Box::new(stdout_reader)),
            stderr: Some(Box::new(stderr_reader)),
        })
    }
}

/// Collects forwarded lines in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(StreamKind, String)>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(StreamKind, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn lines_of(&self, stream: StreamKind) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, l)| l.clone())
            .collect()
    }
}

impl LineSink for CollectingSink {
    fn forward(&self, stream: StreamKind, line: &str) {
        self.lines.lock().unwrap().push((stream, line.to_string()));
    }
}
