// src/launch/process.rs

//! Pluggable process launcher.
//!
//! Production code uses [`TokioProcessLauncher`]; tests provide a launcher
//! that records command lines and hands out in-memory streams.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tracing::info;

use super::command::LaunchCommand;
use crate::errors::Result;

pub type ProcessOutput = Box<dyn AsyncRead + Send + Unpin>;

/// Streams of a freshly started process. The process itself is not owned:
/// TPT is a long-lived service that outlives the launch.
pub struct LaunchedProcess {
    pub pid: Option<u32>,
    pub stdout: Option<ProcessOutput>,
    pub stderr: Option<ProcessOutput>,
}

pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, command: &LaunchCommand) -> Result<LaunchedProcess>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessLauncher;

impl ProcessLauncher for TokioProcessLauncher {
    fn launch(&self, command: &LaunchCommand) -> Result<LaunchedProcess> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .spawn()
            .with_context(|| format!("could not start TPT '{}'", command.program.display()))?;

        let pid = child.id();
        info!(pid, "TPT process started");

        let stdout = child.stdout.take().map(|s| Box::new(s) as ProcessOutput);
        let stderr = child.stderr.take().map(|s| Box::new(s) as ProcessOutput);

        // Dropping the handle leaves the process running; tokio reaps it
        // once it exits.
        drop(child);

        Ok(LaunchedProcess {
            pid,
            stdout,
            stderr,
        })
    }
}
