// src/launch/acquire.rs

//! Attach to a running TPT instance, or start one and wait for it to
//! register.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::command::{select_executable, LaunchCommand, Platform};
use super::drain::{DrainGuard, LineSink, OutputDrain, StreamKind, TracingSink};
use super::process::{LaunchedProcess, ProcessLauncher, TokioProcessLauncher};
use super::readiness::{log_version, wait_until_ready, ReadinessOptions, DEFAULT_POLL_INTERVAL};
use crate::api::{Registry, ToolApi};
use crate::errors::{Result, TptError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::wait::pause;

/// Where to find TPT and how long to wait for it.
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    pub host: String,
    pub port: u16,
    pub binding: String,
    /// Candidate executables, tried in order.
    pub executables: Vec<PathBuf>,
    /// Passed through after the generated arguments.
    pub arguments: Vec<String>,
    pub startup_timeout: Duration,
    pub lookup_interval: Duration,
    pub readiness: ReadinessOptions,
    pub platform: Platform,
}

impl AcquireOptions {
    pub fn new(port: u16, binding: impl Into<String>, executables: Vec<PathBuf>) -> Self {
        Self {
            host: default_host(),
            port,
            binding: binding.into(),
            executables,
            arguments: Vec::new(),
            startup_timeout: Duration::from_secs(60),
            lookup_interval: DEFAULT_POLL_INTERVAL,
            readiness: ReadinessOptions::default(),
            platform: Platform::current(),
        }
    }
}

/// `HOSTNAME` if set, otherwise `localhost`.
pub fn default_host() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Produces ready-to-use [`ToolApi`] handles.
///
/// At most one process is started per [`ToolConnector::acquire`] call, and
/// only if no instance is registered under the configured port and binding
/// name.
pub struct ToolConnector {
    registry: Arc<dyn Registry>,
    launcher: Arc<dyn ProcessLauncher>,
    fs: Arc<dyn FileSystem>,
    sink: Arc<dyn LineSink>,
}

impl ToolConnector {
    pub fn new(
        registry: Arc<dyn Registry>,
        launcher: Arc<dyn ProcessLauncher>,
        fs: Arc<dyn FileSystem>,
        sink: Arc<dyn LineSink>,
    ) -> Self {
        Self {
            registry,
            launcher,
            fs,
            sink,
        }
    }

    /// Real processes, real filesystem, tool output forwarded to `tracing`.
    pub fn with_registry(registry: Arc<dyn Registry>) -> Self {
        Self::new(
            registry,
            Arc::new(TokioProcessLauncher),
            Arc::new(RealFileSystem),
            Arc::new(TracingSink),
        )
    }

    pub async fn acquire(
        &self,
        opts: &AcquireOptions,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn ToolApi>> {
        info!(host = %opts.host, port = opts.port, "trying to connect to TPT");
        info!(binding = %opts.binding, "TPT binding name");

        match self.registry.lookup(&opts.host, opts.port, &opts.binding) {
            Ok(api) => {
                info!("found a running TPT instance");
                return self.ready(api, opts, cancel).await;
            }
            Err(e) => {
                info!(error = %e, "TPT is not running with the needed settings");
            }
        }

        let api = self.start(opts, cancel).await?;
        self.ready(api, opts, cancel).await
    }

    async fn ready(
        &self,
        api: Arc<dyn ToolApi>,
        opts: &AcquireOptions,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn ToolApi>> {
        wait_until_ready(api.as_ref(), opts.readiness, cancel).await?;
        log_version(api.as_ref());
        Ok(api)
    }

    async fn start(
        &self,
        opts: &AcquireOptions,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn ToolApi>> {
        let exe = select_executable(self.fs.as_ref(), &opts.executables)?;
        let command =
            LaunchCommand::new(&exe, opts.port, &opts.binding, &opts.arguments, opts.platform);

        info!(command = %command, "starting TPT");
        info!(
            startup_timeout_s = opts.startup_timeout.as_secs(),
            "waiting for TPT to start"
        );

        let process = self.launcher.launch(&command).map_err(|e| {
            error!(path = %exe.display(), error = %e, "could not start TPT");
            e
        })?;

        // Drains are detached when this guard goes out of scope, whatever
        // the outcome of the registration poll.
        let _drains = self.attach_drains(process);
        self.await_registration(opts, cancel).await
    }

    fn attach_drains(&self, process: LaunchedProcess) -> DrainGuard {
        let mut guard = DrainGuard::new();
        match process.stdout {
            Some(stdout) => guard.push(OutputDrain::spawn(
                stdout,
                StreamKind::Stdout,
                Arc::clone(&self.sink),
            )),
            None => warn!("TPT process has no stdout pipe"),
        }
        match process.stderr {
            Some(stderr) => guard.push(OutputDrain::spawn(
                stderr,
                StreamKind::Stderr,
                Arc::clone(&self.sink),
            )),
            None => warn!("TPT process has no stderr pipe"),
        }
        guard
    }

    async fn await_registration(
        &self,
        opts: &AcquireOptions,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn ToolApi>> {
        // `None` when the timeout is too large to represent: wait indefinitely.
        let deadline = Instant::now().checked_add(opts.startup_timeout);

        loop {
            match self.registry.lookup(&opts.host, opts.port, &opts.binding) {
                Ok(api) => {
                    debug!("TPT registered with the registry");
                    return Ok(api);
                }
                Err(e) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        error!(
                            host = %opts.host,
                            port = opts.port,
                            binding = %opts.binding,
                            startup_timeout_s = opts.startup_timeout.as_secs(),
                            last_error = %e,
                            "timeout: could not connect to TPT API"
                        );
                        return Err(TptError::StartupTimeout {
                            host: opts.host.clone(),
                            port: opts.port,
                            binding: opts.binding.clone(),
                            waited: opts.startup_timeout,
                        });
                    }
                    // Not registered yet.
                    pause(opts.lookup_interval, cancel, "waiting for TPT to start").await?;
                }
            }
        }
    }
}
