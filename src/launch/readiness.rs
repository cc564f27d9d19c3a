// src/launch/readiness.rs

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::ToolApi;
use crate::errors::{Result, TptError};
use crate::wait::pause;

pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for ReadinessOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_READINESS_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Poll `is_ready()` until it answers true.
///
/// Remote faults while polling count as "not ready yet". Fails with
/// [`TptError::ReadinessTimeout`] once `opts.timeout` has elapsed, or with
/// [`TptError::Interrupted`] if `cancel` fires.
pub async fn wait_until_ready(
    api: &dyn ToolApi,
    opts: ReadinessOptions,
    cancel: &CancellationToken,
) -> Result<()> {
    if probe(api) {
        return Ok(());
    }

    info!("waiting for TPT to become ready...");
    // `None` when the timeout is too large to represent: wait indefinitely.
    let deadline = Instant::now().checked_add(opts.timeout);

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            error!(
                timeout_s = opts.timeout.as_secs(),
                "timeout: TPT API did not become ready"
            );
            return Err(TptError::ReadinessTimeout(opts.timeout));
        }
        pause(opts.interval, cancel, "waiting for TPT to become ready").await?;
        if probe(api) {
            return Ok(());
        }
    }
}

fn probe(api: &dyn ToolApi) -> bool {
    match api.is_ready() {
        Ok(ready) => ready,
        Err(e) => {
            debug!(error = %e, "readiness probe failed; retrying");
            false
        }
    }
}

/// Log the connected tool version. Failure to fetch it is not fatal.
pub fn log_version(api: &dyn ToolApi) {
    match api.version() {
        Ok(version) => info!(%version, "connected to TPT"),
        Err(e) => warn!(error = %e, "connected to TPT, but could not query its version"),
    }
}
