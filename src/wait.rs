// src/wait.rs

//! Interruptible sleeps for the bounded poll loops.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::errors::{Result, TptError};

/// Sleep for `interval`, or fail with [`TptError::Interrupted`] as soon as
/// `cancel` fires. `activity` names what was being waited for.
pub async fn pause(interval: Duration, cancel: &CancellationToken, activity: &str) -> Result<()> {
    if cancel.is_cancelled() {
        warn!(activity, "interrupted");
        return Err(TptError::Interrupted(activity.to_string()));
    }
    tokio::select! {
        _ = sleep(interval) => Ok(()),
        _ = cancel.cancelled() => {
            warn!(activity, "interrupted");
            Err(TptError::Interrupted(activity.to_string()))
        }
    }
}
