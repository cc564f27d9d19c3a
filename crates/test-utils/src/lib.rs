pub mod builders;
pub mod fake_api;
pub mod fake_process;
pub mod fake_project;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Reads `TPT_EXEC_LOG` like the binary does, so
/// `TPT_EXEC_LOG=tpt_exec::execution=debug cargo test` narrows output to
/// the transaction. Forwarded TPT output logs under the
/// `tpt_exec::launch::drain` target.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("TPT_EXEC_LOG")
            .unwrap_or_else(|_| EnvFilter::new("warn,tpt_exec=info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_line_number(true)
            .try_init();
    });
}

/// Run a future with a 5-second timeout.
///
/// Under `start_paused` runtimes the timeout is virtual time as well, so it
/// is only a guard against a poll loop that never ends.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
