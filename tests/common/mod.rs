#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tpt_exec::fs::mock::MockFileSystem;
use tpt_exec::launch::{AcquireOptions, Platform, ReadinessOptions, ToolConnector};
use tpt_exec_test_utils::fake_api::FakeRegistry;
use tpt_exec_test_utils::fake_process::{CollectingSink, FakeLauncher};

pub use tpt_exec_test_utils::init_tracing;

pub const TPT_EXE: &str = "/opt/tpt/tpt";

/// Launch options with short timeouts, addressing `localhost:1099/TptApi`.
pub fn acquire_options() -> AcquireOptions {
    let mut opts = AcquireOptions::new(
        1099,
        "TptApi",
        vec![PathBuf::from("/missing/tpt"), PathBuf::from(TPT_EXE)],
    );
    opts.host = "localhost".to_string();
    opts.startup_timeout = Duration::from_secs(2);
    opts.lookup_interval = Duration::from_millis(100);
    opts.readiness = ReadinessOptions {
        timeout: Duration::from_secs(1),
        interval: Duration::from_millis(100),
    };
    opts.platform = Platform::Linux;
    opts
}

/// Connector plus the fakes behind it.
pub struct Harness {
    pub registry: Arc<FakeRegistry>,
    pub launcher: Arc<FakeLauncher>,
    pub fs: MockFileSystem,
    pub sink: Arc<CollectingSink>,
    pub connector: ToolConnector,
}

impl Harness {
    /// `TPT_EXE` exists in the filesystem.
    pub fn new(registry: Arc<FakeRegistry>) -> Self {
        let fs = MockFileSystem::new();
        fs.add_file(TPT_EXE, b"binary".to_vec());
        Self::with_fs(registry, fs)
    }

    pub fn with_fs(registry: Arc<FakeRegistry>, fs: MockFileSystem) -> Self {
        let launcher = FakeLauncher::new();
        let sink = CollectingSink::new();
        let connector = ToolConnector::new(
            registry.clone(),
            launcher.clone(),
            Arc::new(fs.clone()),
            sink.clone(),
        );
        Self {
            registry,
            launcher,
            fs,
            sink,
            connector,
        }
    }
}
