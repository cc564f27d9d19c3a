// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::execution::transaction::DEFAULT_STATUS_POLL_INTERVAL;
use crate::execution::{SingleCaseRequest, DEFAULT_TEMP_TEST_SET};
use crate::launch::readiness::DEFAULT_POLL_INTERVAL;
use crate::launch::{default_host, AcquireOptions, Platform, ReadinessOptions};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [tool]
/// executables = ["C:/Program Files/PikeTec/TPT 19/tpt.exe", "/opt/tpt/tpt"]
/// port = 1099
/// binding_name = "TptApi"
/// startup_timeout = "60s"
///
/// [execution]
/// project = "models/brake.tpt"
/// execution_config = "EC1"
/// test_case = "TC_Braking_3"
/// data_dir = "out/data"
/// report_dir = "out/report"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub tool: RawToolSection,
    pub execution: RawExecutionSection,
}

/// `[tool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawToolSection {
    /// Candidate TPT executables, first existing one wins.
    #[serde(default)]
    pub executables: Vec<PathBuf>,

    /// Registry host. Defaults to `$HOSTNAME`, then `localhost`.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_binding_name")]
    pub binding_name: String,

    /// Extra arguments appended to the TPT command line.
    #[serde(default)]
    pub arguments: Vec<String>,

    #[serde(default = "default_startup_timeout")]
    pub startup_timeout: String,

    #[serde(default = "default_readiness_timeout")]
    pub readiness_timeout: String,
}

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawExecutionSection {
    pub project: PathBuf,
    pub execution_config: String,
    pub test_case: String,
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,

    #[serde(default = "default_temp_test_set")]
    pub temp_test_set: String,

    /// Where artifacts are copied after the run. No copy-back if absent.
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    /// Close the project in TPT once the run is done.
    #[serde(default)]
    pub close_project: bool,
}

fn default_port() -> u16 {
    1099
}

fn default_binding_name() -> String {
    "TptApi".to_string()
}

fn default_startup_timeout() -> String {
    "60s".to_string()
}

fn default_readiness_timeout() -> String {
    "10m".to_string()
}

fn default_temp_test_set() -> String {
    DEFAULT_TEMP_TEST_SET.to_string()
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub tool: ToolConfig,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub executables: Vec<PathBuf>,
    pub host: String,
    pub port: u16,
    pub binding_name: String,
    pub arguments: Vec<String>,
    pub startup_timeout: Duration,
    pub readiness_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    pub project: PathBuf,
    pub execution_config: String,
    pub test_case: String,
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,
    pub temp_test_set: String,
    pub artifact_dir: Option<PathBuf>,
    pub close_project: bool,
}

impl ToolConfig {
    pub(crate) fn from_raw(
        raw: RawToolSection,
        startup_timeout: Duration,
        readiness_timeout: Duration,
    ) -> Self {
        Self {
            executables: raw.executables,
            host: raw.host.unwrap_or_else(default_host),
            port: raw.port,
            binding_name: raw.binding_name,
            arguments: raw.arguments,
            startup_timeout,
            readiness_timeout,
        }
    }
}

impl From<RawExecutionSection> for ExecutionConfig {
    fn from(raw: RawExecutionSection) -> Self {
        Self {
            project: raw.project,
            execution_config: raw.execution_config,
            test_case: raw.test_case,
            data_dir: raw.data_dir,
            report_dir: raw.report_dir,
            temp_test_set: raw.temp_test_set,
            artifact_dir: raw.artifact_dir,
            close_project: raw.close_project,
        }
    }
}

impl ConfigFile {
    pub fn acquire_options(&self) -> AcquireOptions {
        AcquireOptions {
            host: self.tool.host.clone(),
            port: self.tool.port,
            binding: self.tool.binding_name.clone(),
            executables: self.tool.executables.clone(),
            arguments: self.tool.arguments.clone(),
            startup_timeout: self.tool.startup_timeout,
            lookup_interval: DEFAULT_POLL_INTERVAL,
            readiness: ReadinessOptions {
                timeout: self.tool.readiness_timeout,
                interval: DEFAULT_POLL_INTERVAL,
            },
            platform: Platform::current(),
        }
    }

    pub fn single_case_request(&self) -> SingleCaseRequest {
        SingleCaseRequest {
            execution_config: self.execution.execution_config.clone(),
            test_case: self.execution.test_case.clone(),
            data_dir: self.execution.data_dir.clone(),
            report_dir: self.execution.report_dir.clone(),
            temp_test_set: self.execution.temp_test_set.clone(),
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
        }
    }
}
