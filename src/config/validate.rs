// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    ConfigFile, ExecutionConfig, RawConfigFile, RawExecutionSection, RawToolSection, ToolConfig,
};
use crate::errors::{Result, TptError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TptError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_tool(&raw.tool)?;
        validate_execution(&raw.execution)?;

        let startup_timeout = parse_duration(&raw.tool.startup_timeout).map_err(|e| {
            TptError::ConfigError(format!("[tool].startup_timeout: {e}"))
        })?;
        let readiness_timeout = parse_duration(&raw.tool.readiness_timeout).map_err(|e| {
            TptError::ConfigError(format!("[tool].readiness_timeout: {e}"))
        })?;

        Ok(ConfigFile {
            tool: ToolConfig::from_raw(raw.tool, startup_timeout, readiness_timeout),
            execution: ExecutionConfig::from(raw.execution),
        })
    }
}

fn validate_tool(tool: &RawToolSection) -> Result<()> {
    if tool.executables.is_empty() {
        return Err(TptError::ConfigError(
            "[tool].executables must list at least one TPT executable".to_string(),
        ));
    }
    if tool.port == 0 {
        return Err(TptError::ConfigError(
            "[tool].port must be >= 1 (got 0)".to_string(),
        ));
    }
    if tool.binding_name.trim().is_empty() {
        return Err(TptError::ConfigError(
            "[tool].binding_name must not be empty".to_string(),
        ));
    }
    if let Some(host) = &tool.host {
        if host.trim().is_empty() {
            return Err(TptError::ConfigError(
                "[tool].host must not be empty when given".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_execution(execution: &RawExecutionSection) -> Result<()> {
    let required = [
        ("project", execution.project.as_os_str().is_empty()),
        ("execution_config", execution.execution_config.trim().is_empty()),
        ("test_case", execution.test_case.trim().is_empty()),
        ("data_dir", execution.data_dir.as_os_str().is_empty()),
        ("report_dir", execution.report_dir.as_os_str().is_empty()),
        ("temp_test_set", execution.temp_test_set.trim().is_empty()),
    ];
    for (field, empty) in required {
        if empty {
            return Err(TptError::ConfigError(format!(
                "[execution].{field} must not be empty"
            )));
        }
    }
    if execution.data_dir == execution.report_dir {
        return Err(TptError::ConfigError(format!(
            "[execution].data_dir and report_dir must differ (both {:?})",
            execution.data_dir
        )));
    }
    if execution.artifact_dir.is_some()
        && execution.data_dir.file_name() == execution.report_dir.file_name()
    {
        return Err(TptError::ConfigError(format!(
            "[execution].data_dir and report_dir need distinct final names when artifact_dir is set (got {:?} and {:?})",
            execution.data_dir, execution.report_dir
        )));
    }
    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit: u64 = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
