// src/execution/project.rs

//! Project-level helpers on top of a ready tool handle.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::api::{ExecutionConfiguration, Project, RemoteResult, ToolApi};
use crate::errors::{Result, TptError};

/// Open the project file in TPT.
pub fn open_project(api: &dyn ToolApi, path: &Path) -> Result<Arc<dyn Project>> {
    info!(path = %path.display(), "opening TPT project");
    let opened = api.open_project(path)?;
    match opened.project {
        Some(project) => Ok(project),
        None => {
            error!(
                path = %path.display(),
                logs = %opened.logs.join("\n"),
                "could not open project"
            );
            Err(TptError::ProjectOpenFailed {
                path: path.to_path_buf(),
                logs: opened.logs,
            })
        }
    }
}

/// Close the open project loaded from `path`, if any.
///
/// A project that is not open counts as closed, so the call succeeds.
pub fn close_project(api: &dyn ToolApi, path: &Path) -> Result<()> {
    for project in api.open_projects()? {
        if project.file()?.as_deref() != Some(path) {
            continue;
        }
        info!(path = %path.display(), "closing project");
        project.close()?;
        return Ok(());
    }
    info!(path = %path.display(), "project was already closed");
    Ok(())
}

/// Execution configuration with exactly this name.
pub fn execution_config_by_name(
    project: &dyn Project,
    name: &str,
) -> RemoteResult<Option<Arc<dyn ExecutionConfiguration>>> {
    for config in project.execution_configurations()? {
        if config.name()? == name {
            return Ok(Some(config));
        }
    }
    Ok(None)
}
