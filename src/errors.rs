// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::api::RemoteError;

#[derive(Error, Debug)]
pub enum TptError {
    #[error("TPT executable not found (tried: {})", format_paths(.0))]
    ExecutableNotFound(Vec<PathBuf>),

    #[error("TPT did not register at {host}:{port} as '{binding}' within {}s", .waited.as_secs())]
    StartupTimeout {
        host: String,
        port: u16,
        binding: String,
        waited: Duration,
    },

    #[error("TPT API did not become ready within {}s", .0.as_secs())]
    ReadinessTimeout(Duration),

    #[error("interrupted while {0}")]
    Interrupted(String),

    #[error("execution configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("test case not found: {0}")]
    CaseNotFound(String),

    #[error("could not open project {}: {}", .path.display(), .logs.join("; "))]
    ProjectOpenFailed { path: PathBuf, logs: Vec<String> },

    #[error("remote communication fault: {0}")]
    RemoteCommunicationFault(#[from] RemoteError),

    #[error("malformed result artifact: {0}")]
    MalformedArtifact(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TptError {
    /// Interruptions are never retried by callers.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, TptError::Interrupted(_))
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<none configured>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TptError>;
