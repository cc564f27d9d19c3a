// src/api/registry.rs

use std::sync::Arc;

use thiserror::Error;

use super::model::ToolApi;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Registry reachable, but nothing bound under the name.
    #[error("'{0}' is not bound in the registry")]
    NotBound(String),

    /// Registry not reachable (tool not started yet, wrong port, ...).
    #[error("registry unreachable: {0}")]
    Unreachable(String),
}

/// Name/port addressed lookup of a running tool instance.
pub trait Registry: Send + Sync {
    fn lookup(&self, host: &str, port: u16, binding: &str)
    -> Result<Arc<dyn ToolApi>, LookupError>;
}
