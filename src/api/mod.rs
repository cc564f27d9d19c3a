// src/api/mod.rs

//! Client-side view of the TPT remote object model.
//!
//! The transport (registry lookup and remote proxies) is supplied by the
//! embedding application. This module only describes the surface the
//! orchestration code needs:
//!
//! - [`capability`] holds the small capability traits (`Named`,
//!   `Identifiable`, `OrderedCollectionOwner`) that entities are composed
//!   from.
//! - [`model`] declares the entities: tool handle, project, execution
//!   configuration, test sets, scenarios and run status.
//! - [`registry`] is the name/port addressed lookup used to find a running
//!   tool instance.
//!
//! Every remote call is a blocking proxy call that can fail with
//! [`RemoteError`].

pub mod capability;
pub mod model;
pub mod registry;

use thiserror::Error;

pub use capability::{Identifiable, Named, OrderedCollectionOwner};
pub use model::{
    ExecutionConfiguration, ExecutionConfigurationItem, ExecutionStatus, OpenResult, Project,
    Scenario, ScenarioGroup, ScenarioOrGroup, TestSet, ToolApi,
};
pub use registry::{LookupError, Registry};

/// Failure of a single remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Transport level fault (connection refused, proxy gone, ...).
    #[error("remote call failed: {0}")]
    Communication(String),

    /// The tool rejected the request.
    #[error("API error: {0}")]
    Api(String),
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
