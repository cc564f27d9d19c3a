// src/api/model.rs

//! Entities of the remote object model, composed from capability traits.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::capability::{Identifiable, Named, OrderedCollectionOwner};
use super::RemoteResult;

/// Handle to a live TPT instance.
///
/// The tool's lifetime is independent of this crate; dropping the handle
/// never shuts the tool down.
pub trait ToolApi: Send + Sync {
    /// True once the tool has finished initialising and accepts project
    /// and run operations.
    fn is_ready(&self) -> RemoteResult<bool>;

    fn version(&self) -> RemoteResult<String>;

    fn open_project(&self, path: &Path) -> RemoteResult<OpenResult>;

    fn open_projects(&self) -> RemoteResult<Vec<Arc<dyn Project>>>;

    /// Start the given execution configuration. Returns immediately; the
    /// returned status is polled for completion.
    fn run(&self, config: &dyn ExecutionConfiguration) -> RemoteResult<Arc<dyn ExecutionStatus>>;
}

/// Result of [`ToolApi::open_project`].
#[derive(Clone)]
pub struct OpenResult {
    /// `None` if the tool could not open the file.
    pub project: Option<Arc<dyn Project>>,
    /// Messages the tool produced while opening.
    pub logs: Vec<String>,
}

impl fmt::Debug for OpenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenResult")
            .field("project", &self.project.is_some())
            .field("logs", &self.logs)
            .finish()
    }
}

pub trait Project: Send + Sync {
    /// File the project was loaded from, if it has been saved.
    fn file(&self) -> RemoteResult<Option<PathBuf>>;

    fn execution_configurations(&self) -> RemoteResult<Vec<Arc<dyn ExecutionConfiguration>>>;

    /// Top level of the test-case tree.
    fn top_level_scenarios(&self) -> RemoteResult<Vec<ScenarioOrGroup>>;

    fn test_sets(&self) -> RemoteResult<Vec<Arc<dyn TestSet>>>;

    fn create_test_set(&self, name: &str) -> RemoteResult<Arc<dyn TestSet>>;

    fn delete_test_set(&self, test_set: &dyn TestSet) -> RemoteResult<()>;

    fn close(&self) -> RemoteResult<()>;
}

pub trait ExecutionConfiguration:
    Named + OrderedCollectionOwner<Item = Arc<dyn ExecutionConfigurationItem>> + Send + Sync
{
    fn data_dir(&self) -> RemoteResult<String>;

    fn set_data_dir(&self, path: &str) -> RemoteResult<()>;

    fn report_dir(&self) -> RemoteResult<String>;

    fn set_report_dir(&self, path: &str) -> RemoteResult<()>;
}

/// One platform/test-set pairing inside an execution configuration.
pub trait ExecutionConfigurationItem: Send + Sync {
    fn test_set(&self) -> RemoteResult<Option<Arc<dyn TestSet>>>;

    fn set_test_set(&self, test_set: Option<Arc<dyn TestSet>>) -> RemoteResult<()>;
}

/// A named selection of test cases ("scope").
pub trait TestSet: Named + Send + Sync {
    fn add_test_case(&self, case: &dyn Scenario) -> RemoteResult<()>;

    fn test_cases(&self) -> RemoteResult<Vec<Arc<dyn Scenario>>>;
}

/// A test case. Leaf of the test-case tree.
pub trait Scenario: Named + Identifiable + Send + Sync {}

pub trait ScenarioGroup:
    Named + OrderedCollectionOwner<Item = ScenarioOrGroup> + Send + Sync
{
}

#[derive(Clone)]
pub enum ScenarioOrGroup {
    Scenario(Arc<dyn Scenario>),
    Group(Arc<dyn ScenarioGroup>),
}

impl fmt::Debug for ScenarioOrGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, name) = match self {
            ScenarioOrGroup::Scenario(s) => ("Scenario", s.name()),
            ScenarioOrGroup::Group(g) => ("Group", g.name()),
        };
        match name {
            Ok(name) => write!(f, "{kind}({name:?})"),
            Err(_) => write!(f, "{kind}(<unavailable>)"),
        }
    }
}

/// Status of a started run.
pub trait ExecutionStatus: Send + Sync {
    fn is_running(&self) -> RemoteResult<bool>;

    fn is_pending(&self) -> RemoteResult<bool>;

    /// Ask the tool to abort the run.
    fn cancel(&self) -> RemoteResult<()>;
}
