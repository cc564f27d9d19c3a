// src/execution/mod.rs

//! Single-case execution against an open project.
//!
//! - [`transaction`] is the mutate-execute-restore transaction.
//! - [`snapshot`] holds the undo record it restores from.
//! - [`search`] finds the test case and names the temporary test set.
//! - [`project`] opens/closes projects and looks up configurations.
//! - [`copy_back`] moves produced artifacts to durable storage.

pub mod copy_back;
pub mod project;
pub mod search;
pub mod snapshot;
pub mod transaction;

pub use copy_back::{ArtifactCopyBack, LocalCopyBack, SkipCopyBack};
pub use project::{close_project, execution_config_by_name, open_project};
pub use search::{find_test_case, unique_test_set_name};
pub use snapshot::ExecutionScopeSnapshot;
pub use transaction::{SingleCaseRequest, SingleCaseTransaction, DEFAULT_TEMP_TEST_SET};
