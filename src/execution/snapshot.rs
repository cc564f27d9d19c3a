// src/execution/snapshot.rs

//! Undo record for the execution-configuration fields the transaction
//! overwrites.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use crate::api::{ExecutionConfiguration, ExecutionConfigurationItem, RemoteResult, TestSet};

type Assignment = (Arc<dyn ExecutionConfigurationItem>, Option<Arc<dyn TestSet>>);

/// Data dir, report dir and per-item test set of one configuration, taken
/// before anything is changed.
pub struct ExecutionScopeSnapshot {
    data_dir: String,
    report_dir: String,
    assignments: Vec<Assignment>,
}

impl fmt::Debug for ExecutionScopeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets: Vec<Option<String>> = self
            .assignments
            .iter()
            .map(|(_, set)| set.as_ref().and_then(|s| s.name().ok()))
            .collect();
        f.debug_struct("ExecutionScopeSnapshot")
            .field("data_dir", &self.data_dir)
            .field("report_dir", &self.report_dir)
            .field("test_sets", &sets)
            .finish()
    }
}

impl ExecutionScopeSnapshot {
    pub fn capture(config: &dyn ExecutionConfiguration) -> RemoteResult<Self> {
        let data_dir = config.data_dir()?;
        let report_dir = config.report_dir()?;
        let assignments = config
            .items()?
            .into_iter()
            .map(|item| -> RemoteResult<Assignment> {
                let set = item.test_set()?;
                Ok((item, set))
            })
            .collect::<RemoteResult<Vec<_>>>()?;

        Ok(Self {
            data_dir,
            report_dir,
            assignments,
        })
    }

    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    pub fn report_dir(&self) -> &str {
        &self.report_dir
    }

    /// Configuration items in the order they were captured.
    pub fn items(&self) -> impl Iterator<Item = &Arc<dyn ExecutionConfigurationItem>> {
        self.assignments.iter().map(|(item, _)| item)
    }

    /// Put every item's original test set back. Keeps going past failures;
    /// returns `false` if any item could not be restored.
    pub fn restore_test_sets(&self) -> bool {
        let mut all_restored = true;
        for (index, (item, original)) in self.assignments.iter().enumerate() {
            if let Err(e) = item.set_test_set(original.clone()) {
                error!(item = index, error = %e, "could not restore test set of configuration item");
                all_restored = false;
            }
        }
        all_restored
    }

    /// Put the original data and report directories back. Consumes the
    /// snapshot: this is the last restoration step.
    pub fn restore_directories(self, config: &dyn ExecutionConfiguration) -> bool {
        info!(
            data_dir = %self.data_dir,
            report_dir = %self.report_dir,
            "resetting test data and report directory"
        );
        let mut all_restored = true;
        if let Err(e) = config.set_data_dir(&self.data_dir) {
            error!(error = %e, "could not restore test data directory");
            all_restored = false;
        }
        if let Err(e) = config.set_report_dir(&self.report_dir) {
            error!(error = %e, "could not restore report directory");
            all_restored = false;
        }
        all_restored
    }
}
