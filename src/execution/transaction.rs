// src/execution/transaction.rs

//! Run exactly one test case of an execution configuration.
//!
//! TPT offers no transactions on its configuration objects, so this module
//! applies a compensating-action protocol: record an
//! [`ExecutionScopeSnapshot`], mutate, run, then always replay the undo
//! steps before returning. Remote faults at any point end up as a `false`
//! result, never as an unrestored configuration.
//!
//! Single writer: nothing else may modify the same execution configuration
//! while a transaction is in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::copy_back::ArtifactCopyBack;
use super::project::execution_config_by_name;
use super::search::{find_test_case, unique_test_set_name};
use super::snapshot::ExecutionScopeSnapshot;
use crate::api::{
    ExecutionConfiguration, ExecutionStatus, Named, Project, Scenario, TestSet, ToolApi,
};
use crate::errors::{Result, TptError};
use crate::fs::FileSystem;
use crate::wait::pause;

pub const DEFAULT_TEMP_TEST_SET: &str = "JENKINS Exec";
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What to run and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleCaseRequest {
    pub execution_config: String,
    pub test_case: String,
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,
    /// Base name of the temporary test set.
    pub temp_test_set: String,
    pub status_poll_interval: Duration,
}

impl SingleCaseRequest {
    pub fn new(
        execution_config: impl Into<String>,
        test_case: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        report_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            execution_config: execution_config.into(),
            test_case: test_case.into(),
            data_dir: data_dir.into(),
            report_dir: report_dir.into(),
            temp_test_set: DEFAULT_TEMP_TEST_SET.to_string(),
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
        }
    }
}

/// Mutations applied so far, so compensation knows what to undo.
#[derive(Default)]
struct Applied {
    data_dir: Option<PathBuf>,
    report_dir: Option<PathBuf>,
    temp_test_set: Option<Arc<dyn TestSet>>,
    run_started: bool,
}

pub struct SingleCaseTransaction<'a> {
    api: &'a dyn ToolApi,
    project: &'a dyn Project,
    fs: &'a dyn FileSystem,
    copy_back: &'a dyn ArtifactCopyBack,
}

impl<'a> SingleCaseTransaction<'a> {
    pub fn new(
        api: &'a dyn ToolApi,
        project: &'a dyn Project,
        fs: &'a dyn FileSystem,
        copy_back: &'a dyn ArtifactCopyBack,
    ) -> Self {
        Self {
            api,
            project,
            fs,
            copy_back,
        }
    }

    /// Run the request. Returns `true` only if the run completed and the
    /// configuration was fully restored.
    pub async fn run(&self, req: &SingleCaseRequest, cancel: &CancellationToken) -> bool {
        let (config, case) = match self.resolve(req) {
            Ok(found) => found,
            Err(e) => {
                error!(
                    config = %req.execution_config,
                    test_case = %req.test_case,
                    error = %e,
                    "cannot run test case"
                );
                return false;
            }
        };

        let snapshot = match ExecutionScopeSnapshot::capture(config.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(config = %req.execution_config, error = %e, "could not read execution configuration");
                return false;
            }
        };

        let mut applied = Applied::default();
        let executed = self
            .mutate_and_run(config.as_ref(), case.as_ref(), &snapshot, req, &mut applied, cancel)
            .await;

        if let Err(e) = &executed {
            error!(
                config = %req.execution_config,
                test_case = %req.test_case,
                error = %e,
                "test case execution failed"
            );
        }

        let restored = self.compensate(config.as_ref(), snapshot, applied);
        executed.is_ok() && restored
    }

    fn resolve(
        &self,
        req: &SingleCaseRequest,
    ) -> Result<(Arc<dyn ExecutionConfiguration>, Arc<dyn Scenario>)> {
        let config = execution_config_by_name(self.project, &req.execution_config)?
            .ok_or_else(|| TptError::ConfigNotFound(req.execution_config.clone()))?;

        let roots = self.project.top_level_scenarios()?;
        let case = find_test_case(&roots, &req.test_case)?
            .ok_or_else(|| TptError::CaseNotFound(req.test_case.clone()))?;

        Ok((config, case))
    }

    async fn mutate_and_run(
        &self,
        config: &dyn ExecutionConfiguration,
        case: &dyn Scenario,
        snapshot: &ExecutionScopeSnapshot,
        req: &SingleCaseRequest,
        applied: &mut Applied,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let data_dir = self.prepare_dir(&req.data_dir, "test data")?;
        info!(path = %data_dir.display(), "setting test data directory");
        config.set_data_dir(&data_dir.to_string_lossy())?;
        applied.data_dir = Some(data_dir);

        let report_dir = self.prepare_dir(&req.report_dir, "report")?;
        info!(path = %report_dir.display(), "setting report directory");
        config.set_report_dir(&report_dir.to_string_lossy())?;
        applied.report_dir = Some(report_dir);

        let name = unique_test_set_name(self.project, &req.temp_test_set)?;
        info!(test_set = %name, test_case = %req.test_case, "creating temporary test set");
        let test_set = self.project.create_test_set(&name)?;
        applied.temp_test_set = Some(Arc::clone(&test_set));
        test_set.add_test_case(case)?;

        for item in snapshot.items() {
            item.set_test_set(Some(Arc::clone(&test_set)))?;
        }

        info!(config = %req.execution_config, "starting execution");
        let status = self.api.run(config)?;
        applied.run_started = true;

        await_completion(status.as_ref(), req.status_poll_interval, cancel).await
    }

    /// Create `dir` if needed and empty it.
    fn prepare_dir(&self, dir: &Path, what: &str) -> Result<PathBuf> {
        let path = self.fs.absolutize(dir)?;
        info!(path = %path.display(), "creating and/or cleaning {what} directory");
        self.fs.create_dir_all(&path)?;
        self.fs.clear_dir(&path)?;
        Ok(path)
    }

    /// Undo steps, in order: test sets, copy-back, directories, temporary
    /// test set. Each step runs even if an earlier one failed.
    fn compensate(
        &self,
        config: &dyn ExecutionConfiguration,
        snapshot: ExecutionScopeSnapshot,
        applied: Applied,
    ) -> bool {
        let mut restored = snapshot.restore_test_sets();

        if applied.run_started {
            let dirs: Vec<PathBuf> = [applied.data_dir, applied.report_dir]
                .into_iter()
                .flatten()
                .collect();
            if let Err(e) = self.copy_back.copy_back(&dirs) {
                error!(error = %e, "could not copy results back");
            }
        }

        restored &= snapshot.restore_directories(config);

        if let Some(test_set) = applied.temp_test_set {
            let name = test_set.name().unwrap_or_else(|_| "<unknown>".to_string());
            info!(test_set = %name, "deleting temporary test set");
            if let Err(e) = self.project.delete_test_set(test_set.as_ref()) {
                warn!(test_set = %name, error = %e, "could not delete temporary test set");
            }
        }

        restored
    }
}

/// Poll the run once per `interval` until it is neither running nor
/// pending. On interrupt the run is cancelled before returning.
async fn await_completion(
    status: &dyn ExecutionStatus,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    loop {
        if !(status.is_running()? || status.is_pending()?) {
            info!("execution finished");
            return Ok(());
        }
        if let Err(e) = pause(interval, cancel, "waiting for the execution to finish").await {
            info!("cancelling TPT execution");
            if let Err(cancel_err) = status.cancel() {
                warn!(error = %cancel_err, "could not cancel TPT execution");
            }
            return Err(e);
        }
    }
}
