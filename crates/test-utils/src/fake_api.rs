//! Fake tool handle and registry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tpt_exec::api::{
    ExecutionConfiguration, ExecutionConfigurationItem, ExecutionStatus, LookupError, OpenResult,
    OrderedCollectionOwner, Project, RemoteError, RemoteResult, Registry, ToolApi,
};

use crate::fake_project::{Fault, FakeProject};

/// State of the execution configuration at the moment `run` was called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub config: String,
    pub data_dir: String,
    pub report_dir: String,
    /// Test set name per item, in item order.
    pub test_sets: Vec<Option<String>>,
    /// Test cases of each item's test set.
    pub test_cases: Vec<Vec<String>>,
}

#[derive(Debug)]
pub struct FakeExecutionStatus {
    running_polls: AtomicU32,
    cancelled: AtomicBool,
    pub poll_fault: Fault,
}

impl FakeExecutionStatus {
    /// Reports "running" for `running_polls` polls, then finished.
    pub fn new(running_polls: u32) -> Arc<Self> {
        Arc::new(Self {
            running_polls: AtomicU32::new(running_polls),
            cancelled: AtomicBool::new(false),
            poll_fault: Fault::never(),
        })
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl ExecutionStatus for FakeExecutionStatus {
    fn is_running(&self) -> RemoteResult<bool> {
        self.poll_fault.check("run status")?;
        if self.was_cancelled() {
            return Ok(false);
        }
        let left = self.running_polls.load(Ordering::SeqCst);
        if left == 0 {
            return Ok(false);
        }
        if left != u32::MAX {
            self.running_polls.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(true)
    }

    fn is_pending(&self) -> RemoteResult<bool> {
        Ok(false)
    }

    fn cancel(&self) -> RemoteResult<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Scriptable [`ToolApi`].
///
/// Ready on the first probe unless configured otherwise.
pub struct FakeToolApi {
    // Probes answering false before the first true; `None` = never ready.
    ready_after: Mutex<Option<u32>>,
    failing_probes: AtomicU32,
    probes: AtomicU32,
    version: Mutex<Option<String>>,
    projects: Mutex<HashMap<PathBuf, Arc<FakeProject>>>,
    open: Mutex<Vec<Arc<FakeProject>>>,
    open_logs: Mutex<Vec<String>>,
    run_polls: AtomicU32,
    runs: Mutex<Vec<RunRecord>>,
    statuses: Mutex<Vec<Arc<FakeExecutionStatus>>>,
    pub run_fault: Fault,
}

impl FakeToolApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ready_after: Mutex::new(Some(0)),
            failing_probes: AtomicU32::new(0),
            probes: AtomicU32::new(0),
            version: Mutex::new(Some("TPT 19".to_string())),
            projects: Mutex::new(HashMap::new()),
            open: Mutex::new(Vec::new()),
            open_logs: Mutex::new(Vec::new()),
            run_polls: AtomicU32::new(0),
            runs: Mutex::new(Vec::new()),
            statuses: Mutex::new(Vec::new()),
            run_fault: Fault::never(),
        })
    }

    pub fn ready_after(&self, not_ready_probes: u32) {
        *self.ready_after.lock().unwrap() = Some(not_ready_probes);
    }

    pub fn never_ready(&self) {
        *self.ready_after.lock().unwrap() = None;
    }

    /// The first `n` probes fail with a communication fault.
    pub fn fail_probes(&self, n: u32) {
        self.failing_probes.store(n, Ordering::SeqCst);
    }

    pub fn without_version(&self) {
        *self.version.lock().unwrap() = None;
    }

    /// Make `path` openable.
    pub fn add_project(&self, path: impl Into<PathBuf>, project: Arc<FakeProject>) {
        self.projects.lock().unwrap().insert(path.into(), project);
    }

    /// Messages returned when a project cannot be opened.
    pub fn set_open_logs(&self, logs: &[&str]) {
        *self.open_logs.lock().unwrap() = logs.iter().map(|s| s.to_string()).collect();
    }

    /// Every run reports "running" for this many polls; `u32::MAX` never ends.
    pub fn set_run_polls(&self, polls: u32) {
        self.run_polls.store(polls, Ordering::SeqCst);
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> Vec<RunRecord> {
        self.runs.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<Arc<FakeExecutionStatus>> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn open_project_count(&self) -> usize {
        self.open.lock().unwrap().len()
    }
}

fn record(config: &dyn ExecutionConfiguration) -> RemoteResult<RunRecord> {
    let mut test_sets = Vec::new();
    let mut test_cases = Vec::new();
    for item in config.items()? {
        match item.test_set()? {
            Some(set) => {
                test_sets.push(Some(set.name()?));
                let names = set
                    .test_cases()?
                    .iter()
                    .map(|c| c.name())
                    .collect::<RemoteResult<Vec<_>>>()?;
                test_cases.push(names);
            }
            None => {
                test_sets.push(None);
                test_cases.push(Vec::new());
            }
        }
    }
    Ok(RunRecord {
        config: config.name()?,
        data_dir: config.data_dir()?,
        report_dir: config.report_dir()?,
        test_sets,
        test_cases,
    })
}

impl ToolApi for FakeToolApi {
    fn is_ready(&self) -> RemoteResult<bool> {
        let probe = self.probes.fetch_add(1, Ordering::SeqCst);
        if probe < self.failing_probes.load(Ordering::SeqCst) {
            return Err(RemoteError::Communication("connection reset".to_string()));
        }
        Ok(match *self.ready_after.lock().unwrap() {
            Some(n) => probe >= n,
            None => false,
        })
    }

    fn version(&self) -> RemoteResult<String> {
        self.version
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RemoteError::Communication("version unavailable".to_string()))
    }

    fn open_project(&self, path: &Path) -> RemoteResult<OpenResult> {
        let found = self.projects.lock().unwrap().get(path).cloned();
        match found {
            Some(project) => {
                self.open.lock().unwrap().push(Arc::clone(&project));
                Ok(OpenResult {
                    project: Some(project as Arc<dyn Project>),
                    logs: Vec::new(),
                })
            }
            None => Ok(OpenResult {
                project: None,
                logs: self.open_logs.lock().unwrap().clone(),
            }),
        }
    }

    fn open_projects(&self) -> RemoteResult<Vec<Arc<dyn Project>>> {
        Ok(self
            .open
            .lock()
            .unwrap()
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn Project>)
            .collect())
    }

    fn run(&self, config: &dyn ExecutionConfiguration) -> RemoteResult<Arc<dyn ExecutionStatus>> {
        self.run_fault.check("run")?;
        let snapshot = record(config)?;
        self.runs.lock().unwrap().push(snapshot);
        let status = FakeExecutionStatus::new(self.run_polls.load(Ordering::SeqCst));
        self.statuses.lock().unwrap().push(Arc::clone(&status));
        Ok(status)
    }
}

/// Registry that answers "not bound" a configurable number of times before
/// handing out its tool handle.
pub struct FakeRegistry {
    api: Option<Arc<dyn ToolApi>>,
    misses: AtomicU32,
    lookups: Mutex<Vec<(String, u16, String)>>,
}

impl FakeRegistry {
    /// A tool is already registered.
    pub fn bound(api: Arc<dyn ToolApi>) -> Arc<Self> {
        Self::bound_after(api, 0)
    }

    /// The tool registers after `misses` failed lookups.
    pub fn bound_after(api: Arc<dyn ToolApi>, misses: u32) -> Arc<Self> {
        Arc::new(Self {
            api: Some(api),
            misses: AtomicU32::new(misses),
            lookups: Mutex::new(Vec::new()),
        })
    }

    /// Nothing ever registers.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            api: None,
            misses: AtomicU32::new(0),
            lookups: Mutex::new(Vec::new()),
        })
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn lookups(&self) -> Vec<(String, u16, String)> {
        self.lookups.lock().unwrap().clone()
    }
}

impl Registry for FakeRegistry {
    fn lookup(
        &self,
        host: &str,
        port: u16,
        binding: &str,
    ) -> Result<Arc<dyn ToolApi>, LookupError> {
        self.lookups
            .lock()
            .unwrap()
            .push((host.to_string(), port, binding.to_string()));

        let Some(api) = &self.api else {
            return Err(LookupError::Unreachable(format!("connection refused: {host}:{port}")));
        };
        if self.misses.load(Ordering::SeqCst) > 0 {
            self.misses.fetch_sub(1, Ordering::SeqCst);
            return Err(LookupError::NotBound(binding.to_string()));
        }
        Ok(Arc::clone(api))
    }
}
