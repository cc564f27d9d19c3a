// tests/single_case_transaction.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tpt_exec::errors::{Result as TptResult, TptError};
use tpt_exec::execution::{ArtifactCopyBack, SingleCaseRequest, SingleCaseTransaction};
use tpt_exec::fs::mock::MockFileSystem;
use tpt_exec::fs::FileSystem;
use tpt_exec_test_utils::fake_api::{FakeToolApi, RunRecord};
use tpt_exec_test_utils::fake_project::BrakeProject;

type TestResult = Result<(), Box<dyn Error>>;

/// Records what it was asked to copy; optionally fails.
#[derive(Default)]
struct RecordingCopyBack {
    calls: Mutex<Vec<Vec<PathBuf>>>,
    fail: bool,
}

impl RecordingCopyBack {
    fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn calls(&self) -> Vec<Vec<PathBuf>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ArtifactCopyBack for RecordingCopyBack {
    fn copy_back(&self, dirs: &[PathBuf]) -> TptResult<()> {
        self.calls.lock().unwrap().push(dirs.to_vec());
        if self.fail {
            return Err(TptError::Other(anyhow::anyhow!("disk full")));
        }
        Ok(())
    }
}

fn request() -> SingleCaseRequest {
    let mut req =
        SingleCaseRequest::new("EC1", "TC_Braking_3", "/work/out/data", "/work/out/report");
    req.status_poll_interval = Duration::from_millis(100);
    req
}

struct Fixture {
    api: Arc<FakeToolApi>,
    brake: BrakeProject,
    fs: MockFileSystem,
    copy_back: RecordingCopyBack,
}

impl Fixture {
    fn new() -> Self {
        Self::with(BrakeProject::new(), RecordingCopyBack::default())
    }

    fn with(brake: BrakeProject, copy_back: RecordingCopyBack) -> Self {
        Self {
            api: FakeToolApi::new(),
            brake,
            fs: MockFileSystem::new(),
            copy_back,
        }
    }

    async fn run(&self, req: &SingleCaseRequest) -> bool {
        self.run_with(req, &CancellationToken::new()).await
    }

    async fn run_with(&self, req: &SingleCaseRequest, cancel: &CancellationToken) -> bool {
        SingleCaseTransaction::new(
            self.api.as_ref(),
            self.brake.project.as_ref(),
            &self.fs,
            &self.copy_back,
        )
        .run(req, cancel)
        .await
    }

    /// EC1 looks exactly as it did before the transaction.
    fn assert_ec1_restored(&self) {
        assert_eq!(self.brake.ec1.current_data_dir(), "/orig/data");
        assert_eq!(self.brake.ec1.current_report_dir(), "/orig/report");
        assert_eq!(
            self.brake.ec1.test_set_names(),
            vec![Some("Regression".to_string()), Some("Regression".to_string())]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn single_case_runs_in_isolation_and_everything_is_restored() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.api.set_run_polls(3);

    assert!(f.run(&request()).await);

    let runs = f.api.runs();
    assert_eq!(
        runs,
        vec![RunRecord {
            config: "EC1".to_string(),
            data_dir: "/work/out/data".to_string(),
            report_dir: "/work/out/report".to_string(),
            test_sets: vec![
                Some("JENKINS Exec".to_string()),
                Some("JENKINS Exec".to_string())
            ],
            test_cases: vec![
                vec!["TC_Braking_3".to_string()],
                vec!["TC_Braking_3".to_string()]
            ],
        }]
    );

    f.assert_ec1_restored();
    assert_eq!(f.brake.project.test_set_names(), vec!["Regression"]);
    assert_eq!(f.brake.project.deleted_test_sets(), vec!["JENKINS Exec"]);
    assert!(f.fs.is_dir(Path::new("/work/out/data")));
    assert!(f.fs.is_dir(Path::new("/work/out/report")));
    assert_eq!(
        f.copy_back.calls(),
        vec![vec![
            PathBuf::from("/work/out/data"),
            PathBuf::from("/work/out/report")
        ]]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn output_directories_are_emptied_before_the_run() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.fs.add_file("/work/out/data/stale.csv", b"old".to_vec());
    f.fs.add_file("/work/out/report/old/report.html", b"old".to_vec());
    f.fs.add_file("/work/keep.txt", b"keep".to_vec());

    assert!(f.run(&request()).await);

    assert_eq!(f.fs.file_paths(), vec![PathBuf::from("/work/keep.txt")]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn temporary_test_set_name_does_not_clash() -> TestResult {
    init_tracing();

    let f = Fixture::with(
        BrakeProject::with_test_sets(&["JENKINS Exec", "JENKINS Exec 2"]),
        RecordingCopyBack::default(),
    );

    assert!(f.run(&request()).await);

    assert_eq!(
        f.api.runs()[0].test_sets,
        vec![
            Some("JENKINS Exec 3".to_string()),
            Some("JENKINS Exec 3".to_string())
        ]
    );
    assert_eq!(
        f.brake.project.test_set_names(),
        vec!["Regression", "JENKINS Exec", "JENKINS Exec 2"]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn items_without_test_set_get_none_back() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    let req = SingleCaseRequest::new("EC2", "TC_Steering_1", "/work/d2", "/work/r2");

    assert!(f.run(&req).await);

    assert_eq!(
        f.api.runs()[0].test_sets,
        vec![Some("JENKINS Exec".to_string())]
    );
    assert_eq!(f.brake.ec2.test_set_names(), vec![None]);
    assert_eq!(f.brake.ec2.current_data_dir(), "/orig/data2");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unknown_execution_config_mutates_nothing() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    let mut req = request();
    req.execution_config = "EC9".to_string();

    assert!(!f.run(&req).await);

    assert!(f.api.runs().is_empty());
    assert!(f.brake.project.created_test_sets().is_empty());
    assert!(!f.fs.exists(Path::new("/work/out/data")));
    f.assert_ec1_restored();
    assert_eq!(f.brake.ec1.fake_items()[0].set_calls(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unknown_test_case_mutates_nothing() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    let mut req = request();
    req.test_case = "TC_Braking_99".to_string();

    assert!(!f.run(&req).await);

    assert!(f.api.runs().is_empty());
    assert!(f.brake.project.created_test_sets().is_empty());
    assert!(f.copy_back.calls().is_empty());
    f.assert_ec1_restored();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unreadable_configuration_mutates_nothing() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.brake.ec1.items_fault.always();

    assert!(!f.run(&request()).await);

    assert!(f.brake.project.created_test_sets().is_empty());
    assert_eq!(f.brake.ec1.current_data_dir(), "/orig/data");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_run_start_is_compensated() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.api.run_fault.always();

    assert!(!f.run(&request()).await);

    f.assert_ec1_restored();
    assert_eq!(f.brake.project.test_set_names(), vec!["Regression"]);
    // Nothing ran, so nothing is copied.
    assert!(f.copy_back.calls().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failure_while_reassigning_items_is_compensated() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    // Second item rejects every assignment, including its restoration.
    f.brake.ec1.fake_items()[1].set_fault.always();

    assert!(!f.run(&request()).await);

    assert!(f.api.runs().is_empty());
    assert_eq!(
        f.brake.ec1.test_set_names(),
        vec![Some("Regression".to_string()), Some("Regression".to_string())]
    );
    assert_eq!(f.brake.ec1.current_data_dir(), "/orig/data");
    assert_eq!(f.brake.ec1.current_report_dir(), "/orig/report");
    assert_eq!(f.brake.project.deleted_test_sets(), vec!["JENKINS Exec"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failed_restoration_step_fails_result_but_later_steps_run() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    // Mutation succeeds, restoring the data dir fails.
    f.brake.ec1.data_dir_fault.after(1);

    assert!(!f.run(&request()).await);

    assert_eq!(f.api.runs().len(), 1);
    assert_eq!(f.brake.ec1.current_data_dir(), "/work/out/data");
    assert_eq!(f.brake.ec1.current_report_dir(), "/orig/report");
    assert_eq!(
        f.brake.ec1.test_set_names(),
        vec![Some("Regression".to_string()), Some("Regression".to_string())]
    );
    assert_eq!(f.brake.project.deleted_test_sets(), vec!["JENKINS Exec"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn directory_preparation_failure_is_compensated() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.fs.fail_on("/work/out/report");

    assert!(!f.run(&request()).await);

    assert!(f.api.runs().is_empty());
    assert!(f.brake.project.created_test_sets().is_empty());
    f.assert_ec1_restored();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn copy_back_failure_does_not_fail_the_run() -> TestResult {
    init_tracing();

    let f = Fixture::with(BrakeProject::new(), RecordingCopyBack::failing());

    assert!(f.run(&request()).await);

    assert_eq!(f.copy_back.calls().len(), 1);
    f.assert_ec1_restored();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn temp_test_set_deletion_failure_is_only_logged() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.brake.project.delete_fault.always();

    assert!(f.run(&request()).await);

    f.assert_ec1_restored();
    assert_eq!(
        f.brake.project.test_set_names(),
        vec!["Regression", "JENKINS Exec"]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn interrupt_cancels_run_and_still_restores() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.api.set_run_polls(u32::MAX);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            cancel.cancel();
        });
    }

    assert!(!f.run_with(&request(), &cancel).await);

    let status = f.api.last_status().ok_or("run never started")?;
    assert!(status.was_cancelled());
    f.assert_ec1_restored();
    assert_eq!(f.brake.project.deleted_test_sets(), vec!["JENKINS Exec"]);
    // The run had started, so whatever it produced is kept.
    assert_eq!(f.copy_back.calls().len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn long_run_is_polled_until_finished() -> TestResult {
    init_tracing();

    let f = Fixture::new();
    f.api.set_run_polls(30);

    let started = tokio::time::Instant::now();
    assert!(f.run(&request()).await);

    // 30 polls at 100 ms.
    assert!(started.elapsed() >= Duration::from_secs(3));
    f.assert_ec1_restored();
    Ok(())
}
