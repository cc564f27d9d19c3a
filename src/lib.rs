// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod execution;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod result;
pub mod wait;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::Registry;
use crate::cli::{CliArgs, Command};
use crate::config::model::ConfigFile;
use crate::config::{default_config_path, load_and_validate};
use crate::execution::{
    close_project, open_project, ArtifactCopyBack, LocalCopyBack, SingleCaseTransaction,
    SkipCopyBack,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::launch::{select_executable, LaunchCommand, ToolConnector};
use crate::result::{LogLevel, ParsedResult};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Check { config } => {
            let path = config.unwrap_or_else(default_config_path);
            let cfg = load_and_validate(&path)?;
            print_launch_plan(&cfg, &RealFileSystem);
            Ok(())
        }
        Command::Parse { path, verbose } => {
            let parsed = result::parse_file(&RealFileSystem, &path)?;
            print_result(&parsed, verbose);
            Ok(())
        }
    }
}

/// Everything one build step needs: acquire TPT, open the project, run the
/// configured test case, optionally close the project again.
///
/// The registry transport comes from the embedding application.
pub struct Session {
    connector: ToolConnector,
    fs: Arc<dyn FileSystem>,
    copy_back: Arc<dyn ArtifactCopyBack>,
}

impl Session {
    pub fn new(
        connector: ToolConnector,
        fs: Arc<dyn FileSystem>,
        copy_back: Arc<dyn ArtifactCopyBack>,
    ) -> Self {
        Self {
            connector,
            fs,
            copy_back,
        }
    }

    /// Production wiring: real processes and filesystem, and a local
    /// copy-back if `[execution].artifact_dir` is set.
    pub fn from_config(cfg: &ConfigFile, registry: Arc<dyn Registry>) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let copy_back: Arc<dyn ArtifactCopyBack> = match &cfg.execution.artifact_dir {
            Some(dir) => Arc::new(LocalCopyBack::new(Arc::clone(&fs), dir.clone())),
            None => Arc::new(SkipCopyBack),
        };
        Self::new(ToolConnector::with_registry(registry), fs, copy_back)
    }

    /// Returns `true` if the test case ran and the project was left as it
    /// was found.
    pub async fn run(&self, cfg: &ConfigFile, cancel: &CancellationToken) -> bool {
        let api = match self.connector.acquire(&cfg.acquire_options(), cancel).await {
            Ok(api) => api,
            Err(e) => {
                error!(
                    host = %cfg.tool.host,
                    port = cfg.tool.port,
                    binding = %cfg.tool.binding_name,
                    error = %e,
                    "could not connect to TPT"
                );
                return false;
            }
        };

        let project_path = match self.fs.absolutize(&cfg.execution.project) {
            Ok(p) => p,
            Err(e) => {
                error!(path = %cfg.execution.project.display(), error = %e, "invalid project path");
                return false;
            }
        };

        let project = match open_project(api.as_ref(), &project_path) {
            Ok(project) => project,
            Err(e) => {
                error!(error = %e, "could not open TPT project");
                return false;
            }
        };

        let request = cfg.single_case_request();
        let ok = SingleCaseTransaction::new(
            api.as_ref(),
            project.as_ref(),
            self.fs.as_ref(),
            self.copy_back.as_ref(),
        )
        .run(&request, cancel)
        .await;

        if cfg.execution.close_project {
            if let Err(e) = close_project(api.as_ref(), &project_path) {
                warn!(path = %project_path.display(), error = %e, "could not close project");
            }
        }

        info!(success = ok, test_case = %request.test_case, "single test case execution done");
        ok
    }
}

/// Run a [`Session`] with Ctrl-C mapped to the interrupt signal.
pub async fn run_session(cfg: &ConfigFile, registry: Arc<dyn Registry>) -> bool {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; interrupting");
            cancel.cancel();
        });
    }
    Session::from_config(cfg, registry).run(cfg, &cancel).await
}

/// `check` output: what would be attached to or started.
fn print_launch_plan(cfg: &ConfigFile, fs: &dyn FileSystem) {
    println!("tpt-exec check");
    println!("  registry = {}:{}", cfg.tool.host, cfg.tool.port);
    println!("  binding_name = {}", cfg.tool.binding_name);
    println!(
        "  startup_timeout = {}s, readiness_timeout = {}s",
        cfg.tool.startup_timeout.as_secs(),
        cfg.tool.readiness_timeout.as_secs()
    );
    println!();

    println!("executables ({}):", cfg.tool.executables.len());
    for exe in &cfg.tool.executables {
        let mark = if fs.is_file(exe) { "found" } else { "missing" };
        println!("  - {} [{mark}]", exe.display());
    }
    match select_executable(fs, &cfg.tool.executables) {
        Ok(exe) => {
            let opts = cfg.acquire_options();
            let command =
                LaunchCommand::new(&exe, opts.port, &opts.binding, &opts.arguments, opts.platform);
            println!("  launch: {command}");
        }
        Err(e) => println!("  launch: not possible ({e})"),
    }
    println!();

    println!("execution:");
    println!("  project: {}", display(&cfg.execution.project));
    println!("  execution_config: {}", cfg.execution.execution_config);
    println!("  test_case: {}", cfg.execution.test_case);
    println!("  data_dir: {}", display(&cfg.execution.data_dir));
    println!("  report_dir: {}", display(&cfg.execution.report_dir));
    println!("  temp_test_set: {}", cfg.execution.temp_test_set);
    if let Some(dir) = &cfg.execution.artifact_dir {
        println!("  artifact_dir: {}", display(dir));
    }
    if cfg.execution.close_project {
        println!("  close_project: true");
    }

    debug!("check complete (nothing started)");
}

fn print_result(parsed: &ParsedResult, verbose: bool) {
    println!("{}: {}", parsed.qualified_name(), parsed.outcome);
    match parsed.exec_date {
        Some(date) => println!("  executed: {date}"),
        None => println!("  executed: unknown"),
    }
    println!("  duration: {}", parsed.exec_duration);
    println!(
        "  log: {} info, {} warning, {} error, {} other",
        parsed.log.entries(LogLevel::Info).count(),
        parsed.log.entries(LogLevel::Warning).count(),
        parsed.log.entries(LogLevel::Error).count(),
        parsed.log.entries(LogLevel::All).count(),
    );
    println!("  assessment variables: {}", parsed.assessment_variables.len());

    if !verbose {
        return;
    }
    for entry in parsed.log.all_entries() {
        println!("  [{:?}] {}", entry.level, entry.text.trim());
    }
    for var in &parsed.assessment_variables {
        println!(
            "  {} ({}) = {} -> {}",
            var.name.as_deref().unwrap_or("?"),
            var.var_type.as_deref().unwrap_or("?"),
            var.value.as_deref().unwrap_or("?"),
            var.result.as_deref().unwrap_or("?"),
        );
        if !var.message.trim().is_empty() {
            println!("      {}", var.message.trim());
        }
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
