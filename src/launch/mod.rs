// src/launch/mod.rs

//! Getting hold of a live TPT instance.
//!
//! - [`acquire`] implements attach-or-launch: look the tool up, start it if
//!   it is not registered, wait for it to register.
//! - [`readiness`] is the readiness gate every handle passes before use.
//! - [`drain`] keeps the spawned process's output pipes flowing.
//! - [`command`] picks the executable and assembles the command line.
//! - [`process`] provides the `ProcessLauncher` seam and the tokio-based
//!   launcher used in production.

pub mod acquire;
pub mod command;
pub mod drain;
pub mod process;
pub mod readiness;

pub use acquire::{default_host, AcquireOptions, ToolConnector};
pub use command::{select_executable, LaunchCommand, Platform};
pub use drain::{DrainGuard, LineSink, OutputDrain, StreamKind, TracingSink};
pub use process::{LaunchedProcess, ProcessLauncher, ProcessOutput, TokioProcessLauncher};
pub use readiness::{wait_until_ready, ReadinessOptions};
