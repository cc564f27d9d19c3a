// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `tpt-exec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tpt-exec",
    version,
    about = "Drive TPT single test-case executions from a CI build step.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TPT_EXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a config file and print the launch plan. Starts nothing.
    Check {
        /// Path to the config file (TOML).
        ///
        /// Default: `$TPT_EXEC_CONFIG`, else `TptExec.toml` in the current
        /// working directory.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Parse a `testcase_information.xml` and print a summary.
    Parse {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Also print log entries and assessment variables.
        #[arg(long)]
        verbose: bool,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
