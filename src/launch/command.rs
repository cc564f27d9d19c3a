// src/launch/command.rs

//! Executable selection and command-line assembly for starting TPT.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::errors::{Result, TptError};
use crate::fs::FileSystem;

/// Platform family, which decides whether TPT is started as a headless API
/// server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

/// Fully assembled TPT command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// `<exe> --apiPort <port> --apiBindingName <name> [--run apiserver --headless] <extra...>`
    pub fn new(
        executable: &Path,
        port: u16,
        binding: &str,
        extra_args: &[String],
        platform: Platform,
    ) -> Self {
        let mut args = vec![
            "--apiPort".to_string(),
            port.to_string(),
            "--apiBindingName".to_string(),
            binding.to_string(),
        ];
        if platform == Platform::Linux {
            args.extend(["--run", "apiserver", "--headless"].map(String::from));
        }
        args.extend(extra_args.iter().cloned());

        Self {
            program: executable.to_path_buf(),
            args,
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// First candidate that exists as a file, in the given order.
pub fn select_executable(fs: &dyn FileSystem, candidates: &[PathBuf]) -> Result<PathBuf> {
    for candidate in candidates {
        info!(path = %candidate.display(), "trying TPT executable");
        if fs.is_file(candidate) {
            debug!(path = %candidate.display(), "selected TPT executable");
            return Ok(candidate.clone());
        }
    }
    error!(tried = candidates.len(), "TPT executable not found");
    Err(TptError::ExecutableNotFound(candidates.to_vec()))
}
