// src/execution/copy_back.rs

//! Copying produced artifacts to durable storage.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Moves the contents of the isolated directories somewhere that survives
/// the build step.
pub trait ArtifactCopyBack: Send + Sync {
    fn copy_back(&self, dirs: &[PathBuf]) -> Result<()>;
}

/// Leaves artifacts where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipCopyBack;

impl ArtifactCopyBack for SkipCopyBack {
    fn copy_back(&self, dirs: &[PathBuf]) -> Result<()> {
        debug!(?dirs, "artifact copy-back disabled");
        Ok(())
    }
}

/// Copies every file below each directory to `destination/<dir name>/...`.
///
/// Fails before copying anything if a directory has no final name, or if
/// two directories share one.
#[derive(Debug, Clone)]
pub struct LocalCopyBack {
    fs: Arc<dyn FileSystem>,
    destination: PathBuf,
}

impl LocalCopyBack {
    pub fn new(fs: Arc<dyn FileSystem>, destination: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            destination: destination.into(),
        }
    }

    fn targets(&self, dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let name = dir
                .file_name()
                .ok_or_else(|| anyhow!("cannot copy back {:?}: it has no directory name", dir))?;
            if !seen.insert(name) {
                return Err(anyhow!(
                    "cannot copy back {:?}: another directory is also named {:?}",
                    dir,
                    name
                )
                .into());
            }
            targets.push(self.destination.join(name));
        }
        Ok(targets)
    }

    fn copy_tree(&self, root: &Path, dir: &Path, target: &Path) -> Result<usize> {
        let mut copied = 0;
        for entry in self.fs.read_dir(dir)? {
            let relative = entry
                .strip_prefix(root)
                .with_context(|| format!("{:?} is not below {:?}", entry, root))?;
            if self.fs.is_dir(&entry) {
                copied += self.copy_tree(root, &entry, target)?;
            } else {
                self.fs.copy_file(&entry, &target.join(relative))?;
                copied += 1;
            }
        }
        Ok(copied)
    }
}

impl ArtifactCopyBack for LocalCopyBack {
    fn copy_back(&self, dirs: &[PathBuf]) -> Result<()> {
        let targets = self.targets(dirs)?;
        for (dir, target) in dirs.iter().zip(&targets) {
            if !self.fs.is_dir(dir) {
                debug!(dir = %dir.display(), "nothing to copy back");
                continue;
            }
            let copied = self.copy_tree(dir, dir, target)?;
            info!(
                from = %dir.display(),
                to = %target.display(),
                files = copied,
                "copied artifacts"
            );
        }
        Ok(())
    }
}
