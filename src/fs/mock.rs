// src/fs/mock.rs

//! In-memory [`FileSystem`] for tests.
//!
//! Paths are stored flat in a sorted map. Directories are explicit nodes and
//! every parent of a stored path is created on insert, so listing a directory
//! is a scan over its direct children.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Result};

use super::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    File(Vec<u8>),
    Dir,
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    failing: BTreeSet<PathBuf>,
}

impl State {
    fn mkdirs(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node::Dir);
        }
    }

    fn put_file(&mut self, path: &Path, content: Vec<u8>) {
        if let Some(parent) = path.parent() {
            self.mkdirs(parent);
        }
        self.nodes.insert(path.to_path_buf(), Node::File(content));
    }

    fn file(&self, path: &Path) -> Result<&[u8]> {
        match self.nodes.get(path) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Dir) => Err(anyhow!("{:?} is a directory", path)),
            None => Err(anyhow!("{:?} not found", path)),
        }
    }

    fn ensure_writable(&self, path: &Path) -> Result<()> {
        if self.failing.contains(path) {
            bail!("injected failure for {:?}", path);
        }
        Ok(())
    }
}

/// Cheap to clone; clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<State>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.state().put_file(path.as_ref(), content.into());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.state().mkdirs(path.as_ref());
    }

    /// Make every mutating operation on `path` fail.
    pub fn fail_on(&self, path: impl AsRef<Path>) {
        self.state().failing.insert(path.as_ref().to_path_buf());
    }

    /// Sorted list of all file paths currently stored.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.state()
            .nodes
            .iter()
            .filter(|(_, node)| matches!(node, Node::File(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state();
        let bytes = state.file(path)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| anyhow!("{:?} is not UTF-8: {e}", path))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let bytes = self.state().file(path)?.to_vec();
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn exists(&self, path: &Path) -> bool {
        self.state().nodes.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.state().nodes.get(path), Some(Node::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.state().nodes.get(path), Some(Node::Dir))
    }

    fn absolutize(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(Path::new("/work").join(path))
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        state.ensure_writable(path)?;
        if let Some(Node::File(_)) = state.nodes.get(path) {
            bail!("{:?} is a file", path);
        }
        state.mkdirs(path);
        Ok(())
    }

    fn clear_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        state.ensure_writable(path)?;
        if state.nodes.get(path) != Some(&Node::Dir) {
            bail!("{:?} is not a directory", path);
        }
        state.nodes.retain(|p, _| p == path || !p.starts_with(path));
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state();
        state.ensure_writable(to)?;
        let content = state.file(from)?.to_vec();
        state.put_file(to, content);
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state();
        if state.nodes.get(path) != Some(&Node::Dir) {
            bail!("{:?} is not a directory", path);
        }
        Ok(state
            .nodes
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}
