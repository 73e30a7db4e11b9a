//! Task persistence.
//!
//! The whole collection is stored as one JSON array in a single file. Every
//! save replaces the previous snapshot; there is no versioning or partial
//! write. The store is a best-effort cache, not a system of record, so both
//! directions recover to a safe default instead of surfacing errors.

use crate::models::Task;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Store errors. Internal only; the public surface recovers from all of them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type StoreResult<T> = Result<T, StoreError>;

/// File-backed task store.
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted collection.
    ///
    /// A missing file or an unparseable payload yields an empty collection;
    /// parse failures are logged and never raised.
    pub fn load(&self) -> Vec<Task> {
        if !self.path.exists() {
            return Vec::new();
        }

        match self.read_tasks() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load tasks, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the full collection, replacing the previous snapshot.
    ///
    /// Failure is logged and swallowed; it never interrupts the caller.
    pub fn save(&self, tasks: &[Task]) {
        if let Err(e) = self.write_tasks(tasks) {
            warn!(path = %self.path.display(), error = %e, "failed to save tasks");
        }
    }

    fn read_tasks(&self) -> StoreResult<Vec<Task>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_tasks(&self, tasks: &[Task]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(tasks)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
