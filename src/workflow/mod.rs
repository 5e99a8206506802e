//! Workflow tracking.
//!
//! This module provides the record store behind `wf`:
//! - Tasks, threads, artifacts and prompts
//! - A shared tag vocabulary attachable to any record
//! - Links from artifacts and prompts to the records they relate to
//!
//! # Example
//!
//! ```no_run
//! use wf::workflow::{EntityRef, SqliteStore, WorkflowStore};
//!
//! let store = SqliteStore::open("/tmp/wf.db").unwrap();
//!
//! let task = store.create_task("Fix login bug", &["urgent".to_string()]).unwrap();
//! let thread = store.create_thread("abc123", "Login discussion", false, &[]).unwrap();
//!
//! let artifact = store.create_artifact("plan.md", "# Plan", &[]).unwrap();
//! store.link(&EntityRef::Artifact(artifact.id), &EntityRef::Thread(thread.id)).unwrap();
//!
//! let urgent = store.list_tasks(Some("urgent")).unwrap();
//! assert_eq!(urgent[0].id, task.id);
//! ```

pub mod models;
pub mod schema;
pub mod store;

pub use models::{
    Artifact, EntityKind, EntityRef, Prompt, StoreStats, TagUsage, Task, Thread,
};
pub use store::{normalize_labels, PromptUpdate, SqliteStore, WorkflowStore};

use crate::error::{Error, Result};
use std::path::Path;

/// Read a file to be captured as an artifact.
///
/// Returns the name to record for the artifact (the path as given) and the
/// file's text.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the file cannot be read as UTF-8 text.
pub fn read_artifact_source(path: &Path) -> Result<(String, String)> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    Ok((path.display().to_string(), content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_artifact_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plan.md");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let (name, content) = read_artifact_source(&path).unwrap();
        assert_eq!(name, path.display().to_string());
        assert_eq!(content, "line one\nline two\n");
    }

    #[test]
    fn test_read_artifact_source_missing() {
        let dir = TempDir::new().unwrap();
        let err = read_artifact_source(&dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_read_artifact_source_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_artifact_source(&path), Err(Error::InvalidInput(_))));
    }
}
