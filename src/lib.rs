//! # `wf`
//!
//! A personal workflow tracker. Tasks, discussion threads, captured file
//! artifacts and reusable prompts live in one SQLite database, share a tag
//! vocabulary, and can be linked to each other.
//!
//! The [`workflow`] module holds the store; the `cli` module (behind the
//! `cli` feature) maps command-line verbs onto it.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod workflow;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use workflow::{SqliteStore, WorkflowStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
