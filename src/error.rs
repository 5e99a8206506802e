//! Error types for `wf`.

use std::path::PathBuf;

/// Errors that can occur while tracking workflow records.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up (e.g. "task").
        kind: &'static str,
        /// The identity that was looked up.
        id: String,
    },

    /// A uniqueness constraint would be violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A required argument is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The database file could not be opened or provisioned.
    #[error("Cannot open database at {}: {source}", path.display())]
    StoreUnavailable {
        /// Location of the database file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::Conflict`].
    Conflict,
    /// See [`Error::InvalidInput`].
    InvalidInput,
    /// See [`Error::StoreUnavailable`].
    StoreUnavailable,
    /// Any other database, I/O or serialization failure.
    Internal,
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] error.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    /// Get the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Self::Database(_) | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("task", 7);
        assert_eq!(err.to_string(), "task not found: 7");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(Error::Conflict("dup".into()).kind(), ErrorKind::Conflict);
        assert_eq!(Error::InvalidInput("empty".into()).kind(), ErrorKind::InvalidInput);
        let err = Error::StoreUnavailable {
            path: PathBuf::from("/nope/wf.db"),
            source: Box::new(rusqlite::Error::InvalidQuery),
        };
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.to_string().contains("/nope/wf.db"));
    }
}
