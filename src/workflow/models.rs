//! Record types for the workflow tracker.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Serialize};

/// The four kinds of tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A [`Task`].
    Task,
    /// A [`Thread`].
    Thread,
    /// An [`Artifact`].
    Artifact,
    /// A [`Prompt`].
    Prompt,
}

impl EntityKind {
    /// Parse an entity kind from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the string names no entity kind.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "thread" => Ok(Self::Thread),
            "artifact" => Ok(Self::Artifact),
            "prompt" => Ok(Self::Prompt),
            _ => Err(Error::InvalidInput(format!(
                "unknown entity type '{s}' (must be one of: task, thread, artifact, prompt)"
            ))),
        }
    }

    /// Get the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Thread => "thread",
            Self::Artifact => "artifact",
            Self::Prompt => "prompt",
        }
    }

    /// Table holding rows of this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Thread => "amp_threads",
            Self::Artifact => "artifacts",
            Self::Prompt => "prompts",
        }
    }

    /// Primary key column of this kind's table.
    #[must_use]
    pub const fn id_column(self) -> &'static str {
        match self {
            Self::Thread => "thread_id",
            Self::Task | Self::Artifact | Self::Prompt => "id",
        }
    }

    /// Column name used when a junction table references this kind.
    #[must_use]
    pub const fn fk_column(self) -> &'static str {
        match self {
            Self::Task => "task_id",
            Self::Thread => "thread_id",
            Self::Artifact => "artifact_id",
            Self::Prompt => "prompt_id",
        }
    }

    /// Junction table associating this kind with tags.
    #[must_use]
    pub const fn tag_table(self) -> &'static str {
        match self {
            Self::Task => "task_tags",
            Self::Thread => "thread_tags",
            Self::Artifact => "artifact_tags",
            Self::Prompt => "prompt_tags",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to one entity by kind and identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// A task by numeric id.
    Task(i64),
    /// A thread by its caller-chosen id.
    Thread(String),
    /// An artifact by numeric id.
    Artifact(i64),
    /// A prompt by numeric id.
    Prompt(i64),
}

impl EntityRef {
    /// Build a reference from a kind and a textual identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the identity is empty, or is not an
    /// integer for a numerically identified kind.
    pub fn parse(kind: EntityKind, id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput(format!("{kind} id must not be empty")));
        }
        let numeric = || {
            id.parse::<i64>()
                .map_err(|_| Error::InvalidInput(format!("{kind} id must be an integer, got '{id}'")))
        };
        Ok(match kind {
            EntityKind::Task => Self::Task(numeric()?),
            EntityKind::Thread => Self::Thread(id.to_string()),
            EntityKind::Artifact => Self::Artifact(numeric()?),
            EntityKind::Prompt => Self::Prompt(numeric()?),
        })
    }

    /// The kind of entity referenced.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Task(_) => EntityKind::Task,
            Self::Thread(_) => EntityKind::Thread,
            Self::Artifact(_) => EntityKind::Artifact,
            Self::Prompt(_) => EntityKind::Prompt,
        }
    }

    /// The identity rendered as text.
    #[must_use]
    pub fn id_string(&self) -> String {
        match self {
            Self::Task(id) | Self::Artifact(id) | Self::Prompt(id) => id.to_string(),
            Self::Thread(id) => id.clone(),
        }
    }

    /// A [`Error::NotFound`] for this reference.
    #[must_use]
    pub fn not_found(&self) -> Error {
        Error::not_found(self.kind().as_str(), self.id_string())
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind(), self.id_string())
    }
}

impl ToSql for EntityRef {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Task(id) | Self::Artifact(id) | Self::Prompt(id) => Ok(ToSqlOutput::from(*id)),
            Self::Thread(id) => Ok(ToSqlOutput::from(id.as_str())),
        }
    }
}

/// A unit of work with a free-text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Auto-assigned identifier.
    pub id: i64,
    /// What needs doing.
    pub note: String,
    /// Attached tag labels, in label order.
    pub tags: Vec<String>,
}

/// A discussion thread identified by an external id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Caller-chosen identifier.
    pub id: String,
    /// Short summary of the discussion.
    pub summary: String,
    /// Whether the discussion is resolved.
    pub resolved: bool,
    /// Attached tag labels, in label order.
    pub tags: Vec<String>,
}

/// A file captured into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Auto-assigned identifier.
    pub id: i64,
    /// The path the content was read from.
    pub filename: String,
    /// Full file content at capture time.
    pub content: String,
    /// Externally supplied summary, if any.
    pub summary: Option<String>,
    /// When the artifact was captured.
    pub created_at: DateTime<Utc>,
    /// Attached tag labels, in label order.
    pub tags: Vec<String>,
    /// Linked task ids, ascending.
    pub task_ids: Vec<i64>,
    /// Linked thread ids, ascending.
    pub thread_ids: Vec<String>,
}

/// A reusable prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Auto-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Prompt text.
    pub content: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// When the prompt was created.
    pub created_at: DateTime<Utc>,
    /// When the prompt was last changed. Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Attached tag labels, in label order.
    pub tags: Vec<String>,
    /// Linked task ids, ascending.
    pub task_ids: Vec<i64>,
    /// Linked thread ids, ascending.
    pub thread_ids: Vec<String>,
    /// Linked artifact ids, ascending.
    pub artifact_ids: Vec<i64>,
}

/// A tag label together with how many entities carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUsage {
    /// Tag identifier.
    pub id: i64,
    /// The unique label.
    pub label: String,
    /// Number of entity associations across all kinds.
    pub count: u64,
}

/// Row counts for the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of tasks.
    pub tasks: u64,
    /// Number of threads.
    pub threads: u64,
    /// Number of artifacts.
    pub artifacts: u64,
    /// Number of prompts.
    pub prompts: u64,
    /// Number of distinct tags.
    pub tags: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!(EntityKind::from_str("task").unwrap(), EntityKind::Task);
        assert_eq!(EntityKind::from_str("THREAD").unwrap(), EntityKind::Thread);
        assert_eq!(EntityKind::from_str("Artifact").unwrap(), EntityKind::Artifact);
        assert_eq!(EntityKind::from_str("prompt").unwrap(), EntityKind::Prompt);
        let err = EntityKind::from_str("note").unwrap_err();
        assert!(err.to_string().contains("unknown entity type 'note'"));
    }

    #[test]
    fn test_entity_ref_parse() {
        assert_eq!(EntityRef::parse(EntityKind::Task, " 12 ").unwrap(), EntityRef::Task(12));
        assert_eq!(
            EntityRef::parse(EntityKind::Thread, "abc123").unwrap(),
            EntityRef::Thread("abc123".to_string())
        );
        assert!(EntityRef::parse(EntityKind::Prompt, "one").is_err());
        assert!(EntityRef::parse(EntityKind::Thread, "  ").is_err());
    }

    #[test]
    fn test_entity_ref_display_and_not_found() {
        let r = EntityRef::Thread("abc".to_string());
        assert_eq!(r.to_string(), "thread abc");
        assert_eq!(r.not_found().to_string(), "thread not found: abc");
        assert_eq!(EntityRef::Artifact(3).to_string(), "artifact 3");
    }

    #[test]
    fn test_kind_metadata() {
        assert_eq!(EntityKind::Thread.table(), "amp_threads");
        assert_eq!(EntityKind::Thread.id_column(), "thread_id");
        assert_eq!(EntityKind::Artifact.id_column(), "id");
        assert_eq!(EntityKind::Prompt.fk_column(), "prompt_id");
        assert_eq!(EntityKind::Artifact.tag_table(), "artifact_tags");
    }
}
