//! Workflow store trait and `SQLite` implementation.

use crate::error::{Error, Result};
use crate::workflow::models::{
    Artifact, EntityKind, EntityRef, Prompt, StoreStats, TagUsage, Task, Thread,
};
use crate::workflow::schema::{self, SCHEMA};
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Trait for workflow storage operations.
///
/// Lookups of a missing entity fail with [`Error::NotFound`]. Every write that
/// touches more than one row commits as a single transaction.
#[allow(clippy::missing_errors_doc)]
pub trait WorkflowStore {
    // Tasks
    /// Create a task with the given note and tags.
    fn create_task(&self, note: &str, tags: &[String]) -> Result<Task>;

    /// Get a task by ID.
    fn get_task(&self, id: i64) -> Result<Task>;

    /// List tasks in ascending ID order, optionally only those carrying `tag`.
    fn list_tasks(&self, tag: Option<&str>) -> Result<Vec<Task>>;

    // Threads
    /// Create a thread under a caller-chosen ID.
    fn create_thread(&self, id: &str, summary: &str, resolved: bool, tags: &[String])
        -> Result<Thread>;

    /// Get a thread by ID. Surrounding whitespace in `id` is ignored, as on create.
    fn get_thread(&self, id: &str) -> Result<Thread>;

    /// List threads in creation order, optionally only those carrying `tag`.
    fn list_threads(&self, tag: Option<&str>) -> Result<Vec<Thread>>;

    /// Mark a thread resolved or unresolved.
    fn set_thread_resolved(&self, id: &str, resolved: bool) -> Result<Thread>;

    // Artifacts
    /// Store a file's content as a new artifact.
    fn create_artifact(&self, filename: &str, content: &str, tags: &[String]) -> Result<Artifact>;

    /// Get an artifact by ID.
    fn get_artifact(&self, id: i64) -> Result<Artifact>;

    /// List artifacts in ascending ID order, optionally only those carrying `tag`.
    fn list_artifacts(&self, tag: Option<&str>) -> Result<Vec<Artifact>>;

    /// Get the stored content of an artifact, unmodified.
    fn dump_artifact(&self, id: i64) -> Result<String>;

    /// Set the summary of an artifact when `summary` is given, otherwise
    /// read the stored one. `None` means no summary has been recorded.
    fn summarize_artifact(&self, id: i64, summary: Option<&str>) -> Result<Option<String>>;

    // Prompts
    /// Create a prompt.
    fn create_prompt(
        &self,
        name: &str,
        content: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> Result<Prompt>;

    /// Get a prompt by ID.
    fn get_prompt(&self, id: i64) -> Result<Prompt>;

    /// List prompts in ascending ID order, optionally only those carrying `tag`.
    fn list_prompts(&self, tag: Option<&str>) -> Result<Vec<Prompt>>;

    /// Update a prompt's fields.
    fn update_prompt(&self, id: i64, update: PromptUpdate) -> Result<Prompt>;

    /// Delete a prompt along with its tag associations and links.
    fn delete_prompt(&self, id: i64) -> Result<()>;

    /// Get the stored content of a prompt, unmodified.
    fn dump_prompt(&self, id: i64) -> Result<String>;

    // Tags and links
    /// Attach tags to an entity. Returns the entity's full tag set.
    fn tag(&self, entity: &EntityRef, labels: &[String]) -> Result<Vec<String>>;

    /// Detach tags from an entity. Returns how many associations were removed.
    fn untag(&self, entity: &EntityRef, labels: &[String]) -> Result<usize>;

    /// Link two entities. Returns `false` if they were already linked.
    fn link(&self, a: &EntityRef, b: &EntityRef) -> Result<bool>;

    /// List every tag with its usage count, in label order.
    fn list_tags(&self) -> Result<Vec<TagUsage>>;

    /// Count rows of each kind.
    fn stats(&self) -> Result<StoreStats>;
}

/// Fields that can be updated on a prompt.
#[derive(Debug, Default, Clone)]
pub struct PromptUpdate {
    /// New name (if Some).
    pub name: Option<String>,
    /// New content (if Some).
    pub content: Option<String>,
    /// New description (if Some). An empty string clears the description.
    pub description: Option<String>,
}

impl PromptUpdate {
    /// Check if any fields are set for update.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.description.is_none()
    }
}

const TASK_COLUMNS: &str = "e.id, e.note";
const THREAD_COLUMNS: &str = "e.thread_id, e.summary, e.resolved";
const ARTIFACT_COLUMNS: &str = "e.id, e.filename, e.content, e.summary, e.created_at";
const PROMPT_COLUMNS: &str =
    "e.id, e.name, e.content, e.description, e.created_at, e.updated_at";

/// SQLite-based workflow store.
///
/// Holds a single connection for the lifetime of the value; dropping the
/// store closes the database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path` and provision the schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the file cannot be opened or the
    /// schema cannot be applied.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let unavailable = |source: Box<dyn std::error::Error + Send + Sync>| {
            Error::StoreUnavailable { path: path.clone(), source }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.into()))?;
        }

        let conn = Connection::open(&path).map_err(|e| unavailable(e.into()))?;
        Self::init_connection(&conn).map_err(|e| unavailable(e.into()))?;
        debug!(path = %path.display(), "opened workflow store");

        Ok(Self { conn, db_path: Some(path) })
    }

    /// Open a private in-memory database with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        let unavailable = |e: rusqlite::Error| Error::StoreUnavailable {
            path: PathBuf::from(":memory:"),
            source: Box::new(e),
        };
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::init_connection(&conn).map_err(unavailable)?;
        Ok(Self { conn, db_path: None })
    }

    /// Get the database path, or `None` for an in-memory store.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_connection(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")?;
        conn.execute_batch(SCHEMA)
    }

    fn parse_task(row: &Row) -> rusqlite::Result<Task> {
        Ok(Task { id: row.get(0)?, note: row.get(1)?, tags: Vec::new() })
    }

    fn parse_thread(row: &Row) -> rusqlite::Result<Thread> {
        Ok(Thread {
            id: row.get(0)?,
            summary: row.get(1)?,
            resolved: row.get(2)?,
            tags: Vec::new(),
        })
    }

    fn parse_artifact(row: &Row) -> rusqlite::Result<Artifact> {
        Ok(Artifact {
            id: row.get(0)?,
            filename: row.get(1)?,
            content: row.get(2)?,
            summary: row.get(3)?,
            created_at: row.get(4)?,
            tags: Vec::new(),
            task_ids: Vec::new(),
            thread_ids: Vec::new(),
        })
    }

    fn parse_prompt(row: &Row) -> rusqlite::Result<Prompt> {
        Ok(Prompt {
            id: row.get(0)?,
            name: row.get(1)?,
            content: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            tags: Vec::new(),
            task_ids: Vec::new(),
            thread_ids: Vec::new(),
            artifact_ids: Vec::new(),
        })
    }

    fn load_task(conn: &Connection, id: i64) -> Result<Task> {
        let mut task = fetch_one(conn, TASK_COLUMNS, &EntityRef::Task(id), Self::parse_task)?;
        task.tags = tags_for(conn, &EntityRef::Task(id))?;
        Ok(task)
    }

    fn load_thread(conn: &Connection, id: &str) -> Result<Thread> {
        let entity = EntityRef::Thread(id.to_string());
        let mut thread = fetch_one(conn, THREAD_COLUMNS, &entity, Self::parse_thread)?;
        thread.tags = tags_for(conn, &entity)?;
        Ok(thread)
    }

    fn load_artifact(conn: &Connection, id: i64) -> Result<Artifact> {
        let artifact =
            fetch_one(conn, ARTIFACT_COLUMNS, &EntityRef::Artifact(id), Self::parse_artifact)?;
        Self::hydrate_artifact(conn, artifact)
    }

    fn load_prompt(conn: &Connection, id: i64) -> Result<Prompt> {
        let prompt = fetch_one(conn, PROMPT_COLUMNS, &EntityRef::Prompt(id), Self::parse_prompt)?;
        Self::hydrate_prompt(conn, prompt)
    }

    fn hydrate_artifact(conn: &Connection, mut artifact: Artifact) -> Result<Artifact> {
        let entity = EntityRef::Artifact(artifact.id);
        artifact.tags = tags_for(conn, &entity)?;
        artifact.task_ids = linked_ids(conn, &entity, EntityKind::Task)?;
        artifact.thread_ids = linked_ids(conn, &entity, EntityKind::Thread)?;
        Ok(artifact)
    }

    fn hydrate_prompt(conn: &Connection, mut prompt: Prompt) -> Result<Prompt> {
        let entity = EntityRef::Prompt(prompt.id);
        prompt.tags = tags_for(conn, &entity)?;
        prompt.task_ids = linked_ids(conn, &entity, EntityKind::Task)?;
        prompt.thread_ids = linked_ids(conn, &entity, EntityKind::Thread)?;
        prompt.artifact_ids = linked_ids(conn, &entity, EntityKind::Artifact)?;
        Ok(prompt)
    }

    fn count(&self, table: &str) -> Result<u64> {
        let n = self.conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n)
    }
}

impl WorkflowStore for SqliteStore {
    fn create_task(&self, note: &str, tags: &[String]) -> Result<Task> {
        require_non_empty("task note", note)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("INSERT INTO tasks (note) VALUES (?1)", params![note])?;
        let id = tx.last_insert_rowid();
        attach_tags(&tx, &EntityRef::Task(id), &normalize_labels(tags))?;
        let task = Self::load_task(&tx, id)?;

        tx.commit()?;
        info!(id, "created task");
        Ok(task)
    }

    fn get_task(&self, id: i64) -> Result<Task> {
        debug!(id, "get task");
        Self::load_task(&self.conn, id)
    }

    fn list_tasks(&self, tag: Option<&str>) -> Result<Vec<Task>> {
        let mut tasks =
            fetch_filtered(&self.conn, EntityKind::Task, TASK_COLUMNS, tag, Self::parse_task)?;
        for task in &mut tasks {
            task.tags = tags_for(&self.conn, &EntityRef::Task(task.id))?;
        }
        Ok(tasks)
    }

    fn create_thread(
        &self,
        id: &str,
        summary: &str,
        resolved: bool,
        tags: &[String],
    ) -> Result<Thread> {
        let id = require_non_empty("thread id", id)?;
        require_non_empty("thread summary", summary)?;
        let entity = EntityRef::Thread(id.to_string());
        let tx = self.conn.unchecked_transaction()?;

        if exists(&tx, &entity)? {
            return Err(Error::Conflict(format!("thread '{id}' already exists")));
        }
        tx.execute(
            "INSERT INTO amp_threads (thread_id, summary, resolved) VALUES (?1, ?2, ?3)",
            params![id, summary, resolved],
        )?;
        attach_tags(&tx, &entity, &normalize_labels(tags))?;
        let thread = Self::load_thread(&tx, id)?;

        tx.commit()?;
        info!(id, "created thread");
        Ok(thread)
    }

    fn get_thread(&self, id: &str) -> Result<Thread> {
        let id = id.trim();
        debug!(id, "get thread");
        Self::load_thread(&self.conn, id)
    }

    fn list_threads(&self, tag: Option<&str>) -> Result<Vec<Thread>> {
        let mut threads =
            fetch_filtered(&self.conn, EntityKind::Thread, THREAD_COLUMNS, tag, Self::parse_thread)?;
        for thread in &mut threads {
            thread.tags = tags_for(&self.conn, &EntityRef::Thread(thread.id.clone()))?;
        }
        Ok(threads)
    }

    fn set_thread_resolved(&self, id: &str, resolved: bool) -> Result<Thread> {
        let id = id.trim();
        let rows = self.conn.execute(
            "UPDATE amp_threads SET resolved = ?1 WHERE thread_id = ?2",
            params![resolved, id],
        )?;
        if rows == 0 {
            return Err(Error::not_found("thread", id));
        }
        info!(id, resolved, "updated thread");
        Self::load_thread(&self.conn, id)
    }

    fn create_artifact(&self, filename: &str, content: &str, tags: &[String]) -> Result<Artifact> {
        require_non_empty("artifact filename", filename)?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO artifacts (filename, content, created_at) VALUES (?1, ?2, ?3)",
            params![filename, content, now()],
        )?;
        let id = tx.last_insert_rowid();
        attach_tags(&tx, &EntityRef::Artifact(id), &normalize_labels(tags))?;
        let artifact = Self::load_artifact(&tx, id)?;

        tx.commit()?;
        info!(id, filename, bytes = content.len(), "created artifact");
        Ok(artifact)
    }

    fn get_artifact(&self, id: i64) -> Result<Artifact> {
        debug!(id, "get artifact");
        Self::load_artifact(&self.conn, id)
    }

    fn list_artifacts(&self, tag: Option<&str>) -> Result<Vec<Artifact>> {
        fetch_filtered(&self.conn, EntityKind::Artifact, ARTIFACT_COLUMNS, tag, Self::parse_artifact)?
            .into_iter()
            .map(|artifact| Self::hydrate_artifact(&self.conn, artifact))
            .collect()
    }

    fn dump_artifact(&self, id: i64) -> Result<String> {
        self.conn
            .query_row("SELECT content FROM artifacts WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?
            .ok_or_else(|| Error::not_found("artifact", id))
    }

    fn summarize_artifact(&self, id: i64, summary: Option<&str>) -> Result<Option<String>> {
        if let Some(text) = summary {
            let text = require_non_empty("artifact summary", text)?;
            let rows = self
                .conn
                .execute("UPDATE artifacts SET summary = ?1 WHERE id = ?2", params![text, id])?;
            if rows == 0 {
                return Err(Error::not_found("artifact", id));
            }
            info!(id, "recorded artifact summary");
            return Ok(Some(text.to_string()));
        }

        self.conn
            .query_row("SELECT summary FROM artifacts WHERE id = ?1", params![id], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?
            .ok_or_else(|| Error::not_found("artifact", id))
    }

    fn create_prompt(
        &self,
        name: &str,
        content: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> Result<Prompt> {
        require_non_empty("prompt name", name)?;
        require_non_empty("prompt content", content)?;
        let description = description.filter(|d| !d.trim().is_empty());
        let tx = self.conn.unchecked_transaction()?;

        let created_at = now();
        tx.execute(
            "INSERT INTO prompts (name, content, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![name, content, description, created_at],
        )?;
        let id = tx.last_insert_rowid();
        attach_tags(&tx, &EntityRef::Prompt(id), &normalize_labels(tags))?;
        let prompt = Self::load_prompt(&tx, id)?;

        tx.commit()?;
        info!(id, name, "created prompt");
        Ok(prompt)
    }

    fn get_prompt(&self, id: i64) -> Result<Prompt> {
        debug!(id, "get prompt");
        Self::load_prompt(&self.conn, id)
    }

    fn list_prompts(&self, tag: Option<&str>) -> Result<Vec<Prompt>> {
        fetch_filtered(&self.conn, EntityKind::Prompt, PROMPT_COLUMNS, tag, Self::parse_prompt)?
            .into_iter()
            .map(|prompt| Self::hydrate_prompt(&self.conn, prompt))
            .collect()
    }

    fn update_prompt(&self, id: i64, update: PromptUpdate) -> Result<Prompt> {
        if update.is_empty() {
            return Err(Error::InvalidInput(
                "nothing to update: give at least one of --name, --content, --description"
                    .to_string(),
            ));
        }
        if let Some(ref name) = update.name {
            require_non_empty("prompt name", name)?;
        }
        if let Some(ref content) = update.content {
            require_non_empty("prompt content", content)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let previous: DateTime<Utc> = tx
            .query_row("SELECT updated_at FROM prompts WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or_else(|| Error::not_found("prompt", id))?;

        // Timestamps must strictly advance even within one clock tick.
        let updated_at = now().max(previous + chrono::Duration::microseconds(1));

        // Build dynamic UPDATE statement
        let mut updates = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(updated_at)];

        if let Some(name) = update.name {
            updates.push("name = ?");
            values.push(Box::new(name));
        }
        if let Some(content) = update.content {
            updates.push("content = ?");
            values.push(Box::new(content));
        }
        if let Some(description) = update.description {
            updates.push("description = ?");
            let description = Some(description).filter(|d| !d.trim().is_empty());
            values.push(Box::new(description));
        }
        values.push(Box::new(id));

        let sql = format!("UPDATE prompts SET {} WHERE id = ?", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(AsRef::as_ref).collect();
        tx.execute(&sql, params.as_slice())?;

        let prompt = Self::load_prompt(&tx, id)?;
        tx.commit()?;
        info!(id, "updated prompt");
        Ok(prompt)
    }

    fn delete_prompt(&self, id: i64) -> Result<()> {
        let rows = self.conn.execute("DELETE FROM prompts WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(Error::not_found("prompt", id));
        }
        info!(id, "deleted prompt");
        Ok(())
    }

    fn dump_prompt(&self, id: i64) -> Result<String> {
        self.conn
            .query_row("SELECT content FROM prompts WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?
            .ok_or_else(|| Error::not_found("prompt", id))
    }

    fn tag(&self, entity: &EntityRef, labels: &[String]) -> Result<Vec<String>> {
        let labels = normalize_labels(labels);
        if labels.is_empty() {
            return Err(Error::InvalidInput("no tags given".to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        if !exists(&tx, entity)? {
            return Err(entity.not_found());
        }
        attach_tags(&tx, entity, &labels)?;
        let tags = tags_for(&tx, entity)?;
        tx.commit()?;

        info!(%entity, ?labels, "tagged");
        Ok(tags)
    }

    fn untag(&self, entity: &EntityRef, labels: &[String]) -> Result<usize> {
        let labels = normalize_labels(labels);
        if labels.is_empty() {
            return Err(Error::InvalidInput("no tags given".to_string()));
        }

        let tx = self.conn.unchecked_transaction()?;
        if !exists(&tx, entity)? {
            return Err(entity.not_found());
        }
        let kind = entity.kind();
        let sql = format!(
            "DELETE FROM {table} WHERE {fk} = ?1
             AND tag_id = (SELECT id FROM tags WHERE label = ?2)",
            table = kind.tag_table(),
            fk = kind.fk_column(),
        );
        let mut removed = 0;
        for label in &labels {
            removed += tx.execute(&sql, params![entity, label])?;
        }
        tx.commit()?;

        info!(%entity, removed, "untagged");
        Ok(removed)
    }

    fn link(&self, a: &EntityRef, b: &EntityRef) -> Result<bool> {
        let (table, swapped) = schema::link_table(a.kind(), b.kind()).ok_or_else(|| {
            Error::InvalidInput(format!("cannot link a {} to a {}", a.kind(), b.kind()))
        })?;
        let (owner, target) = if swapped { (b, a) } else { (a, b) };

        let tx = self.conn.unchecked_transaction()?;
        for entity in [owner, target] {
            if !exists(&tx, entity)? {
                return Err(entity.not_found());
            }
        }
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?1, ?2)",
            table.name,
            table.owner.fk_column(),
            table.target.fk_column(),
        );
        let inserted = tx.execute(&sql, params![owner, target])? > 0;
        tx.commit()?;

        info!(%owner, %target, inserted, "linked");
        Ok(inserted)
    }

    fn list_tags(&self) -> Result<Vec<TagUsage>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.label,
                (SELECT COUNT(*) FROM task_tags WHERE tag_id = t.id)
              + (SELECT COUNT(*) FROM thread_tags WHERE tag_id = t.id)
              + (SELECT COUNT(*) FROM artifact_tags WHERE tag_id = t.id)
              + (SELECT COUNT(*) FROM prompt_tags WHERE tag_id = t.id)
             FROM tags t
             ORDER BY t.label",
        )?;
        let tags = stmt
            .query_map([], |row| Ok(TagUsage { id: row.get(0)?, label: row.get(1)?, count: row.get(2)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            tasks: self.count("tasks")?,
            threads: self.count(EntityKind::Thread.table())?,
            artifacts: self.count("artifacts")?,
            prompts: self.count("prompts")?,
            tags: self.count("tags")?,
        })
    }
}

/// Current time at the precision timestamps are stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Reject values that are empty after trimming. Returns the trimmed value.
fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

/// Trim labels, drop empty ones and remove duplicates, keeping first occurrence.
#[must_use]
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

fn exists(conn: &Connection, entity: &EntityRef) -> Result<bool> {
    let kind = entity.kind();
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
        kind.table(),
        kind.id_column()
    );
    Ok(conn.query_row(&sql, params![entity], |row| row.get(0))?)
}

/// Get the ID of the tag with `label`, creating it if needed.
fn resolve_tag(conn: &Connection, label: &str) -> Result<i64> {
    conn.execute("INSERT OR IGNORE INTO tags (label) VALUES (?1)", params![label])?;
    Ok(conn.query_row("SELECT id FROM tags WHERE label = ?1", params![label], |row| row.get(0))?)
}

fn attach_tags(conn: &Connection, entity: &EntityRef, labels: &[String]) -> Result<()> {
    let kind = entity.kind();
    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}, tag_id) VALUES (?1, ?2)",
        kind.tag_table(),
        kind.fk_column()
    );
    for label in labels {
        let tag_id = resolve_tag(conn, label)?;
        conn.execute(&sql, params![entity, tag_id])?;
    }
    Ok(())
}

fn tags_for(conn: &Connection, entity: &EntityRef) -> Result<Vec<String>> {
    let kind = entity.kind();
    let sql = format!(
        "SELECT t.label FROM tags t
         JOIN {table} j ON j.tag_id = t.id
         WHERE j.{fk} = ?1
         ORDER BY t.label",
        table = kind.tag_table(),
        fk = kind.fk_column(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let labels = stmt.query_map(params![entity], |row| row.get(0))?.collect::<rusqlite::Result<_>>()?;
    Ok(labels)
}

/// IDs of `target` entities linked from `owner`, ascending.
fn linked_ids<T: FromSql>(conn: &Connection, owner: &EntityRef, target: EntityKind) -> Result<Vec<T>> {
    let Some((table, false)) = schema::link_table(owner.kind(), target) else {
        return Ok(Vec::new());
    };
    let sql = format!(
        "SELECT {target} FROM {name} WHERE {owner} = ?1 ORDER BY {target}",
        target = table.target.fk_column(),
        name = table.name,
        owner = table.owner.fk_column(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt.query_map(params![owner], |row| row.get(0))?.collect::<rusqlite::Result<_>>()?;
    Ok(ids)
}

fn fetch_one<T>(
    conn: &Connection,
    columns: &str,
    entity: &EntityRef,
    parse: fn(&Row) -> rusqlite::Result<T>,
) -> Result<T> {
    let kind = entity.kind();
    let sql = format!("SELECT {columns} FROM {} e WHERE e.{} = ?1", kind.table(), kind.id_column());
    conn.query_row(&sql, params![entity], parse).optional()?.ok_or_else(|| entity.not_found())
}

/// Rows of `kind`, optionally restricted to those tagged `tag`.
///
/// Threads come back in insertion order, everything else by ascending ID.
fn fetch_filtered<T>(
    conn: &Connection,
    kind: EntityKind,
    columns: &str,
    tag: Option<&str>,
    parse: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let table = kind.table();
    let order = if kind == EntityKind::Thread { "e.rowid" } else { "e.id" };

    let rows = if let Some(label) = tag {
        let sql = format!(
            "SELECT {columns} FROM {table} e
             JOIN {tag_table} j ON j.{fk} = e.{id}
             JOIN tags t ON t.id = j.tag_id
             WHERE t.label = ?1
             ORDER BY {order}",
            tag_table = kind.tag_table(),
            fk = kind.fk_column(),
            id = kind.id_column(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![label.trim()], parse)?.collect::<rusqlite::Result<_>>()?;
        rows
    } else {
        let sql = format!("SELECT {columns} FROM {table} e ORDER BY {order}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], parse)?.collect::<rusqlite::Result<_>>()?;
        rows
    };

    debug!(%kind, ?tag, "listed");
    Ok(rows)
}
