//! Database schema.
//!
//! Every statement is `IF NOT EXISTS`, so applying the schema to an existing
//! database is a no-op. Junction rows are removed by the engine through
//! `ON DELETE CASCADE`, which requires `PRAGMA foreign_keys = ON` on the
//! connection.

use crate::workflow::models::EntityKind;

/// Schema statements, applied as one batch.
pub const SCHEMA: &str = r"
    -- Entities
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        note TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS amp_threads (
        thread_id TEXT PRIMARY KEY,
        summary TEXT NOT NULL,
        resolved INTEGER NOT NULL DEFAULT 0 CHECK (resolved IN (0, 1))
    );

    CREATE TABLE IF NOT EXISTS artifacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        content TEXT NOT NULL,
        summary TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS prompts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        content TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    -- Shared tag vocabulary
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT NOT NULL UNIQUE
    );

    -- Tag associations
    CREATE TABLE IF NOT EXISTS task_tags (
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (task_id, tag_id)
    );

    CREATE TABLE IF NOT EXISTS thread_tags (
        thread_id TEXT NOT NULL REFERENCES amp_threads(thread_id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (thread_id, tag_id)
    );

    CREATE TABLE IF NOT EXISTS artifact_tags (
        artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (artifact_id, tag_id)
    );

    CREATE TABLE IF NOT EXISTS prompt_tags (
        prompt_id INTEGER NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (prompt_id, tag_id)
    );

    -- Cross-entity links
    CREATE TABLE IF NOT EXISTS artifact_task_links (
        artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        PRIMARY KEY (artifact_id, task_id)
    );

    CREATE TABLE IF NOT EXISTS artifact_thread_links (
        artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
        thread_id TEXT NOT NULL REFERENCES amp_threads(thread_id) ON DELETE CASCADE,
        PRIMARY KEY (artifact_id, thread_id)
    );

    CREATE TABLE IF NOT EXISTS prompt_task_links (
        prompt_id INTEGER NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        PRIMARY KEY (prompt_id, task_id)
    );

    CREATE TABLE IF NOT EXISTS prompt_thread_links (
        prompt_id INTEGER NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
        thread_id TEXT NOT NULL REFERENCES amp_threads(thread_id) ON DELETE CASCADE,
        PRIMARY KEY (prompt_id, thread_id)
    );

    CREATE TABLE IF NOT EXISTS prompt_artifact_links (
        prompt_id INTEGER NOT NULL REFERENCES prompts(id) ON DELETE CASCADE,
        artifact_id INTEGER NOT NULL REFERENCES artifacts(id) ON DELETE CASCADE,
        PRIMARY KEY (prompt_id, artifact_id)
    );

    -- Lookup indexes
    CREATE INDEX IF NOT EXISTS idx_tasks_id ON tasks(id);
    CREATE INDEX IF NOT EXISTS idx_threads_id ON amp_threads(thread_id);
    CREATE INDEX IF NOT EXISTS idx_artifacts_id ON artifacts(id);
    CREATE INDEX IF NOT EXISTS idx_prompts_id ON prompts(id);
    CREATE INDEX IF NOT EXISTS idx_tags_label ON tags(label);

    -- Reverse lookups for tag-filtered listing
    CREATE INDEX IF NOT EXISTS idx_task_tags_tag_id ON task_tags(tag_id);
    CREATE INDEX IF NOT EXISTS idx_thread_tags_tag_id ON thread_tags(tag_id);
    CREATE INDEX IF NOT EXISTS idx_artifact_tags_tag_id ON artifact_tags(tag_id);
    CREATE INDEX IF NOT EXISTS idx_prompt_tags_tag_id ON prompt_tags(tag_id);
";

/// A supported cross-entity link table.
///
/// `owner` is the side whose record lists the link (artifacts and prompts);
/// `target` is the side being pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTable {
    /// Table name.
    pub name: &'static str,
    /// The owning kind.
    pub owner: EntityKind,
    /// The linked kind.
    pub target: EntityKind,
}

/// All link tables in the schema.
pub const LINK_TABLES: [LinkTable; 5] = [
    LinkTable { name: "artifact_task_links", owner: EntityKind::Artifact, target: EntityKind::Task },
    LinkTable {
        name: "artifact_thread_links",
        owner: EntityKind::Artifact,
        target: EntityKind::Thread,
    },
    LinkTable { name: "prompt_task_links", owner: EntityKind::Prompt, target: EntityKind::Task },
    LinkTable { name: "prompt_thread_links", owner: EntityKind::Prompt, target: EntityKind::Thread },
    LinkTable {
        name: "prompt_artifact_links",
        owner: EntityKind::Prompt,
        target: EntityKind::Artifact,
    },
];

/// Find the link table for a pair of kinds, in either order.
///
/// Returns the table and whether the arguments were swapped relative to
/// `(owner, target)`.
#[must_use]
pub fn link_table(a: EntityKind, b: EntityKind) -> Option<(LinkTable, bool)> {
    LINK_TABLES.iter().find_map(|t| {
        if t.owner == a && t.target == b {
            Some((*t, false))
        } else if t.owner == b && t.target == a {
            Some((*t, true))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0)).unwrap().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute("INSERT INTO tasks (note) VALUES ('keep me')", []).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_all_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        let names = table_names(&conn);

        for kind in [EntityKind::Task, EntityKind::Thread, EntityKind::Artifact, EntityKind::Prompt] {
            assert!(names.contains(&kind.table().to_string()), "missing {}", kind.table());
            assert!(names.contains(&kind.tag_table().to_string()), "missing {}", kind.tag_table());
        }
        for link in LINK_TABLES {
            assert!(names.contains(&link.name.to_string()), "missing {}", link.name);
        }
        assert!(names.contains(&"tags".to_string()));
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn test_link_table_lookup() {
        let (table, swapped) = link_table(EntityKind::Artifact, EntityKind::Thread).unwrap();
        assert_eq!(table.name, "artifact_thread_links");
        assert!(!swapped);

        let (table, swapped) = link_table(EntityKind::Task, EntityKind::Prompt).unwrap();
        assert_eq!(table.name, "prompt_task_links");
        assert!(swapped);

        assert!(link_table(EntityKind::Task, EntityKind::Thread).is_none());
        assert!(link_table(EntityKind::Prompt, EntityKind::Prompt).is_none());
    }
}
