//! Integration tests for `wf`.

use std::process::ExitCode;
use tempfile::TempDir;
use wf::workflow::{EntityKind, EntityRef, PromptUpdate, SqliteStore, WorkflowStore};
use wf::{ErrorKind, VERSION};

#[test]
fn test_version_exists() {
    assert!(!VERSION.is_empty());
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("nested").join("wf.db");

    {
        let store = SqliteStore::open(&db).unwrap();
        let task = store.create_task("Fix login bug", &["urgent".to_string()]).unwrap();
        store.create_thread("abc123", "Login discussion", false, &[]).unwrap();
        let artifact = store.create_artifact("plan.md", "# Plan", &[]).unwrap();
        store.link(&EntityRef::Artifact(artifact.id), &EntityRef::Task(task.id)).unwrap();
        store
            .link(&EntityRef::Artifact(artifact.id), &EntityRef::Thread("abc123".to_string()))
            .unwrap();
    }

    let store = SqliteStore::open(&db).unwrap();
    let artifact = store.get_artifact(1).unwrap();
    assert_eq!(artifact.task_ids, vec![1]);
    assert_eq!(artifact.thread_ids, vec!["abc123".to_string()]);
    assert_eq!(store.list_tasks(Some("urgent")).unwrap().len(), 1);
    assert_eq!(store.stats().unwrap().tags, 1);
}

#[test]
fn test_prompt_delete_removes_links_and_tags() {
    let store = SqliteStore::open_in_memory().unwrap();
    let task = store.create_task("Task", &[]).unwrap();
    let prompt = store.create_prompt("Review", "Check it", None, &["sec".to_string()]).unwrap();
    let prompt_ref = EntityRef::Prompt(prompt.id);
    store.link(&prompt_ref, &EntityRef::Task(task.id)).unwrap();

    store.delete_prompt(prompt.id).unwrap();

    assert_eq!(store.get_prompt(prompt.id).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.get_task(task.id).unwrap(), task);
    let tags = store.list_tags().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].count, 0);
}

#[test]
fn test_update_prompt_keeps_unspecified_fields() {
    let store = SqliteStore::open_in_memory().unwrap();
    let prompt = store.create_prompt("Review", "Old", Some("Desc"), &[]).unwrap();

    let updated = store
        .update_prompt(
            prompt.id,
            PromptUpdate { content: Some("New".to_string()), ..PromptUpdate::default() },
        )
        .unwrap();

    assert_eq!(updated.name, "Review");
    assert_eq!(updated.content, "New");
    assert_eq!(updated.description.as_deref(), Some("Desc"));
    assert_eq!(updated.created_at, prompt.created_at);
    assert!(updated.updated_at > prompt.updated_at);
}

#[test]
fn test_entity_ref_parsing_feeds_store() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.create_thread("t-1", "Summary", false, &[]).unwrap();

    let entity = EntityRef::parse(EntityKind::Thread, "t-1").unwrap();
    let tags = store.tag(&entity, &["b".to_string(), "a".to_string()]).unwrap();
    assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);

    let bad = EntityRef::parse(EntityKind::Task, "abc").unwrap_err();
    assert_eq!(bad.kind(), ErrorKind::InvalidInput);
}

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use clap::Parser;
    use wf::cli::{run, Cli};

    fn wf(db: &std::path::Path, args: &[&str]) -> wf::cli::CliOutput {
        let mut argv = vec!["wf", "--db", db.to_str().unwrap()];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_cli_and_library_share_a_database() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("wf.db");

        let added = wf(&db, &["add", "Fix login bug", "urgent,frontend"]);
        assert_eq!(added.exit_code, ExitCode::SUCCESS);

        let store = SqliteStore::open(&db).unwrap();
        let task = store.get_task(1).unwrap();
        assert_eq!(task.note, "Fix login bug");
        assert_eq!(task.tags, vec!["frontend".to_string(), "urgent".to_string()]);
        drop(store);

        let listed = wf(&db, &["list-tasks", "urgent"]);
        assert!(listed.stdout.contains("Fix login bug"));
    }

    #[test]
    fn test_dump_prompt_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("wf.db");
        let content = "Line one\n  indented\n\ttabbed";

        wf(&db, &["add-prompt", "P", content]);
        let dumped = wf(&db, &["dump-prompt", "1"]);
        assert_eq!(dumped.stdout, content);
    }

    #[test]
    fn test_missing_records_exit_nonzero() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("wf.db");

        for args in [
            &["show", "7"][..],
            &["show-thread", "nope"][..],
            &["dump-artifact", "3"][..],
            &["delete-prompt", "9"][..],
        ] {
            let output = wf(&db, args);
            assert_eq!(output.exit_code, ExitCode::from(1), "{args:?}");
            assert!(output.stderr[0].contains("not found"), "{args:?}");
        }
    }
}
