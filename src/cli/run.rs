//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::cli::{render, Cli, Command};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::workflow::{
    read_artifact_source, EntityKind, EntityRef, PromptUpdate, SqliteStore, WorkflowStore,
};
use serde::Serialize;
use std::process::ExitCode;
use tracing::debug;

/// Output from running the CLI.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Text to write to stdout, exactly as given.
    pub stdout: String,
    /// Messages to print to stderr, one per line.
    pub stderr: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

/// Run a parsed command line.
///
/// Opens the store for the duration of the command; it is closed before this
/// returns, whether the command succeeded or not. Opening the store also
/// provisions the schema, which is all `init` needs.
pub fn run(cli: Cli) -> CliOutput {
    let format = if cli.json { Format::Json } else { Format::Text };
    debug!(command = ?cli.command, "dispatching");

    let explicit = match &cli.command {
        Command::Init { db_path: Some(path) } => Some(path.as_path()),
        _ => cli.db.as_deref(),
    };
    let config = Config::resolve(explicit);

    SqliteStore::open(&config.db_path)
        .and_then(|store| execute(&store, &config, cli.command, format))
        .unwrap_or_else(|e| error_output(&e))
}

fn execute(
    store: &dyn WorkflowStore,
    config: &Config,
    command: Command,
    format: Format,
) -> Result<CliOutput> {
    match command {
        // === Tasks ===
        Command::Add { note, tags } => {
            let task = store.create_task(&note, &parse_tags(tags.as_deref()))?;
            render_one(format, &task, render::task_detail)
        }
        Command::Show { task_id } => render_one(format, &store.get_task(task_id)?, render::task_detail),
        Command::ListTasks { tag } => {
            render_one(format, &store.list_tasks(tag.as_deref())?, |t| render::task_list(t))
        }

        // === Threads ===
        Command::AddThread { thread_id, summary, resolved, tags } => {
            let (resolved, tags) = split_resolved_and_tags(resolved.as_deref(), tags.as_deref())?;
            let thread = store.create_thread(&thread_id, &summary, resolved, &tags)?;
            render_one(format, &thread, render::thread_detail)
        }
        Command::ShowThread { thread_id } => {
            render_one(format, &store.get_thread(&thread_id)?, render::thread_detail)
        }
        Command::ListThreads { tag } => {
            render_one(format, &store.list_threads(tag.as_deref())?, |t| render::thread_list(t))
        }
        Command::ResolveThread { thread_id, resolved } => {
            let resolved = resolved.as_deref().map_or(Ok(true), |value| {
                parse_bool(value).ok_or_else(|| {
                    Error::InvalidInput(format!("expected true or false, got '{value}'"))
                })
            })?;
            let thread = store.set_thread_resolved(&thread_id, resolved)?;
            render_one(format, &thread, render::thread_detail)
        }

        // === Artifacts ===
        Command::AddArtifact { file_path, tags } => {
            let (filename, content) = read_artifact_source(&file_path)?;
            let artifact = store.create_artifact(&filename, &content, &parse_tags(tags.as_deref()))?;
            render_one(format, &artifact, render::artifact_detail)
        }
        Command::ShowArtifact { artifact_id } => {
            render_one(format, &store.get_artifact(artifact_id)?, render::artifact_detail)
        }
        Command::LinkArtifact { artifact_id, target_type, target_id } => {
            link(store, EntityRef::Artifact(artifact_id), target_type, &target_id, format)
        }
        Command::SummarizeArtifact { artifact_id, summary } => {
            let summary = store.summarize_artifact(artifact_id, summary.as_deref())?;
            match format {
                Format::Json => {
                    json_output(&serde_json::json!({ "id": artifact_id, "summary": summary }))
                }
                Format::Text => Ok(success_output(summary.unwrap_or_else(|| {
                    format!("(no summary recorded for artifact {artifact_id})")
                }))),
            }
        }
        Command::DumpArtifact { artifact_id } => Ok(raw_output(store.dump_artifact(artifact_id)?)),
        Command::ListArtifacts { tag } => {
            render_one(format, &store.list_artifacts(tag.as_deref())?, |a| render::artifact_list(a))
        }

        // === Prompts ===
        Command::AddPrompt { name, content, description, tags } => {
            let prompt = store.create_prompt(
                &name,
                &content,
                description.as_deref(),
                &parse_tags(tags.as_deref()),
            )?;
            render_one(format, &prompt, render::prompt_detail)
        }
        Command::ShowPrompt { prompt_id } => {
            render_one(format, &store.get_prompt(prompt_id)?, render::prompt_detail)
        }
        Command::ListPrompts { tag } => {
            render_one(format, &store.list_prompts(tag.as_deref())?, |p| render::prompt_list(p))
        }
        Command::UpdatePrompt { prompt_id, name, content, description } => {
            let prompt =
                store.update_prompt(prompt_id, PromptUpdate { name, content, description })?;
            render_one(format, &prompt, render::prompt_detail)
        }
        Command::DeletePrompt { prompt_id } => {
            store.delete_prompt(prompt_id)?;
            Ok(success_output(format!("Prompt deleted: {prompt_id}")))
        }
        Command::DumpPrompt { prompt_id } => Ok(raw_output(store.dump_prompt(prompt_id)?)),
        Command::LinkPrompt { prompt_id, target_type, target_id } => {
            link(store, EntityRef::Prompt(prompt_id), target_type, &target_id, format)
        }

        // === Tags ===
        Command::Tag { entity_type, id, tags } => {
            let entity = EntityRef::parse(entity_type, &id)?;
            let labels = parse_tags(tags.as_deref());
            if labels.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "no tags given; usage: tag {entity_type} {id} tag1,tag2"
                )));
            }
            let all = store.tag(&entity, &labels)?;
            match format {
                Format::Json => json_output(&serde_json::json!({
                    "entity": entity_type,
                    "id": entity.id_string(),
                    "tags": all,
                })),
                Format::Text => Ok(success_output(format!("Tags on {entity}: {}", all.join(", ")))),
            }
        }
        Command::Untag { entity_type, id, tags } => {
            let entity = EntityRef::parse(entity_type, &id)?;
            let removed = store.untag(&entity, &parse_tags(Some(&tags)))?;
            Ok(success_output(format!("Removed {removed} tag(s) from {entity}")))
        }
        Command::ListTags => render_one(format, &store.list_tags()?, |t| render::tag_list(t)),

        // === Utility ===
        Command::ToolOverview => {
            let stats = store.stats()?;
            match format {
                Format::Json => json_output(&serde_json::json!({
                    "version": crate::VERSION,
                    "database": config.db_path,
                    "stats": stats,
                })),
                Format::Text => {
                    Ok(text_output(render::overview(&config.db_path.display().to_string(), &stats)))
                }
            }
        }
        Command::Init { .. } => {
            let path = config.db_path.display().to_string();
            match format {
                Format::Json => json_output(&serde_json::json!({ "initialized": path })),
                Format::Text => Ok(success_output(format!("Database initialized at: {path}"))),
            }
        }
    }
}

fn link(
    store: &dyn WorkflowStore,
    owner: EntityRef,
    target_type: EntityKind,
    target_id: &str,
    format: Format,
) -> Result<CliOutput> {
    let target = EntityRef::parse(target_type, target_id)?;
    let inserted = store.link(&owner, &target)?;
    match format {
        Format::Json => json_output(&serde_json::json!({
            "from": owner.to_string(),
            "to": target.to_string(),
            "created": inserted,
        })),
        Format::Text if inserted => Ok(success_output(format!("Linked {owner} to {target}"))),
        Format::Text => Ok(success_output(format!("{owner} is already linked to {target}"))),
    }
}

/// Split a comma-separated tag list into trimmed, non-empty, unique labels.
#[must_use]
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let labels: Vec<String> =
        raw.map(|s| s.split(',').map(str::to_string).collect()).unwrap_or_default();
    crate::workflow::normalize_labels(&labels)
}

/// Parse a boolean flag argument.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Interpret the optional `[resolved] [tags]` positionals of `add-thread`.
///
/// A lone trailing argument that is not a boolean is the tag list.
fn split_resolved_and_tags(
    resolved: Option<&str>,
    tags: Option<&str>,
) -> Result<(bool, Vec<String>)> {
    match (resolved, tags) {
        (None, _) => Ok((false, parse_tags(tags))),
        (Some(flag), tags) => match (parse_bool(flag), tags) {
            (Some(resolved), tags) => Ok((resolved, parse_tags(tags))),
            (None, None) => Ok((false, parse_tags(Some(flag)))),
            (None, Some(_)) => Err(Error::InvalidInput(format!(
                "resolved must be true or false, got '{flag}'"
            ))),
        },
    }
}

fn render_one<T: Serialize + ?Sized>(
    format: Format,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<CliOutput> {
    match format {
        Format::Json => json_output(value),
        Format::Text => Ok(text_output(text(value))),
    }
}

fn json_output<T: Serialize + ?Sized>(value: &T) -> Result<CliOutput> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(success_output(json))
}

fn text_output(text: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: text, stderr: vec![] }
}

fn success_output(message: String) -> CliOutput {
    text_output(message + "\n")
}

fn raw_output(content: String) -> CliOutput {
    text_output(content)
}

fn error_output(error: &Error) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: String::new(), stderr: vec![format!("Error: {error}")] }
}
