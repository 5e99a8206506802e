//! Command-line interface for `wf`.
//!
//! Each verb maps to exactly one store operation. Argument parsing is done by
//! clap; [`run`] opens the store, dispatches, and renders the result.

mod render;
mod run;


pub use run::{parse_bool, parse_tags, run, CliOutput};

use crate::workflow::EntityKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Usage examples shown after `wf --help`.
pub const EXAMPLES: &str = r#"Examples:
  wf add "Fix login bug" urgent,frontend
  wf show 1
  wf list-tasks urgent
  wf add-thread "abc123" "Login discussion" false bug,discussion
  wf show-thread "abc123"
  wf resolve-thread "abc123"
  wf list-threads bug
  wf add-artifact plan.md documentation,planning
  wf link-artifact 1 thread "abc123"
  wf summarize-artifact 1 "Rollout plan for the login fix"
  wf dump-artifact 1
  wf list-artifacts documentation
  wf add-prompt "Code Review" "Please review this code for security issues" "Security review prompt" security,review
  wf list-prompts security
  wf update-prompt 1 --content "Please review this code for security and performance"
  wf link-prompt 1 task 5
  wf dump-prompt 1
  wf delete-prompt 1
  wf tag thread "abc123" resolved
  wf untag task 1 urgent
  wf list-tags
  wf tool-overview
  wf init ~/my-wf.db"#;

/// wf - track tasks, threads, artifacts and prompts.
///
/// Tag lists are comma-separated, e.g. `urgent,frontend`.
///
/// The database lives at `--db`, else `$WF_DB_PATH`, else `~/wf.db`.
#[derive(Parser, Debug)]
#[command(name = "wf")]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Database file to use
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log more (-v for info, -vv for debug); `WF_LOG` overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // === Tasks ===
    /// Add a task.
    Add {
        /// What needs doing
        note: String,
        /// Comma-separated tags
        tags: Option<String>,
    },

    /// Show a task.
    Show {
        /// Task ID
        task_id: i64,
    },

    /// List tasks, optionally only those with a tag.
    ListTasks {
        /// Tag to filter by
        tag: Option<String>,
    },

    // === Threads ===
    /// Add a discussion thread under an existing thread ID.
    ///
    /// The third argument is the resolved flag if it reads as a boolean
    /// (true/false/yes/no/1/0); otherwise it is taken as the tag list.
    AddThread {
        /// Thread ID
        thread_id: String,
        /// Short summary of the discussion
        summary: String,
        /// Whether the thread is already resolved
        resolved: Option<String>,
        /// Comma-separated tags
        tags: Option<String>,
    },

    /// Show a thread.
    ShowThread {
        /// Thread ID
        thread_id: String,
    },

    /// List threads, optionally only those with a tag.
    ListThreads {
        /// Tag to filter by
        tag: Option<String>,
    },

    /// Mark a thread resolved (or, with `false`, unresolved).
    ResolveThread {
        /// Thread ID
        thread_id: String,
        /// New resolved state (default: true)
        resolved: Option<String>,
    },

    // === Artifacts ===
    /// Capture a file's content as an artifact.
    AddArtifact {
        /// File to read
        file_path: PathBuf,
        /// Comma-separated tags
        tags: Option<String>,
    },

    /// Show an artifact's details.
    ShowArtifact {
        /// Artifact ID
        artifact_id: i64,
    },

    /// Link an artifact to a thread or task.
    LinkArtifact {
        /// Artifact ID
        artifact_id: i64,
        /// Kind of record to link to
        #[arg(value_enum)]
        target_type: EntityKind,
        /// ID of the record to link to
        target_id: String,
    },

    /// Record or show an artifact's summary.
    SummarizeArtifact {
        /// Artifact ID
        artifact_id: i64,
        /// Summary text to record
        summary: Option<String>,
    },

    /// Print an artifact's stored content verbatim.
    DumpArtifact {
        /// Artifact ID
        artifact_id: i64,
    },

    /// List artifacts, optionally only those with a tag.
    ListArtifacts {
        /// Tag to filter by
        tag: Option<String>,
    },

    // === Prompts ===
    /// Add a reusable prompt.
    AddPrompt {
        /// Prompt name
        name: String,
        /// Prompt text
        content: String,
        /// Longer description
        description: Option<String>,
        /// Comma-separated tags
        tags: Option<String>,
    },

    /// Show a prompt.
    ShowPrompt {
        /// Prompt ID
        prompt_id: i64,
    },

    /// List prompts, optionally only those with a tag.
    ListPrompts {
        /// Tag to filter by
        tag: Option<String>,
    },

    /// Update a prompt's fields.
    ///
    /// Only specified fields are updated; others remain unchanged. An empty
    /// `--description` clears the description.
    UpdatePrompt {
        /// Prompt ID
        prompt_id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New content
        #[arg(long)]
        content: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a prompt.
    DeletePrompt {
        /// Prompt ID
        prompt_id: i64,
    },

    /// Print a prompt's content verbatim.
    DumpPrompt {
        /// Prompt ID
        prompt_id: i64,
    },

    /// Link a prompt to a task, thread or artifact.
    LinkPrompt {
        /// Prompt ID
        prompt_id: i64,
        /// Kind of record to link to
        #[arg(value_enum)]
        target_type: EntityKind,
        /// ID of the record to link to
        target_id: String,
    },

    // === Tags ===
    /// Attach tags to any record.
    Tag {
        /// Kind of record
        #[arg(value_enum)]
        entity_type: EntityKind,
        /// Record ID
        id: String,
        /// Comma-separated tags
        tags: Option<String>,
    },

    /// Detach tags from a record. The tags themselves are kept.
    Untag {
        /// Kind of record
        #[arg(value_enum)]
        entity_type: EntityKind,
        /// Record ID
        id: String,
        /// Comma-separated tags
        tags: String,
    },

    /// List all tags with usage counts.
    ListTags,

    // === Utility ===
    /// Show version and database information.
    ToolOverview,

    /// Create the database and schema.
    Init {
        /// Where to create the database (default: `$WF_DB_PATH` or `~/wf.db`)
        db_path: Option<PathBuf>,
    },
}
