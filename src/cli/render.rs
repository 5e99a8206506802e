//! Plain-text rendering of records.

use crate::workflow::{Artifact, Prompt, StoreStats, TagUsage, Task, Thread};
use chrono::{DateTime, Utc};
use std::fmt::Write;

fn tag_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

fn list_or_none<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn lines<T>(items: &[T], empty: &str, line: fn(&T) -> String) -> String {
    if items.is_empty() {
        return format!("{empty}\n");
    }
    items.iter().map(|item| line(item) + "\n").collect()
}

pub fn task_line(task: &Task) -> String {
    format!("#{} {}{}", task.id, task.note, tag_suffix(&task.tags))
}

pub fn task_detail(task: &Task) -> String {
    format!("Task #{}\nNote: {}\nTags: {}\n", task.id, task.note, list_or_none(&task.tags))
}

pub fn task_list(tasks: &[Task]) -> String {
    lines(tasks, "No tasks found.", task_line)
}

pub fn thread_line(thread: &Thread) -> String {
    let state = if thread.resolved { "resolved" } else { "open" };
    format!("{} ({state}) {}{}", thread.id, thread.summary, tag_suffix(&thread.tags))
}

pub fn thread_detail(thread: &Thread) -> String {
    format!(
        "Thread {}\nSummary: {}\nResolved: {}\nTags: {}\n",
        thread.id,
        thread.summary,
        thread.resolved,
        list_or_none(&thread.tags)
    )
}

pub fn thread_list(threads: &[Thread]) -> String {
    lines(threads, "No threads found.", thread_line)
}

pub fn artifact_line(artifact: &Artifact) -> String {
    format!(
        "#{} {} ({}){}",
        artifact.id,
        artifact.filename,
        timestamp(&artifact.created_at),
        tag_suffix(&artifact.tags)
    )
}

pub fn artifact_detail(artifact: &Artifact) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Artifact #{}", artifact.id);
    let _ = writeln!(out, "Filename: {}", artifact.filename);
    let _ = writeln!(out, "Created: {}", timestamp(&artifact.created_at));
    let _ = writeln!(out, "Size: {} bytes", artifact.content.len());
    let _ = writeln!(out, "Summary: {}", artifact.summary.as_deref().unwrap_or("(none)"));
    let _ = writeln!(out, "Tags: {}", list_or_none(&artifact.tags));
    let _ = writeln!(out, "Linked tasks: {}", list_or_none(&artifact.task_ids));
    let _ = writeln!(out, "Linked threads: {}", list_or_none(&artifact.thread_ids));
    out
}

pub fn artifact_list(artifacts: &[Artifact]) -> String {
    lines(artifacts, "No artifacts found.", artifact_line)
}

pub fn prompt_line(prompt: &Prompt) -> String {
    let description =
        prompt.description.as_deref().map(|d| format!(" - {d}")).unwrap_or_default();
    format!("#{} {}{description}{}", prompt.id, prompt.name, tag_suffix(&prompt.tags))
}

pub fn prompt_detail(prompt: &Prompt) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Prompt #{}", prompt.id);
    let _ = writeln!(out, "Name: {}", prompt.name);
    let _ = writeln!(out, "Description: {}", prompt.description.as_deref().unwrap_or("(none)"));
    let _ = writeln!(out, "Created: {}", timestamp(&prompt.created_at));
    let _ = writeln!(out, "Updated: {}", timestamp(&prompt.updated_at));
    let _ = writeln!(out, "Tags: {}", list_or_none(&prompt.tags));
    let _ = writeln!(out, "Linked tasks: {}", list_or_none(&prompt.task_ids));
    let _ = writeln!(out, "Linked threads: {}", list_or_none(&prompt.thread_ids));
    let _ = writeln!(out, "Linked artifacts: {}", list_or_none(&prompt.artifact_ids));
    let _ = writeln!(out, "Content:\n{}", prompt.content);
    out
}

pub fn prompt_list(prompts: &[Prompt]) -> String {
    lines(prompts, "No prompts found.", prompt_line)
}

pub fn tag_list(tags: &[TagUsage]) -> String {
    lines(tags, "No tags found.", |t: &TagUsage| format!("{} ({})", t.label, t.count))
}

pub fn overview(db_path: &str, stats: &StoreStats) -> String {
    format!(
        "wf workflow tracker v{}\nDatabase: {db_path}\nTasks: {}\nThreads: {}\nArtifacts: {}\nPrompts: {}\nTags: {}\n",
        crate::VERSION,
        stats.tasks,
        stats.threads,
        stats.artifacts,
        stats.prompts,
        stats.tags
    )
}
