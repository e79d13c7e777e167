// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only per-workflow log files (spec.md §6 "Log files", C12).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use yerba_core::{LogSink, Task, WorkflowStatus};

const BANNER: &str = "#########################";

/// Writes the banner-style entries described in spec.md §6 to a single file.
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, body: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{body}"));
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write workflow log");
        }
    }
}

fn expected_outputs(task: &Task) -> String {
    task.outputs
        .iter()
        .map(|d| d.path().display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl LogSink for FileLogSink {
    fn task_done(&self, _workflow: &str, task: &Task) {
        let info = &task.info;
        let body = format!(
            "{banner}\n{description}\ntask: {cmd}\nSubmitted at: {started}\nCompleted at: {ended}\nExecution time: {elapsed}\nAssigned to task: {taskid}\nReturn status: {returned}\nExpected outputs: {outputs}\nCommand Output:\n{output}\n{banner}",
            banner = BANNER,
            description = task.description,
            cmd = task.rendered_command(),
            started = info.started.as_deref().unwrap_or("-"),
            ended = info.ended.as_deref().unwrap_or("-"),
            elapsed = info
                .elapsed
                .map(|e| format!("{e:.3}s"))
                .unwrap_or_else(|| "-".to_string()),
            taskid = info.taskid.as_deref().unwrap_or("-"),
            returned = info
                .returned
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            outputs = expected_outputs(task),
            output = info.output.as_deref().unwrap_or(""),
        );
        self.append(&body);
    }

    fn task_skipped(&self, _workflow: &str, task: &Task) {
        self.append(&format!(
            "SKIPPED: {} ({}) - outputs already present",
            task.description,
            task.rendered_command()
        ));
    }

    fn task_not_run(&self, _workflow: &str, task: &Task) {
        self.append(&format!(
            "NOT RUN: {} ({}) - workflow did not reach this task",
            task.description,
            task.rendered_command()
        ));
    }

    fn summary(&self, workflow: &str, status: WorkflowStatus) {
        self.append(&format!("=== workflow '{workflow}' finished: {status} ==="));
    }
}

/// Resolve the log sink for a workflow: a [`FileLogSink`] when a `logfile`
/// was given, otherwise a no-op (spec.md §9 "Cyclic coupling between
/// Workflow and its log sink").
pub fn resolve(log: Option<&Path>) -> Box<dyn LogSink> {
    match log {
        Some(path) => Box::new(FileLogSink::new(path.to_path_buf())),
        None => Box::new(yerba_core::NullLogSink),
    }
}

#[cfg(test)]
#[path = "log_sink_tests.rs"]
mod tests;
