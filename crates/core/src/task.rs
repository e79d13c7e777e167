// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task entity: one command invocation with declared inputs/outputs.

use crate::descriptor::PathDescriptor;
use crate::json_util::is_truthy;
use crate::options::{TaskOptions, TaskOptionsPatch};
use crate::status::TaskStatus;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier used by work-queue adapters to deduplicate completions
    /// on `(workflow_id, task.id)` (spec.md §4.3).
    pub struct TaskId("tsk-");
}

/// One `(flag, value, shorten)` triple from the submission schema.
#[derive(Debug, Clone, Deserialize)]
struct ArgTriple(String, String, #[serde(default)] serde_json::Value);

/// Back-end-populated completion info (spec.md §3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taskid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Wire shape of a submitted task (spec.md §6 submission schema).
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub cmd: String,
    #[serde(default)]
    args: Vec<ArgTriple>,
    #[serde(default)]
    inputs: Vec<PathDescriptor>,
    #[serde(default)]
    outputs: Vec<PathDescriptor>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: i64,
    #[serde(default)]
    options: TaskOptionsPatch,
    #[serde(default)]
    overwrite: serde_json::Value,
}

/// A unit of execution (spec.md §3, §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub cmd: String,
    /// Pre-rendered argument string, leading space included (spec.md §4.1).
    pub args: String,
    pub inputs: Vec<PathDescriptor>,
    pub outputs: Vec<PathDescriptor>,
    pub status: TaskStatus,
    pub description: String,
    pub info: TaskInfo,
    pub errors: Vec<String>,
    pub attempts: u32,
    pub priority: i64,
    pub options: TaskOptions,
}

/// Projection returned by [`Task::state`] (spec.md §4.1).
#[derive(Debug, Clone, Serialize)]
pub struct TaskState {
    pub status: TaskStatus,
    pub description: String,
    pub cmd: String,
    pub inputs: Vec<PathDescriptor>,
    pub outputs: Vec<PathDescriptor>,
    #[serde(flatten)]
    pub info: TaskInfo,
}

/// Render a `(flag, value, shorten)` triple following spec.md §4.1's
/// argument-formatting law: `value` is replaced with its basename when
/// `shorten` is truthy *and* `value` is an absolute path, otherwise it is
/// used verbatim.
fn render_arg(flag: &str, value: &str, shorten: &serde_json::Value) -> String {
    let shortened = is_truthy(shorten) && std::path::Path::new(value).is_absolute();
    let rendered_value = if shortened {
        std::path::Path::new(value)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(value)
    } else {
        value
    };
    format!(" {flag} {rendered_value}")
}

fn render_args(args: &[ArgTriple]) -> String {
    let mut out = String::new();
    for ArgTriple(flag, value, shorten) in args {
        out.push_str(&render_arg(flag, value, shorten));
    }
    out
}

impl Task {
    /// Construct a task from its wire spec, sorting inputs/outputs ascending
    /// and honoring `overwrite: truthy` by removing existing output files
    /// (spec.md §4.1 `from_object`).
    pub fn from_spec(spec: TaskSpec) -> Self {
        let mut inputs = spec.inputs;
        let mut outputs = spec.outputs;
        inputs.sort();
        outputs.sort();

        if is_truthy(&spec.overwrite) {
            for out in &outputs {
                let _ = out.clear();
            }
        }

        Self {
            id: TaskId::new(),
            cmd: spec.cmd,
            args: render_args(&spec.args),
            inputs,
            outputs,
            status: TaskStatus::Waiting,
            description: spec.description.unwrap_or_default(),
            info: TaskInfo::default(),
            errors: Vec::new(),
            attempts: 1,
            priority: spec.priority,
            options: TaskOptions::merged(spec.options),
        }
    }

    /// The full command line as dispatched to the back-end.
    pub fn rendered_command(&self) -> String {
        format!("{} {}", self.cmd, self.args)
    }

    /// Ready iff every input descriptor resolves on the local filesystem
    /// (spec.md §3).
    pub fn ready(&self) -> bool {
        self.inputs
            .iter()
            .all(|d| d.resolves(self.options.allow_zero_length))
    }

    /// Completed iff every output descriptor resolves, or — when there are no
    /// declared outputs — the recorded return code is accepted (spec.md §3).
    pub fn completed(&self) -> bool {
        if self.outputs.is_empty() {
            self.info
                .returned
                .map(|code| self.options.accepted_return_codes.contains(&code))
                .unwrap_or(false)
        } else {
            self.outputs
                .iter()
                .all(|d| d.resolves(self.options.allow_zero_length))
        }
    }

    /// Failed iff the retry budget (spec.md §3: "attempts > retries",
    /// equivalently "retries decremented below zero") has been exhausted.
    /// `attempts` starts at 1 for the first try, so the task has
    /// `options.retries` further attempts available before it is failed.
    pub fn retries_exhausted(&self) -> bool {
        self.attempts as i64 > self.options.retries + 1
    }

    /// Delete declared outputs, ignoring "missing file" errors (spec.md §4.1 `clear()`).
    pub fn clear(&self) {
        for out in &self.outputs {
            let _ = out.clear();
        }
    }

    /// Record a new attempt (spec.md §4.1 `restart()`).
    pub fn restart(&mut self) {
        self.attempts += 1;
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Projection of task state for status queries (spec.md §4.1 `state()`).
    pub fn state(&self) -> TaskState {
        TaskState {
            status: self.status,
            description: self.description.clone(),
            cmd: self.rendered_command(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            info: self.info.clone(),
        }
    }
}

impl PartialEq for Task {
    /// Two tasks are equal iff they have identical sorted inputs, sorted
    /// outputs, and command+args strings (spec.md §4.1).
    fn eq(&self, other: &Self) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs && self.cmd == other.cmd && self.args == other.args
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
