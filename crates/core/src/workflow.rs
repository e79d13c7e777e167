// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow entity: an ordered set of tasks plus transition rules (spec.md §4.2).

use crate::error::{ValidationError, WorkflowError};
use crate::log_sink::LogSink;
use crate::status::{TaskStatus, WorkflowStatus};
use crate::task::{Task, TaskSpec};
use serde::Deserialize;
use std::path::PathBuf;

/// Wire shape of a workflow submission (spec.md §6).
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub logfile: Option<PathBuf>,
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
}

/// An ordered set of tasks submitted as one unit (spec.md §3 Workflow, I1-I5).
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub priority: i64,
    pub log: Option<PathBuf>,
    pub status: WorkflowStatus,
    available: Vec<Task>,
    running: Vec<Task>,
    completed: Vec<Task>,
    logged: bool,
}

/// Validate a single raw task object per spec.md §4.2 `from_object` rules:
/// missing `cmd`; `args`/`inputs`/`outputs` not lists; any element of
/// `inputs`/`outputs` null.
fn validate_task(raw: &serde_json::Value) -> Result<(), String> {
    let obj = raw
        .as_object()
        .ok_or_else(|| "task must be an object".to_string())?;
    match obj.get("cmd") {
        Some(v) if v.is_string() => {}
        _ => return Err("cmd is required".to_string()),
    }
    for field in ["args", "inputs", "outputs"] {
        if let Some(v) = obj.get(field) {
            if !v.is_array() {
                return Err(format!("{field} must be a list"));
            }
        }
    }
    if let Some(inputs) = obj.get("inputs").and_then(|v| v.as_array()) {
        if inputs.iter().any(|v| v.is_null()) {
            return Err("An input was invalid".to_string());
        }
    }
    if let Some(outputs) = obj.get("outputs").and_then(|v| v.as_array()) {
        if outputs.iter().any(|v| v.is_null()) {
            return Err("An output was invalid".to_string());
        }
    }
    Ok(())
}

impl Workflow {
    /// Validate and construct a workflow from its wire submission, assigning
    /// it the persistence-issued `id`. On any invalid task, no tasks are
    /// constructed and every rejection is reported (spec.md §4.2, S5).
    pub fn from_object(id: String, submission: WorkflowSubmission) -> Result<Self, ValidationError> {
        let mut rejections = Vec::new();
        let mut specs = Vec::with_capacity(submission.tasks.len());
        for (index, raw) in submission.tasks.into_iter().enumerate() {
            match validate_task(&raw) {
                Ok(()) => match serde_json::from_value::<TaskSpec>(raw) {
                    Ok(spec) => specs.push(spec),
                    Err(e) => rejections.push((index, e.to_string())),
                },
                Err(reason) => rejections.push((index, reason)),
            }
        }
        if !rejections.is_empty() {
            return Err(ValidationError(rejections));
        }
        let available = specs.into_iter().map(Task::from_spec).collect();
        Ok(Self {
            id,
            name: submission.name.unwrap_or_default(),
            priority: submission.priority,
            log: submission.logfile,
            status: WorkflowStatus::Initialized,
            available,
            running: Vec::new(),
            completed: Vec::new(),
            logged: false,
        })
    }

    pub fn available(&self) -> &[Task] {
        &self.available
    }

    pub fn running(&self) -> &[Task] {
        &self.running
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }

    pub fn is_logged(&self) -> bool {
        self.logged
    }

    pub fn mark_logged(&mut self) {
        self.logged = true;
    }

    /// All tasks across the three buckets, in bucket order (P1).
    pub fn all_tasks(&self) -> impl Iterator<Item = &Task> {
        self.available
            .iter()
            .chain(self.running.iter())
            .chain(self.completed.iter())
    }

    /// Selection algorithm (spec.md §4.2 `next()`, P6). A no-op returning an
    /// empty batch once the workflow is DONE (I3).
    pub fn next(&mut self, sink: &dyn LogSink) -> Vec<Task> {
        if self.status.is_done() {
            return Vec::new();
        }
        let mut batch = Vec::new();
        let mut i = 0;
        while i < self.available.len() {
            let already_satisfied =
                !self.available[i].outputs.is_empty() && self.available[i].completed();
            if already_satisfied {
                let mut task = self.available.remove(i);
                task.set_status(TaskStatus::Skipped);
                sink.task_skipped(&self.name, &task);
                self.completed.push(task);
                continue;
            }
            let selectable = matches!(
                self.available[i].status,
                TaskStatus::Waiting | TaskStatus::Scheduled
            ) && self.available[i].ready();
            if selectable {
                let mut task = self.available.remove(i);
                task.set_status(TaskStatus::Running);
                self.running.push(task.clone());
                batch.push(task);
                continue;
            }
            i += 1;
        }

        self.status = if !batch.is_empty() || !self.running.is_empty() {
            WorkflowStatus::Running
        } else if self.available.is_empty() {
            WorkflowStatus::Completed
        } else {
            self.fail_remaining(sink);
            WorkflowStatus::Failed
        };
        batch
    }

    /// First classification pass at submission time (spec.md §4.4 `submit`
    /// step 4): already-satisfied tasks are skipped, ready tasks are
    /// selected for immediate dispatch, and every remaining task is marked
    /// **scheduled** rather than left **waiting**.
    pub fn initial_dispatch(&mut self, sink: &dyn LogSink) -> Vec<Task> {
        let batch = self.next(sink);
        for task in &mut self.available {
            if task.status == TaskStatus::Waiting {
                task.set_status(TaskStatus::Scheduled);
            }
        }
        batch
    }

    /// Resume a **Failed** workflow (spec.md §9 Open Question "restart"):
    /// reset every `failed` available task to `waiting` and give it another
    /// attempt, then recompute readiness and dispatch the newly-ready
    /// subset. A no-op on any workflow that isn't currently Failed.
    pub fn resume(&mut self, sink: &dyn LogSink) -> Vec<Task> {
        if self.status != WorkflowStatus::Failed {
            return Vec::new();
        }
        for task in &mut self.available {
            if task.status == TaskStatus::Failed {
                task.restart();
                task.set_status(TaskStatus::Waiting);
            }
        }
        self.status = WorkflowStatus::Running;
        self.initial_dispatch(sink)
    }

    /// Back-end completion callback (spec.md §4.2 `update()`, S6).
    pub fn update(
        &mut self,
        task_id: &str,
        info: crate::task::TaskInfo,
        sink: &dyn LogSink,
    ) -> Result<(), WorkflowError> {
        let pos = self
            .running
            .iter()
            .position(|t| t.id.as_str() == task_id)
            .ok_or(WorkflowError::UnknownTask)?;
        let mut task = self.running.remove(pos);
        task.info = info;

        let returned_nonzero = matches!(task.info.returned, Some(code) if code != 0);
        let task_failed = returned_nonzero || !task.completed();
        task.set_status(if task_failed {
            TaskStatus::Failed
        } else {
            TaskStatus::Completed
        });
        sink.task_done(&self.name, &task);
        self.completed.push(task);

        // I3: a DONE workflow status never changes again, even though the
        // task's own status may still move (S6).
        if self.status.is_done() {
            return Ok(());
        }

        if task_failed {
            self.fail_remaining(sink);
            self.status = WorkflowStatus::Failed;
            return Ok(());
        }

        self.status = if self.finished() {
            WorkflowStatus::Completed
        } else if self.can_proceed() {
            WorkflowStatus::Running
        } else {
            WorkflowStatus::Failed
        };
        Ok(())
    }

    /// Best-effort cancel/stop (spec.md §4.2 `cancel()`/`stop()`).
    pub fn cancel(&mut self, sink: &dyn LogSink) {
        self.transition_to_done(WorkflowStatus::Cancelled, TaskStatus::Cancelled, sink);
    }

    pub fn stop(&mut self, sink: &dyn LogSink) {
        self.transition_to_done(WorkflowStatus::Stopped, TaskStatus::Stopped, sink);
    }

    fn transition_to_done(
        &mut self,
        workflow_status: WorkflowStatus,
        task_status: TaskStatus,
        sink: &dyn LogSink,
    ) {
        if self.status.is_done() {
            return;
        }
        self.status = workflow_status;
        for task in self.available.iter_mut().chain(self.running.iter_mut()) {
            if !task.status.is_terminal() {
                task.set_status(task_status);
                sink.task_not_run(&self.name, task);
            }
        }
    }

    fn finished(&self) -> bool {
        self.available.is_empty() && self.running.is_empty()
    }

    fn can_proceed(&self) -> bool {
        self.available.iter().any(|t| t.ready()) || !self.running.is_empty()
    }

    /// `_failed()`: mark every still-available task failed and log it as not run.
    fn fail_remaining(&mut self, sink: &dyn LogSink) {
        for task in &mut self.available {
            task.set_status(TaskStatus::Failed);
            sink.task_not_run(&self.name, task);
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
