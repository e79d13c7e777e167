// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier events connecting workflows to work-queue back-ends (spec.md §4.6).

use crate::task::{Task, TaskInfo};

/// The three events the notifier carries (spec.md GLOSSARY "Notifier event").
#[derive(Debug, Clone)]
pub enum NotifierEvent {
    /// A batch of tasks belonging to `workflow_id` is ready for dispatch.
    ScheduleTask {
        workflow_id: String,
        tasks: Vec<Task>,
        priority: i64,
    },
    /// Best-effort request to cancel all in-flight tasks for `workflow_id`.
    CancelTask { workflow_id: String },
    /// A back-end reported a task completion.
    TaskDone {
        workflow_id: String,
        task_id: String,
        info: TaskInfo,
    },
}

impl NotifierEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NotifierEvent::ScheduleTask { .. } => "SCHEDULE_TASK",
            NotifierEvent::CancelTask { .. } => "CANCEL_TASK",
            NotifierEvent::TaskDone { .. } => "TASK_DONE",
        }
    }
}
