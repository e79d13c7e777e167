// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow and task status enums.

use serde::{Deserialize, Serialize};

/// Status of a single task within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Waiting,
    Scheduled,
    Running,
    Completed,
    Failed,
    Cancelled,
    Stopped,
    Skipped,
}

crate::simple_display! {
    TaskStatus {
        Waiting => "waiting",
        Scheduled => "scheduled",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
        Stopped => "stopped",
        Skipped => "skipped",
    }
}

impl TaskStatus {
    /// True for statuses a task reaches only once it has left `available`/`running`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed
                | TaskStatus::Failed
                | TaskStatus::Cancelled
                | TaskStatus::Stopped
                | TaskStatus::Skipped
        )
    }
}

/// Status of a workflow as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    Scheduled,
    Running,
    Completed,
    Cancelled,
    Stopped,
    Failed,
    NotFound,
    Error,
}

crate::simple_display! {
    WorkflowStatus {
        Initialized => "Initialized",
        Scheduled => "Scheduled",
        Running => "Running",
        Completed => "Completed",
        Cancelled => "Cancelled",
        Stopped => "Stopped",
        Failed => "Failed",
        NotFound => "NotFound",
        Error => "Error",
    }
}

impl WorkflowStatus {
    /// The terminal `DONE` set from spec.md I3/§3/§4.2: once entered, a
    /// workflow's own status never changes again (only its tasks' statuses can).
    pub fn is_done(self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed
                | WorkflowStatus::Cancelled
                | WorkflowStatus::Stopped
                | WorkflowStatus::Failed
        )
    }

    /// Numeric encoding stored in the `status` column of the persistence table (§4.7).
    pub fn as_db_code(self) -> i64 {
        match self {
            WorkflowStatus::Initialized => 0,
            WorkflowStatus::Scheduled => 1,
            WorkflowStatus::Running => 2,
            WorkflowStatus::Completed => 3,
            WorkflowStatus::Cancelled => 4,
            WorkflowStatus::Stopped => 5,
            WorkflowStatus::Failed => 6,
            WorkflowStatus::NotFound => 7,
            WorkflowStatus::Error => 8,
        }
    }

    pub fn from_db_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => WorkflowStatus::Initialized,
            1 => WorkflowStatus::Scheduled,
            2 => WorkflowStatus::Running,
            3 => WorkflowStatus::Completed,
            4 => WorkflowStatus::Cancelled,
            5 => WorkflowStatus::Stopped,
            6 => WorkflowStatus::Failed,
            7 => WorkflowStatus::NotFound,
            8 => WorkflowStatus::Error,
            _ => return None,
        })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
