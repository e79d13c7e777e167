// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow manager: owns the active-workflow map and bridges the Workflow
//! entity (C5) to persistence (C3) and the event notifier (C2) (spec.md
//! §4.4, C8).

use crate::error::EngineError;
use crate::log_sink;
use serde::Serialize;
use std::collections::HashMap;
use yerba_core::{
    NotifierEvent, Notifier, Task, TaskInfo, TaskState, TaskStatus, Workflow, WorkflowStatus,
    WorkflowSubmission,
};
use yerba_storage::Store;

/// Lightweight row projection for the `workflows` request handler (spec.md §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub status: WorkflowStatus,
    pub submitted: Option<String>,
    pub completed: Option<String>,
}

/// Result of [`WorkflowManager::submit`] (spec.md §4.4 `submit`, §6 reply shape).
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Scheduled { id: String },
    Error { errors: Vec<(usize, String)> },
}

/// State: a mapping from workflow-id to active [`Workflow`], plus the
/// persistence handle (spec.md §4.4).
pub struct WorkflowManager {
    store: Store,
    active: HashMap<String, Workflow>,
}

impl WorkflowManager {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            active: HashMap::new(),
        }
    }

    /// The ids currently held in the active map, for tick-driven re-dispatch
    /// of every in-flight workflow (spec.md §4.8 control loop).
    pub fn active_ids(&self) -> Vec<String> {
        self.active.keys().cloned().collect()
    }

    /// `(id, status)` for every active workflow, for the periodic service
    /// report a `ServiceManager` tick emits (spec.md §4.5, §4.8).
    pub fn active_statuses(&self) -> Vec<(String, WorkflowStatus)> {
        self.active
            .iter()
            .map(|(id, workflow)| (id.clone(), workflow.status))
            .collect()
    }

    /// spec.md §4.4 `get` / §4.8 `workflows` request: persisted rows,
    /// optionally filtered by id and/or status.
    pub fn list(
        &self,
        ids: Option<&[i64]>,
        status: Option<WorkflowStatus>,
    ) -> Result<Vec<WorkflowSummary>, EngineError> {
        let rows = self.store.get(ids)?;
        Ok(rows
            .into_iter()
            .filter(|row| status.map(|s| s == row.status).unwrap_or(true))
            .map(|row| WorkflowSummary {
                id: row.id.to_string(),
                status: row.status,
                submitted: row.submitted,
                completed: row.completed,
            })
            .collect())
    }

    /// spec.md §4.4 `submit`, steps 1-6.
    pub fn submit(&mut self, notifier: &Notifier, raw: serde_json::Value) -> Result<SubmitOutcome, EngineError> {
        let submission: WorkflowSubmission = match serde_json::from_value(raw.clone()) {
            Ok(s) => s,
            Err(e) => {
                return Ok(SubmitOutcome::Error {
                    errors: vec![(0, e.to_string())],
                })
            }
        };

        let mut workflow = match Workflow::from_object(String::new(), submission) {
            Ok(w) => w,
            Err(e) => return Ok(SubmitOutcome::Error { errors: e.reasons().to_vec() }),
        };

        // I4: the persistence row exists before any task is dispatched.
        let row_id = match self.store.find(&raw)? {
            Some(row) => row.id,
            None => self.store.add(&raw, WorkflowStatus::Initialized)?,
        };
        let id = row_id.to_string();
        workflow.id = id.clone();

        let sink = log_sink::resolve(workflow.log.as_deref());
        let batch = workflow.initial_dispatch(sink.as_ref());
        let priority = workflow.priority;
        self.active.insert(id.clone(), workflow);

        // P7: no SCHEDULE_TASK is emitted when nothing was selected.
        if !batch.is_empty() {
            notifier.notify(&NotifierEvent::ScheduleTask {
                workflow_id: id.clone(),
                tasks: batch,
                priority,
            });
        }

        Ok(SubmitOutcome::Scheduled { id })
    }

    /// spec.md §4.4 `fetch`: delegate to `Workflow::next`, dispatching any
    /// newly-ready batch and returning it.
    pub fn fetch(&mut self, notifier: &Notifier, id: &str) -> Result<Vec<Task>, EngineError> {
        let workflow = self
            .active
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        let sink = log_sink::resolve(workflow.log.as_deref());
        let batch = workflow.next(sink.as_ref());
        if !batch.is_empty() {
            notifier.notify(&NotifierEvent::ScheduleTask {
                workflow_id: id.to_string(),
                tasks: batch.clone(),
                priority: workflow.priority,
            });
        }
        Ok(batch)
    }

    /// spec.md §4.4 `update`, bound to `TASK_DONE`: look up the workflow,
    /// delegate to `Workflow::update`, and persist the terminal status on DONE.
    pub fn update(&mut self, id: &str, task_id: &str, info: TaskInfo) -> Result<(), EngineError> {
        let workflow = self
            .active
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        let sink = log_sink::resolve(workflow.log.as_deref());
        workflow.update(task_id, info, sink.as_ref())?;

        if workflow.status.is_done() {
            let numeric_id = numeric_id(id)?;
            self.store.update_status(numeric_id, workflow.status, true)?;
        }
        Ok(())
    }

    /// spec.md §4.4 `status`: reconcile observed task states and return the
    /// workflow status plus a projection of every task. Writes the summary
    /// log once, on first terminal observation.
    pub fn status(&mut self, id: &str) -> Result<(WorkflowStatus, Vec<TaskState>), EngineError> {
        let workflow = self
            .active
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        let states: Vec<TaskState> = workflow
            .all_tasks()
            .map(|task| {
                let mut state = task.state();
                if state.status == TaskStatus::Running {
                    if task.completed() {
                        state.status = TaskStatus::Completed;
                    } else if task.retries_exhausted() {
                        state.status = TaskStatus::Failed;
                    }
                }
                state
            })
            .collect();

        let status = workflow.status;
        if status.is_done() && !workflow.is_logged() {
            let sink = log_sink::resolve(workflow.log.as_deref());
            sink.summary(&workflow.name, status);
            workflow.mark_logged();
        }
        Ok((status, states))
    }

    /// spec.md §4.4 `cancel`: emit `CANCEL_TASK`, cancel every non-terminal
    /// task, persist the new status, and return it.
    pub fn cancel(&mut self, notifier: &Notifier, id: &str) -> Result<WorkflowStatus, EngineError> {
        let workflow = self
            .active
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        notifier.notify(&NotifierEvent::CancelTask {
            workflow_id: id.to_string(),
        });
        let sink = log_sink::resolve(workflow.log.as_deref());
        workflow.cancel(sink.as_ref());
        let status = workflow.status;

        let numeric_id = numeric_id(id)?;
        self.store.update_status(numeric_id, status, true)?;
        Ok(status)
    }

    /// spec.md §4.4 `cleanup`, run once at boot: advance every persisted
    /// non-terminal row to **Failed**, absorbing crashes of a prior run. No
    /// in-memory state is restored.
    pub fn cleanup(&mut self) -> Result<(), EngineError> {
        for row in self.store.non_terminal()? {
            self.store.update_status(row.id, WorkflowStatus::Failed, true)?;
        }
        Ok(())
    }

    /// spec.md §9 Open Question "restart": resume a Failed workflow's
    /// still-retryable tasks and dispatch any newly-ready batch.
    pub fn restart(&mut self, notifier: &Notifier, id: &str) -> Result<WorkflowStatus, EngineError> {
        let workflow = self
            .active
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        let sink = log_sink::resolve(workflow.log.as_deref());
        let batch = workflow.resume(sink.as_ref());
        let status = workflow.status;

        if !batch.is_empty() {
            notifier.notify(&NotifierEvent::ScheduleTask {
                workflow_id: id.to_string(),
                tasks: batch,
                priority: workflow.priority,
            });
        }
        Ok(status)
    }
}

fn numeric_id(id: &str) -> Result<i64, EngineError> {
    id.parse().map_err(|_| EngineError::NotFound(id.to_string()))
}

#[cfg(test)]
#[path = "workflow_manager_tests.rs"]
mod tests;
