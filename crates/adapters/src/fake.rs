// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory adapter for exercising the engine/daemon crates without a real
//! back-end (`test-support` feature, mirrors spec.md §4.3's contract).

use crate::error::AdapterError;
use crate::WorkQueueAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use yerba_core::event::NotifierEvent;
use yerba_core::{Notifier, Task, TaskInfo};

struct FakeState {
    scheduled: Vec<(String, Task, i64)>,
    cancelled: Vec<String>,
    completions: Vec<(String, String, TaskInfo)>,
    seen: HashSet<(String, String)>,
}

/// A controllable fake back-end: tests push completions with [`FakeAdapter::complete`]
/// and drive delivery with [`WorkQueueAdapter::update`].
pub struct FakeAdapter {
    group: String,
    name: String,
    state: Mutex<FakeState>,
}

impl FakeAdapter {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            state: Mutex::new(FakeState {
                scheduled: Vec::new(),
                cancelled: Vec::new(),
                completions: Vec::new(),
                seen: HashSet::new(),
            }),
        }
    }

    /// Every `(workflow_id, task, priority)` passed to `schedule`.
    pub fn scheduled(&self) -> Vec<(String, Task, i64)> {
        self.state.lock().scheduled.clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.state.lock().cancelled.clone()
    }

    /// Queue a completion to be delivered on the next [`WorkQueueAdapter::update`].
    pub fn complete(&self, workflow_id: impl Into<String>, task_id: impl Into<String>, info: TaskInfo) {
        self.state
            .lock()
            .completions
            .push((workflow_id.into(), task_id.into(), info));
    }
}

#[async_trait]
impl WorkQueueAdapter for FakeAdapter {
    fn group(&self) -> &str {
        &self.group
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    async fn schedule(
        &self,
        workflow_id: &str,
        tasks: &[Task],
        priority: i64,
    ) -> Result<(), AdapterError> {
        let mut guard = self.state.lock();
        for task in tasks {
            guard.scheduled.push((workflow_id.to_string(), task.clone(), priority));
        }
        Ok(())
    }

    async fn cancel(&self, workflow_id: &str) -> Result<(), AdapterError> {
        self.state.lock().cancelled.push(workflow_id.to_string());
        Ok(())
    }

    async fn update(&self, notifier: &Notifier) -> Result<(), AdapterError> {
        let pending: Vec<(String, String, TaskInfo)> = {
            let mut guard = self.state.lock();
            guard.completions.drain(..).collect()
        };
        for (workflow_id, task_id, info) in pending {
            let key = (workflow_id.clone(), task_id.clone());
            if !self.state.lock().seen.insert(key) {
                continue;
            }
            notifier.notify(&NotifierEvent::TaskDone { workflow_id, task_id, info });
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
