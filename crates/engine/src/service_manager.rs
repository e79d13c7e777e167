// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service manager: lifecycle for registered work-queue back-ends (spec.md
//! §4.5, C7).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use yerba_adapters::WorkQueueAdapter;
use yerba_core::{Notifier, WorkflowStatus};

/// How often [`ServiceManager::update`] emits a state report.
const REFRESH: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running,
}

/// Registry of back-ends keyed by `group.name` (spec.md §4.5). Duplicate
/// registration is a warn-and-ignore.
pub struct ServiceManager {
    backends: HashMap<String, Arc<dyn WorkQueueAdapter>>,
    state: RunState,
    last_report: Option<Instant>,
}

impl ServiceManager {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            state: RunState::Stopped,
            last_report: None,
        }
    }

    /// Register a back-end. Warns and ignores if `group.name` is already taken.
    pub fn register(&mut self, adapter: Arc<dyn WorkQueueAdapter>) {
        let key = adapter.key();
        if self.backends.contains_key(&key) {
            tracing::warn!(backend = %key, "duplicate back-end registration ignored");
            return;
        }
        self.backends.insert(key, adapter);
    }

    pub fn backend(&self, key: &str) -> Option<&Arc<dyn WorkQueueAdapter>> {
        self.backends.get(key)
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Initialize every registered back-end and mark the registry running.
    pub async fn start(&mut self) {
        for (key, backend) in &self.backends {
            if let Err(e) = backend.initialize().await {
                tracing::warn!(backend = %key, error = %e, "back-end failed to initialize");
            }
        }
        self.last_report = Some(Instant::now());
        self.state = RunState::Running;
    }

    /// Poll every back-end for completions; every [`REFRESH`] interval, log a
    /// human-readable report covering per-workflow status and back-end
    /// statistics (spec.md §4.5).
    pub async fn update(&mut self, notifier: &Notifier, workflows: &[(String, WorkflowStatus)]) {
        for (key, backend) in &self.backends {
            if let Err(e) = backend.update(notifier).await {
                tracing::warn!(backend = %key, error = %e, "back-end update failed");
            }
        }

        let due = match self.last_report {
            Some(t) => t.elapsed() >= REFRESH,
            None => true,
        };
        if due {
            self.last_report = Some(Instant::now());
            self.report(workflows);
        }
    }

    fn report(&self, workflows: &[(String, WorkflowStatus)]) {
        let backends = self.backends.keys().cloned().collect::<Vec<_>>().join(", ");
        let by_status = workflows
            .iter()
            .map(|(id, status)| format!("{id}={status}"))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::info!(
            backends = %backends,
            backend_count = self.backends.len(),
            workflows = %by_status,
            workflow_count = workflows.len(),
            "service manager report"
        );
    }

    /// Stop every registered back-end and clear the running flag.
    pub async fn stop(&mut self) {
        for (key, backend) in &self.backends {
            if let Err(e) = backend.stop().await {
                tracing::warn!(backend = %key, error = %e, "back-end failed to stop");
            }
        }
        self.state = RunState::Stopped;
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "service_manager_tests.rs"]
mod tests;
