// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! yerba-adapters: work-queue back-end wrapper (spec.md §4.3, C6).
//!
//! The concrete distributed work-queue executor is out of scope (spec.md
//! §1); this crate defines the adapter contract and a [`LocalProcessAdapter`]
//! that runs task commands as local OS processes, useful for a single-node
//! deployment or for exercising the daemon without a real queue.

pub mod error;
pub mod process;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use error::AdapterError;
pub use process::LocalProcessAdapter;

use async_trait::async_trait;
use yerba_core::{Notifier, Task};

/// Back-end-facing contract (spec.md §4.3). Registered in a registry keyed
/// by `group + "." + name`.
#[async_trait]
pub trait WorkQueueAdapter: Send + Sync {
    fn group(&self) -> &str;
    fn name(&self) -> &str;

    /// Registry key, `group.name` (spec.md §4.3).
    fn key(&self) -> String {
        format!("{}.{}", self.group(), self.name())
    }

    /// Open back-end resources. Idempotent.
    async fn initialize(&self) -> Result<(), AdapterError>;

    /// Submit `tasks` belonging to `workflow_id` at `priority`. Tasks of
    /// higher priority are released to workers before lower; within equal
    /// priority, submission order is preserved.
    async fn schedule(
        &self,
        workflow_id: &str,
        tasks: &[Task],
        priority: i64,
    ) -> Result<(), AdapterError>;

    /// Best-effort cancel of all in-flight tasks tagged with `workflow_id`.
    async fn cancel(&self, workflow_id: &str) -> Result<(), AdapterError>;

    /// Poll the back-end for completions, emitting `TASK_DONE` on `notifier`
    /// for each. Must not block; a back-end that would block defers to the
    /// next tick.
    async fn update(&self, notifier: &Notifier) -> Result<(), AdapterError>;

    /// Drain and release resources.
    async fn stop(&self) -> Result<(), AdapterError>;
}
