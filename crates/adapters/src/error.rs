// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by a [`crate::WorkQueueAdapter`] (spec.md §7 `BackendUnavailable`).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no back-end registered for {0}")]
    BackendUnavailable(String),
    #[error("failed to launch task: {0}")]
    Spawn(#[from] std::io::Error),
}
