// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced by the workflow/service managers (spec.md §7).

use thiserror::Error;
use yerba_core::{ValidationError, WorkflowError as CoreWorkflowError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown workflow id {0}")]
    NotFound(String),
    #[error("no back-end registered for {0}")]
    BackendUnavailable(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] yerba_storage::StorageError),
    #[error("adapter error: {0}")]
    Adapter(#[from] yerba_adapters::AdapterError),
    #[error(transparent)]
    Workflow(#[from] CoreWorkflowError),
}
