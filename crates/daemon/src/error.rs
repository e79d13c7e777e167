// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type for `yerbad`'s boot sequence (spec.md §7: no crate
//! reaches for a catch-all error type).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Storage(#[from] yerba_storage::StorageError),
    #[error(transparent)]
    Engine(#[from] yerba_engine::EngineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
