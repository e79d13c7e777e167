// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-task options.
//!
//! Design Notes (spec.md §9): the source chains a dynamic options map so
//! unset keys fall through to defaults. We represent that as a plain struct
//! with `Option` fields and merge field-wise instead.

use serde::{Deserialize, Serialize};

/// Options controlling how a task's readiness/completion/failure is judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOptions {
    pub allow_zero_length: bool,
    pub retries: i64,
    pub accepted_return_codes: Vec<i64>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            allow_zero_length: true,
            retries: 0,
            accepted_return_codes: vec![0],
        }
    }
}

/// Wire shape: every field optional, `null` values filtered out (spec.md §4.1
/// "Keys whose value is null are filtered out").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskOptionsPatch {
    #[serde(rename = "allow-zero-length", default)]
    pub allow_zero_length: Option<bool>,
    #[serde(default)]
    pub retries: Option<i64>,
    #[serde(rename = "accepted-return-codes", default)]
    pub accepted_return_codes: Option<Vec<i64>>,
}

impl TaskOptions {
    /// Apply a patch over the defaults: present keys shadow, absent/null keys
    /// fall through (spec.md §4.1 "Option merging").
    pub fn merged(patch: TaskOptionsPatch) -> Self {
        let defaults = Self::default();
        Self {
            allow_zero_length: patch.allow_zero_length.unwrap_or(defaults.allow_zero_length),
            retries: patch.retries.unwrap_or(defaults.retries),
            accepted_return_codes: patch
                .accepted_return_codes
                .unwrap_or(defaults.accepted_return_codes),
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
