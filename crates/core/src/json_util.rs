// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small helpers for interpreting loosely-typed JSON wire values.

/// Truthiness used for `overwrite: 0|1`, descriptor directory flags, and the
/// `shorten` flag in argument triples — anything but `false`, `0`, or `null`.
pub fn is_truthy(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_i64().map(|i| i != 0).unwrap_or(true),
        serde_json::Value::Null => false,
        _ => true,
    }
}

/// Canonical encoding used for content-hash deduplication (spec.md §4.7, §9):
/// `serde_json::Value`'s default map representation is `BTreeMap`-backed, so
/// re-serializing through `Value` already sorts object keys; combined with
/// `to_string()` (no pretty-printing) this gives a deterministic encoding
/// across clients without a bespoke canonicalizer.
pub fn canonical_json(value: &serde_json::Value) -> String {
    value.to_string()
}
