// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input/output file descriptors.
//!
//! Design Notes (spec.md §9): the wire format lets a descriptor be either a
//! plain path string or a `[path, directory-flag]` pair. Rather than carry
//! that union through the engine we parse it once into a tagged
//! [`PathDescriptor`] and never look at a raw bool again.

use crate::json_util::is_truthy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// One declared input or output of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathDescriptor {
    File(PathBuf),
    Dir(PathBuf),
}

/// Wire shape accepted on the way in: a bare path, or a `[path, dirFlag]` pair
/// where `dirFlag` may be a bool or a truthy/falsy integer (spec.md §4.1
/// describes `overwrite: truthy`, so descriptors follow the same convention).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDescriptor {
    Plain(PathBuf),
    Pair(PathBuf, serde_json::Value),
}

impl<'de> Deserialize<'de> for PathDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawDescriptor::deserialize(deserializer)? {
            RawDescriptor::Plain(p) => Ok(PathDescriptor::File(p)),
            RawDescriptor::Pair(p, flag) => {
                if is_truthy(&flag) {
                    Ok(PathDescriptor::Dir(p))
                } else {
                    Ok(PathDescriptor::File(p))
                }
            }
        }
    }
}

impl Serialize for PathDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PathDescriptor::File(p) => p.serialize(serializer),
            PathDescriptor::Dir(p) => (p, true).serialize(serializer),
        }
    }
}

impl PathDescriptor {
    pub fn path(&self) -> &Path {
        match self {
            PathDescriptor::File(p) => p,
            PathDescriptor::Dir(p) => p,
        }
    }

    pub fn is_dir_flagged(&self) -> bool {
        matches!(self, PathDescriptor::Dir(_))
    }

    /// Readiness/completion predicate (spec.md §3): a directory descriptor
    /// resolves iff the path is an existing directory; a plain path
    /// descriptor resolves iff the file exists (and is non-empty unless
    /// `allow_zero_length` permits it).
    pub fn resolves(&self, allow_zero_length: bool) -> bool {
        match self {
            PathDescriptor::Dir(p) => p.is_dir(),
            PathDescriptor::File(p) => match std::fs::metadata(p) {
                Ok(meta) => meta.is_file() && (allow_zero_length || meta.len() > 0),
                Err(_) => false,
            },
        }
    }

    /// Best-effort delete, ignoring "missing file" errors (spec.md §4.1 `clear()`).
    pub fn clear(&self) -> std::io::Result<()> {
        let result = match self {
            PathDescriptor::Dir(p) => std::fs::remove_dir_all(p),
            PathDescriptor::File(p) => std::fs::remove_file(p),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Ord for PathDescriptor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Design Notes (spec.md §9): sorting is lexicographic on the path component.
        self.path().cmp(other.path())
    }
}

impl PartialOrd for PathDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
