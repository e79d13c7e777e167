// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! yerba-storage: idempotent workflow persistence (spec.md §4.7, C3).
//!
//! Single SQLite table keyed by an autoincrement id; workflows are
//! deduplicated on the canonical JSON encoding of their submitted object.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use yerba_core::json_util::canonical_json;
use yerba_core::WorkflowStatus;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown workflow status code {0}")]
    UnknownStatusCode(i64),
    #[error("row not found after insert")]
    NotFound,
}

/// One row of the `workflows` table (spec.md §4.7, §6 "Persistence layout").
#[derive(Debug, Clone)]
pub struct WorkflowRow {
    pub id: i64,
    pub workflow: serde_json::Value,
    pub submitted: Option<String>,
    pub completed: Option<String>,
    pub status: WorkflowStatus,
}

/// Handle to the backing SQLite file. Touched only from the control thread
/// (spec.md §5), so no internal locking is needed.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Create the table if absent and seed the id sequence (spec.md §4.7 `setup`).
    pub fn setup(path: &Path, start_index: i64) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workflows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workflow BLOB NOT NULL UNIQUE,
                submitted TEXT,
                completed TEXT,
                status INTEGER NOT NULL
            );",
        )?;
        // Best-effort: sqlite_sequence only exists once the table has taken
        // its first AUTOINCREMENT insert, so a fresh database may reject this.
        let _ = conn.execute(
            "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('workflows', ?1)",
            params![start_index - 1],
        );
        Ok(Self { conn })
    }

    /// In-memory store, for tests that don't need a file on disk.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE workflows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workflow BLOB NOT NULL UNIQUE,
                submitted TEXT,
                completed TEXT,
                status INTEGER NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Match on the canonical JSON encoding of `workflow` (spec.md §4.7 `find`).
    pub fn find(&self, workflow: &serde_json::Value) -> Result<Option<WorkflowRow>, StorageError> {
        let canonical = canonical_json(workflow);
        self.conn
            .query_row(
                "SELECT id, workflow, submitted, completed, status FROM workflows WHERE workflow = ?1",
                params![canonical.as_bytes()],
                Self::map_row,
            )
            .optional()?
            .transpose()
    }

    /// Insert a new row, swallowing uniqueness violations so that resubmitting
    /// the same content is idempotent (spec.md §4.7 `add`, P3).
    pub fn add(
        &self,
        workflow: &serde_json::Value,
        status: WorkflowStatus,
    ) -> Result<i64, StorageError> {
        let canonical = canonical_json(workflow);
        let submitted = epoch_seconds().to_string();
        let result = self.conn.execute(
            "INSERT INTO workflows (workflow, submitted, status) VALUES (?1, ?2, ?3)",
            params![canonical.as_bytes(), submitted, status.as_db_code()],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                self.find(workflow)?.map(|row| row.id).ok_or(StorageError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Update the terminal status and, when `completed`, stamp the completion
    /// time (spec.md §4.7 `update_status`).
    pub fn update_status(
        &self,
        id: i64,
        status: WorkflowStatus,
        completed: bool,
    ) -> Result<(), StorageError> {
        if completed {
            self.conn.execute(
                "UPDATE workflows SET status = ?1, completed = ?2 WHERE id = ?3",
                params![status.as_db_code(), epoch_seconds().to_string(), id],
            )?;
        } else {
            self.conn.execute(
                "UPDATE workflows SET status = ?1 WHERE id = ?2",
                params![status.as_db_code(), id],
            )?;
        }
        Ok(())
    }

    /// Rows filtered by `ids`, or every row when `ids` is `None` (spec.md §4.7 `get`).
    pub fn get(&self, ids: Option<&[i64]>) -> Result<Vec<WorkflowRow>, StorageError> {
        let rows: Vec<Result<WorkflowRow, StorageError>> = match ids {
            None => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id, workflow, submitted, completed, status FROM workflows")?;
                stmt.query_map([], Self::map_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            Some(ids) => {
                let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
                let sql = format!(
                    "SELECT id, workflow, submitted, completed, status FROM workflows WHERE id IN ({placeholders})"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                stmt.query_map(params_from_iter(ids.iter()), Self::map_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        rows.into_iter().collect()
    }

    /// Rows whose status is not in `DONE` (spec.md §4.4 boot-time `cleanup`).
    pub fn non_terminal(&self) -> Result<Vec<WorkflowRow>, StorageError> {
        Ok(self
            .get(None)?
            .into_iter()
            .filter(|row| !row.status.is_done())
            .collect())
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<Result<WorkflowRow, StorageError>> {
        let blob: Vec<u8> = row.get(1)?;
        let workflow: serde_json::Value = match serde_json::from_slice(&blob) {
            Ok(v) => v,
            Err(e) => {
                return Ok(Err(StorageError::Sqlite(rusqlite::Error::ToSqlConversionFailure(
                    Box::new(e),
                ))))
            }
        };
        let code: i64 = row.get(4)?;
        let status = match WorkflowStatus::from_db_code(code) {
            Some(s) => s,
            None => return Ok(Err(StorageError::UnknownStatusCode(code))),
        };
        Ok(Ok(WorkflowRow {
            id: row.get(0)?,
            workflow,
            submitted: row.get(2)?,
            completed: row.get(3)?,
            status,
        }))
    }
}

fn epoch_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
