// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (spec.md §6 "Configuration", C10).
//!
//! INI-like sections (`[yerba]`, `[db]`, `[workqueue]`, `[workqueue1]` ..
//! `[workqueue10]`) are valid TOML, so they're parsed with the `toml` crate
//! rather than a bespoke grammar.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required [{0}] section")]
    MissingSection(&'static str),
}

/// One `[workqueueN]` (or the bare `[workqueue]`) section, passed to the
/// adapter registry as a free-form key/value map (spec.md §6).
pub type BackendConfig = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub db_start_index: i64,
    pub backends: Vec<BackendConfig>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    fn parse(text: &str) -> Result<Self, ConfigError> {
        let root: toml::Value = toml::from_str(text)?;

        let yerba = table(&root, "yerba").ok_or(ConfigError::MissingSection("yerba"))?;
        let port = yerba
            .get("port")
            .and_then(toml::Value::as_integer)
            .unwrap_or(7890) as u16;

        let db = table(&root, "db").ok_or(ConfigError::MissingSection("db"))?;
        let db_path = db
            .get("path")
            .and_then(toml::Value::as_str)
            .unwrap_or("yerba.sqlite3")
            .into();
        let db_start_index = db.get("start_index").and_then(toml::Value::as_integer).unwrap_or(1);

        let mut backends = Vec::new();
        if let Some(t) = table(&root, "workqueue") {
            backends.push(backend_map(t));
        }
        for i in 1..=10 {
            if let Some(t) = table(&root, &format!("workqueue{i}")) {
                backends.push(backend_map(t));
            }
        }

        Ok(Self { port, db_path, db_start_index, backends })
    }
}

fn table<'a>(root: &'a toml::Value, section: &str) -> Option<&'a toml::value::Table> {
    root.get(section).and_then(toml::Value::as_table)
}

fn backend_map(table: &toml::value::Table) -> BackendConfig {
    table
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
