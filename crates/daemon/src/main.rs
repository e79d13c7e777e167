// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `yerbad`: the Yerba workflow daemon binary (spec.md §1, §4.8).

mod config;
mod error;
mod listener;
mod logging;
mod protocol;

use clap::Parser;
use config::Config;
use error::DaemonError;
use listener::Daemon;
use std::path::PathBuf;
use std::sync::Arc;
use yerba_adapters::LocalProcessAdapter;
use yerba_engine::WorkflowManager;
use yerba_storage::Store;

#[derive(Debug, Parser)]
#[command(name = "yerbad", about = "Yerba workflow daemon")]
struct Cli {
    /// Path to the daemon's TOML configuration file (spec.md §6
    /// "Configuration"). Defaults to `yerba/yerba.toml` under the user's
    /// config directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("yerba").join("yerba.toml"))
        .unwrap_or_else(|| PathBuf::from("yerba.toml"))
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "yerbad exited with an error");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), DaemonError> {
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)?;
    let store = Store::setup(&config.db_path, config.db_start_index)?;
    let manager = WorkflowManager::new(store);

    let mut daemon = Daemon::new(manager);
    daemon.cleanup()?;

    for backend in &config.backends {
        let group = backend.get("group").cloned().unwrap_or_else(|| "local".to_string());
        let name = backend.get("name").cloned().unwrap_or_else(|| "default".to_string());
        match backend.get("kind").map(String::as_str) {
            Some("local") | None => {
                daemon.register_backend(Arc::new(LocalProcessAdapter::new(group, name)));
            }
            Some(other) => {
                tracing::warn!(kind = %other, "no adapter available for this back-end kind, skipping");
            }
        }
    }

    tracing::info!(port = config.port, "yerbad starting");
    daemon.run(config.port).await?;
    Ok(())
}
