//! Session configuration, loaded from JSON.

use anyhow::Context;
use board_history::HistoryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub history: HistoryConfig,

    /// Directory used by [`FileStore`](crate::FileStore). `None` means the
    /// caller picks one.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}

/// Load and validate a session config file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<SessionConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config file: {}", path.display()))?;
    let config: SessionConfig = serde_json::from_str(&data).context("parse config json")?;
    config
        .history
        .validate()
        .with_context(|| format!("validate config file: {}", path.display()))?;

    tracing::debug!(
        max_history = config.history.max_history,
        store_dir = ?config.store_dir,
        "loaded session config"
    );
    Ok(config)
}
