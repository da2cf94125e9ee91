//! board-history: bounded snapshot undo/redo for the board editor.
//!
//! Design rules:
//! - Snapshots are opaque. We only ever compare them for equality.
//! - History is linear. Any new edit after an undo drops the redo branch.
//! - Capacity is fixed; the oldest entry is evicted first.
//! - Nothing is captured while a snapshot is being restored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod guard;
pub mod history;
pub mod timeline;

pub use guard::RestoreGuard;
pub use history::{History, Importer, Serializer};
pub use timeline::Timeline;

/// Default number of snapshots kept when `max_history` is not configured.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Serialized document state at one point in time.
///
/// Cloning is cheap (shared buffer), which matters because the same snapshot
/// is handed back and forth between the timeline, the redo buffer and the
/// importer.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    pub fn new(data: impl Into<Arc<str>>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Snapshot {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&str> for Snapshot {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

// Snapshots can be large; keep log output readable.
impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 32;
        match self.0.char_indices().nth(PREVIEW) {
            Some((cut, _)) => write!(f, "Snapshot({:?}.. {} bytes)", &self.0[..cut], self.0.len()),
            None => write!(f, "Snapshot({:?})", &self.0),
        }
    }
}

/// Tunables for the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept in the timeline.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    pub fn with_max_history(max_history: usize) -> Self {
        Self { max_history }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            tracing::error!("max_history must be at least 1");
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_history must be at least 1")]
    ZeroCapacity,
}

/// Failure reported by an [`Importer`] while applying a snapshot.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed snapshot: {reason}")]
    Malformed { reason: String },

    #[error("document rejected snapshot: {reason}")]
    Rejected { reason: String },
}

/// Errors surfaced by undo/redo.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to restore snapshot")]
    Import(#[from] ImportError),
}
