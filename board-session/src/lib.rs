//! board-session: file/session coordination for the board editor.
//!
//! A session ties together three things:
//! - the live document (anything that can serialize and silently import)
//! - a document store (where saves go)
//! - the undo history shared with the rest of the editor
//!
//! Capture happens before persistence, so a failed upload still leaves an
//! undo entry behind.

use board_history::{ConfigError, ImportError};
use thiserror::Error;

pub mod config;
pub mod session;
pub mod store;

pub use config::{load_config, SessionConfig};
pub use session::BoardSession;
pub use store::{DocumentStore, FileStore, MemoryStore, StoredDocument, BOARD_FILE_EXT};

/// Session-level errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid configuration")]
    InvalidConfig(#[from] ConfigError),

    #[error("no document stored under file id: {file_id}")]
    FileNotFound { file_id: String },

    #[error("invalid file id: {file_id:?}")]
    InvalidFileId { file_id: String },

    #[error("failed to import document")]
    Import(#[from] ImportError),
}
