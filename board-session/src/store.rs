//! Where saved boards go.
//!
//! The store only ever sees opaque snapshots. [`FileStore`] writes one JSON
//! envelope per file id; [`MemoryStore`] keeps everything in a map.

use anyhow::Context;
use board_history::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::SessionError;

/// File extension used by [`FileStore`].
pub const BOARD_FILE_EXT: &str = "board.json";

/// Envelope format version written by [`FileStore`].
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Persistence contract for the session.
pub trait DocumentStore {
    fn save(&mut self, file_id: &str, snapshot: &Snapshot) -> anyhow::Result<()>;

    /// `Ok(None)` if nothing is stored under `file_id`.
    fn load(&self, file_id: &str) -> anyhow::Result<Option<Snapshot>>;
}

/// On-disk envelope around a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub format_version: u32,
    pub file_id: String,
    pub snapshot: Snapshot,
}

/// One pretty JSON file per board under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file_id: &str) -> Result<PathBuf, SessionError> {
        let valid = !file_id.is_empty()
            && file_id != "."
            && file_id != ".."
            && !file_id.contains(['/', '\\']);
        if !valid {
            tracing::error!(file_id, "rejecting file id");
            return Err(SessionError::InvalidFileId {
                file_id: file_id.to_string(),
            });
        }
        Ok(self.root.join(format!("{file_id}.{BOARD_FILE_EXT}")))
    }
}

impl DocumentStore for FileStore {
    fn save(&mut self, file_id: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        let path = self.path_for(file_id)?;

        // fs::write does NOT create directories
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create store dir: {}", self.root.display()))?;

        let stored = StoredDocument {
            format_version: STORE_FORMAT_VERSION,
            file_id: file_id.to_string(),
            snapshot: snapshot.clone(),
        };
        let json = serde_json::to_string_pretty(&stored).context("serialize board to json")?;
        fs::write(&path, json).with_context(|| format!("write board file: {}", path.display()))?;

        tracing::debug!(file_id, path = %path.display(), bytes = snapshot.len(), "board saved");
        Ok(())
    }

    fn load(&self, file_id: &str) -> anyhow::Result<Option<Snapshot>> {
        let path = self.path_for(file_id)?;
        if !path.exists() {
            tracing::debug!(file_id, "no stored board");
            return Ok(None);
        }

        let data = fs::read_to_string(&path)
            .with_context(|| format!("read board file: {}", path.display()))?;
        let stored: StoredDocument = serde_json::from_str(&data).context("parse board json")?;
        anyhow::ensure!(
            stored.format_version <= STORE_FORMAT_VERSION,
            "unsupported board format version {} in {}",
            stored.format_version,
            path.display()
        );
        if stored.file_id != file_id {
            tracing::warn!(
                file_id,
                stored = %stored.file_id,
                "board file id does not match its file name"
            );
        }

        Ok(Some(stored.snapshot))
    }
}

/// Keeps boards in memory. Handy for tests and for unsaved scratch boards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<String, Snapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_id: &str) -> Option<&Snapshot> {
        self.files.get(file_id)
    }

    pub fn insert(&mut self, file_id: impl Into<String>, snapshot: Snapshot) {
        self.files.insert(file_id.into(), snapshot);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl DocumentStore for MemoryStore {
    fn save(&mut self, file_id: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        self.files.insert(file_id.to_string(), snapshot.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&self, file_id: &str) -> anyhow::Result<Option<Snapshot>> {
        Ok(self.files.get(file_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("boards"));
        let snapshot = Snapshot::from(r#"{"elements":[]}"#);

        store.save("math-101", &snapshot).unwrap();

        assert!(store.path_for("math-101").unwrap().exists());
        assert_eq!(store.load("math-101").unwrap(), Some(snapshot));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.load("nothing-here").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_like_ids() {
        let store = FileStore::new("boards");

        for bad in ["", "..", "a/b", "a\\b"] {
            assert!(matches!(
                store.path_for(bad),
                Err(SessionError::InvalidFileId { .. })
            ));
        }
    }

    #[test]
    fn test_file_store_rejects_newer_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.path_for("future").unwrap();
        fs::write(
            &path,
            r#"{ "format_version": 99, "file_id": "future", "snapshot": "{}" }"#,
        )
        .unwrap();

        assert!(store.load("future").is_err());
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        store.save("a", &Snapshot::from("1")).unwrap();
        store.save("a", &Snapshot::from("2")).unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.get("a"), Some(&Snapshot::from("2")));
    }
}
