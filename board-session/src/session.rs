//! Board session: the one place that talks to the document, the store and the
//! undo history together.
//!
//! Entry points that record history:
//! - `save_state` (manual save and autosave-before-upload)
//! - `import_data(.., should_save = true)`
//!
//! Entry points that reset history:
//! - `load_state`, `new_document`, `close`

use anyhow::Context;
use board_history::{History, HistoryError, Importer, Serializer, Snapshot};

use crate::{DocumentStore, SessionConfig, SessionError};

pub struct BoardSession<D, S> {
    document: D,
    store: S,
    history: History,
    file_id: Option<String>,
}

impl<D, S> BoardSession<D, S>
where
    D: Serializer + Importer,
    S: DocumentStore,
{
    /// Create a session around an already-constructed document. History
    /// starts empty; call [`init_history`](Self::init_history) or one of the
    /// loading methods to seed it.
    pub fn new(document: D, store: S, config: &SessionConfig) -> Result<Self, SessionError> {
        config.history.validate()?;
        tracing::debug!(max_history = config.history.max_history, "creating board session");
        Ok(Self {
            document,
            store,
            history: History::new(config.history),
            file_id: None,
        })
    }

    /// Seed the history with the document as it is right now.
    pub fn init_history(&mut self) {
        self.history.initialize(self.document.serialize());
    }

    /// Record the current document and persist it.
    ///
    /// The capture happens first so that a failed upload still leaves an
    /// undo entry. While a restore is running nothing is captured, but the
    /// store is still written.
    pub fn save_state(&mut self) -> anyhow::Result<()> {
        let snapshot = self.document.serialize();
        if !self.history.is_restoring() && self.history.push(snapshot.clone()) {
            tracing::trace!(len = self.history.len(), "captured snapshot");
        }

        match self.file_id.as_deref() {
            Some(file_id) => self
                .store
                .save(file_id, &snapshot)
                .with_context(|| format!("save board {file_id}"))?,
            None => tracing::debug!("no file bound, skipping persist"),
        }
        Ok(())
    }

    /// Bind the session to `file_id` and save.
    pub fn save_as(&mut self, file_id: impl Into<String>) -> anyhow::Result<()> {
        let file_id = file_id.into();
        tracing::info!(file_id = %file_id, "binding board to file");
        self.file_id = Some(file_id);
        self.save_state()
    }

    /// Undo one step. `Ok(false)` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, HistoryError> {
        Ok(self.history.undo_with(&mut self.document)?.is_some())
    }

    /// Redo one step. `Ok(false)` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, HistoryError> {
        Ok(self.history.redo_with(&mut self.document)?.is_some())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Open a stored board. History is reset to the loaded state.
    ///
    /// On failure the session is left as it was.
    pub fn load_state(&mut self, file_id: &str) -> anyhow::Result<()> {
        let snapshot = self
            .store
            .load(file_id)
            .with_context(|| format!("load board {file_id}"))?
            .ok_or_else(|| SessionError::FileNotFound {
                file_id: file_id.to_string(),
            })?;

        self.document
            .import_silently(&snapshot)
            .map_err(SessionError::from)
            .with_context(|| format!("open board {file_id}"))?;

        tracing::info!(file_id, "board loaded");
        self.file_id = Some(file_id.to_string());
        self.init_history();
        Ok(())
    }

    /// Replace the document with `initial` as a new, unsaved board.
    pub fn new_document(&mut self, initial: &Snapshot) -> Result<(), SessionError> {
        self.document.import_silently(initial)?;
        self.file_id = None;
        self.init_history();
        tracing::info!("new board");
        Ok(())
    }

    /// Apply external data. With `should_save` it counts as an edit.
    pub fn import_data(&mut self, snapshot: &Snapshot, should_save: bool) -> anyhow::Result<()> {
        self.document
            .import_silently(snapshot)
            .map_err(SessionError::from)?;
        if should_save {
            self.save_state()?;
        }
        Ok(())
    }

    pub fn export_data(&self) -> Snapshot {
        self.document.serialize()
    }

    /// Forget the current board: history is cleared and the file unbound.
    pub fn close(&mut self) {
        tracing::info!(file_id = ?self.file_id, "closing board");
        self.history.clear();
        self.file_id = None;
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Direct access for edits. Follow with [`save_state`](Self::save_state)
    /// to record them.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// Handle to the shared history, e.g. for change listeners.
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use board_history::{HistoryConfig, ImportError};

    /// Minimal document: the snapshot is the text itself.
    #[derive(Debug, Default)]
    struct Note {
        text: String,
    }

    impl Serializer for Note {
        fn serialize(&self) -> Snapshot {
            Snapshot::from(self.text.as_str())
        }
    }

    impl Importer for Note {
        fn import_silently(&mut self, snapshot: &Snapshot) -> Result<(), ImportError> {
            if snapshot.as_str().starts_with('!') {
                return Err(ImportError::Malformed {
                    reason: "bang".into(),
                });
            }
            self.text = snapshot.as_str().to_string();
            Ok(())
        }
    }

    fn session(max_history: usize) -> BoardSession<Note, MemoryStore> {
        let config = SessionConfig {
            history: HistoryConfig::with_max_history(max_history),
            store_dir: None,
        };
        let mut session = BoardSession::new(Note::default(), MemoryStore::new(), &config).unwrap();
        session.init_history();
        session
    }

    fn edit(session: &mut BoardSession<Note, MemoryStore>, text: &str) {
        session.document_mut().text = text.to_string();
        session.save_state().unwrap();
    }

    #[test]
    fn test_edit_undo_redo() {
        let mut session = session(10);
        edit(&mut session, "a");
        edit(&mut session, "ab");

        assert!(session.undo().unwrap());
        assert_eq!(session.document().text, "a");
        assert!(session.undo().unwrap());
        assert_eq!(session.document().text, "");
        assert!(!session.undo().unwrap());

        assert!(session.redo().unwrap());
        assert_eq!(session.document().text, "a");
        assert!(session.can_redo());

        edit(&mut session, "ax");
        assert!(!session.can_redo());
        assert!(!session.redo().unwrap());
    }

    #[test]
    fn test_repeated_save_records_once() {
        let mut session = session(10);
        edit(&mut session, "a");
        session.save_state().unwrap();
        session.save_state().unwrap();

        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_save_after_undo_keeps_redo() {
        let mut session = session(10);
        edit(&mut session, "a");
        session.undo().unwrap();

        // Autosave of the restored state is not a new edit.
        session.save_state().unwrap();

        assert!(session.can_redo());
    }

    #[test]
    fn test_save_persists_only_when_bound() {
        let mut session = session(10);
        edit(&mut session, "draft");
        assert_eq!(session.store().save_count(), 0);

        session.save_as("board-1").unwrap();
        edit(&mut session, "draft 2");

        assert_eq!(session.store().save_count(), 2);
        assert_eq!(
            session.store().get("board-1"),
            Some(&Snapshot::from("draft 2"))
        );
    }

    #[test]
    fn test_load_resets_history() {
        let mut session = session(10);
        edit(&mut session, "a");
        edit(&mut session, "b");
        let mut store = MemoryStore::new();
        store.insert("other", Snapshot::from("loaded"));
        session.store = store;

        session.load_state("other").unwrap();

        assert_eq!(session.document().text, "loaded");
        assert_eq!(session.file_id(), Some("other"));
        assert_eq!(session.history().entries(), vec![Snapshot::from("loaded")]);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_load_missing_leaves_session_untouched() {
        let mut session = session(10);
        edit(&mut session, "a");

        let err = session.load_state("ghost").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::FileNotFound { .. })
        ));
        assert_eq!(session.document().text, "a");
        assert!(session.can_undo());
    }

    #[test]
    fn test_failed_undo_keeps_document_and_timeline_in_step() {
        let mut session = session(10);
        edit(&mut session, "!broken");
        edit(&mut session, "fine");

        assert!(session.undo().is_err());

        assert_eq!(session.document().text, "fine");
        assert_eq!(session.history().current(), Some(Snapshot::from("fine")));
        assert!(session.can_undo());
        assert!(!session.can_redo());
        assert!(!session.history().is_restoring());
    }

    #[test]
    fn test_import_data_records_only_when_saving() {
        let mut session = session(10);

        session.import_data(&Snapshot::from("quiet"), false).unwrap();
        assert!(!session.can_undo());

        session.import_data(&Snapshot::from("loud"), true).unwrap();
        assert!(session.can_undo());
        assert_eq!(session.export_data(), Snapshot::from("loud"));
    }

    #[test]
    fn test_new_document_and_close() {
        let mut session = session(10);
        session.save_as("board-1").unwrap();
        edit(&mut session, "a");

        session.new_document(&Snapshot::from("blank")).unwrap();
        assert_eq!(session.file_id(), None);
        assert_eq!(session.history().len(), 1);

        session.close();
        assert!(session.history().is_empty());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_zero_history_rejected() {
        let config = SessionConfig {
            history: HistoryConfig::with_max_history(0),
            store_dir: None,
        };
        let result = BoardSession::new(Note::default(), MemoryStore::new(), &config);

        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }
}
