// Editor front: routes tool gestures and undo/redo commands through the
// board session so that every edit lands in the history exactly once.

use board_history::HistoryError;
use board_session::{BoardSession, DocumentStore, SessionConfig, SessionError};
use egui::Pos2;
use tracing::{debug, info};

use crate::{Board, Tool};

pub struct Editor<S> {
    session: BoardSession<Board, S>,
}

impl<S: DocumentStore> Editor<S> {
    // Start on a blank board.
    pub fn new(store: S, config: &SessionConfig) -> Result<Self, SessionError> {
        let mut session = BoardSession::new(Board::default(), store, config)?;
        session.init_history();
        info!("Editor ready on a blank board");
        Ok(Self { session })
    }

    pub fn open(&mut self, file_id: &str) -> anyhow::Result<()> {
        self.session.load_state(file_id)
    }

    pub fn save_as(&mut self, file_id: &str) -> anyhow::Result<()> {
        self.session.save_as(file_id)
    }

    // Run a tool gesture. Only real changes are saved and recorded.
    pub fn apply_tool(&mut self, tool: &dyn Tool, path: &[Pos2]) -> anyhow::Result<bool> {
        let changed = tool.apply(self.session.document_mut(), path);
        debug!("{} gesture changed board: {}", tool.name(), changed);
        if changed {
            self.session.save_state()?;
        }
        Ok(changed)
    }

    pub fn clear_board(&mut self) -> anyhow::Result<()> {
        if self.session.document().is_empty() {
            return Ok(());
        }
        self.session.document_mut().clear();
        self.session.save_state()
    }

    pub fn undo(&mut self) -> Result<bool, HistoryError> {
        self.session.undo()
    }

    pub fn redo(&mut self) -> Result<bool, HistoryError> {
        self.session.redo()
    }

    // Button state for the toolbar.
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    pub fn board(&self) -> &Board {
        self.session.document()
    }

    pub fn session(&self) -> &BoardSession<Board, S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BoardSession<Board, S> {
        &mut self.session
    }
}
