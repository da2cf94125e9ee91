//! Shared history handle and the document contracts it relies on.
//!
//! A board has several places that want to record a snapshot: explicit
//! saves, autosave before upload, change listeners inside the document.
//! They all hold a clone of the same [`History`]. Undo and redo go through
//! [`History::undo_with`] / [`History::redo_with`], which apply the restored
//! snapshot under the [`RestoreGuard`] so none of those capture paths fire.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};

use crate::{HistoryConfig, HistoryError, ImportError, RestoreGuard, Snapshot, Timeline};

/// Produces a snapshot of the current document state.
///
/// Must be deterministic: serializing an unchanged document twice yields
/// equal snapshots, otherwise duplicate suppression can't work.
pub trait Serializer {
    fn serialize(&self) -> Snapshot;
}

/// Applies a snapshot to the live document without running the normal
/// "document changed" path.
pub trait Importer {
    fn import_silently(&mut self, snapshot: &Snapshot) -> Result<(), ImportError>;
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Undo,
    Redo,
}

/// Single-threaded shared handle over a [`Timeline`].
///
/// Clones refer to the same timeline and the same restore flag.
#[derive(Debug, Clone)]
pub struct History {
    timeline: Rc<RefCell<Timeline>>,
    guard: RestoreGuard,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    pub fn new(config: HistoryConfig) -> Self {
        let guard = RestoreGuard::new();
        let timeline = Timeline::from_config(&config, guard.clone());
        Self {
            timeline: Rc::new(RefCell::new(timeline)),
            guard,
        }
    }

    pub fn with_capacity(max_history: usize) -> Self {
        Self::new(HistoryConfig::with_max_history(max_history))
    }

    pub fn initialize(&self, snapshot: Snapshot) {
        self.timeline.borrow_mut().initialize(snapshot);
    }

    /// Record a snapshot. See [`Timeline::push`].
    pub fn push(&self, snapshot: Snapshot) -> bool {
        self.timeline.borrow_mut().push(snapshot)
    }

    /// Step back and apply the previous snapshot through `importer`.
    ///
    /// `Ok(None)` means there was nothing to undo. If the import fails the
    /// timeline is put back where it was, so `can_undo`/`can_redo` keep
    /// describing what the document actually shows.
    pub fn undo_with<I>(&self, importer: &mut I) -> Result<Option<Snapshot>, HistoryError>
    where
        I: Importer + ?Sized,
    {
        let mut timeline = self.timeline.borrow_mut();
        let Some(snapshot) = timeline.undo() else {
            return Ok(None);
        };
        let revision = timeline.revision();
        drop(timeline);

        self.restore(snapshot, revision, importer, Step::Undo)
    }

    /// Step forward and apply the next snapshot through `importer`.
    ///
    /// Same failure handling as [`undo_with`](Self::undo_with).
    pub fn redo_with<I>(&self, importer: &mut I) -> Result<Option<Snapshot>, HistoryError>
    where
        I: Importer + ?Sized,
    {
        let mut timeline = self.timeline.borrow_mut();
        let Some(snapshot) = timeline.redo() else {
            return Ok(None);
        };
        let revision = timeline.revision();
        drop(timeline);

        self.restore(snapshot, revision, importer, Step::Redo)
    }

    // The timeline borrow must not be held across the import: the importer
    // is allowed to call back into this handle.
    fn restore<I>(
        &self,
        snapshot: Snapshot,
        revision: u64,
        importer: &mut I,
        step: Step,
    ) -> Result<Option<Snapshot>, HistoryError>
    where
        I: Importer + ?Sized,
    {
        match self.guard.apply(|| importer.import_silently(&snapshot)) {
            Ok(()) => {
                debug!(?step, ?snapshot, "snapshot restored");
                Ok(Some(snapshot))
            }
            Err(err) => {
                error!(?step, error = %err, "snapshot import failed");
                let mut timeline = self.timeline.borrow_mut();
                if timeline.revision() == revision {
                    match step {
                        Step::Undo => timeline.revert_undo(),
                        Step::Redo => timeline.revert_redo(),
                    }
                } else {
                    warn!(?step, "timeline changed during import, not rolling back");
                }
                Err(err.into())
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.timeline.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.timeline.borrow().can_redo()
    }

    pub fn clear(&self) {
        self.timeline.borrow_mut().clear();
    }

    pub fn current(&self) -> Option<Snapshot> {
        self.timeline.borrow().current().cloned()
    }

    pub fn len(&self) -> usize {
        self.timeline.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.borrow().is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.timeline.borrow().redo_len()
    }

    pub fn capacity(&self) -> usize {
        self.timeline.borrow().capacity()
    }

    pub fn is_restoring(&self) -> bool {
        self.guard.is_restoring()
    }

    /// Copy of the committed entries, oldest first.
    pub fn entries(&self) -> Vec<Snapshot> {
        self.timeline.borrow().entries().cloned().collect()
    }
}
