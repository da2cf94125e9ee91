//! Snapshot timeline: committed history plus a redo buffer.
//!
//! `history` runs oldest to newest and its last entry is the current state.
//! `future` holds undone snapshots, oldest-undone first, so the next redo
//! pops from the end.
//!
//! Invariant: `history.len() + future.len() <= capacity`. Pushes evict from
//! the front of `history`; undo/redo only move entries between the two
//! stacks, so redo never has to evict.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::{HistoryConfig, RestoreGuard, Snapshot};

#[derive(Debug, Clone)]
pub struct Timeline {
    history: VecDeque<Snapshot>,
    future: Vec<Snapshot>,
    capacity: usize,
    guard: RestoreGuard,
    // Bumped on every state change so an in-flight restore can tell
    // whether the timeline moved under it.
    revision: u64,
}

impl Timeline {
    /// Create an empty timeline with its own restore guard.
    pub fn new(capacity: usize) -> Self {
        Self::with_guard(capacity, RestoreGuard::new())
    }

    /// Create an empty timeline that ignores pushes while `guard` is restoring.
    pub fn with_guard(capacity: usize, guard: RestoreGuard) -> Self {
        let capacity = if capacity == 0 {
            warn!("timeline capacity of 0 requested, using 1");
            1
        } else {
            capacity
        };

        debug!(capacity, "creating timeline");
        Self {
            history: VecDeque::with_capacity(capacity.min(256)),
            future: Vec::new(),
            capacity,
            guard,
            revision: 0,
        }
    }

    pub fn from_config(config: &HistoryConfig, guard: RestoreGuard) -> Self {
        Self::with_guard(config.max_history, guard)
    }

    /// Reset to exactly one entry.
    pub fn initialize(&mut self, snapshot: Snapshot) {
        debug!(?snapshot, "initializing timeline");
        self.history.clear();
        self.future.clear();
        self.history.push_back(snapshot);
        self.revision += 1;
    }

    /// Record a new current state. Returns true if it was recorded.
    ///
    /// Ignored while restoring, and when equal to the current entry. A
    /// recorded push discards the redo buffer.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.guard.is_restoring() {
            trace!("push ignored: restore in progress");
            return false;
        }

        if self.history.back() == Some(&snapshot) {
            trace!("push ignored: duplicate of current snapshot");
            return false;
        }

        if !self.future.is_empty() {
            debug!(dropped = self.future.len(), "new edit discards redo branch");
            self.future.clear();
        }

        self.history.push_back(snapshot);
        if self.history.len() > self.capacity {
            self.history.pop_front();
            trace!(capacity = self.capacity, "evicted oldest snapshot");
        }

        self.revision += 1;
        trace!(len = self.history.len(), "snapshot recorded");
        true
    }

    /// Step back. Returns the snapshot that is now current, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            trace!("nothing to undo");
            return None;
        }

        let undone = self.history.pop_back()?;
        self.future.push(undone);
        let current = self.history.back().cloned();
        self.revision += 1;

        debug!(
            len = self.history.len(),
            redo = self.future.len(),
            "stepped back"
        );
        current
    }

    /// Step forward. Returns the snapshot that is now current, or `None`
    /// when the redo buffer is empty.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let Some(next) = self.future.pop() else {
            trace!("nothing to redo");
            return None;
        };

        self.history.push_back(next.clone());
        self.revision += 1;
        debug_assert!(self.history.len() + self.future.len() <= self.capacity);

        debug!(
            len = self.history.len(),
            redo = self.future.len(),
            "stepped forward"
        );
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.history.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Drop everything. The restore flag is left alone.
    pub fn clear(&mut self) {
        debug!("clearing timeline");
        self.history.clear();
        self.future.clear();
        self.revision += 1;
    }

    /// Undo the effect of a successful [`undo`](Self::undo).
    pub(crate) fn revert_undo(&mut self) {
        if let Some(snapshot) = self.future.pop() {
            self.history.push_back(snapshot);
            self.revision += 1;
            debug!("reverted undo step");
        }
    }

    /// Undo the effect of a successful [`redo`](Self::redo).
    pub(crate) fn revert_redo(&mut self) {
        if self.history.len() < 2 {
            return;
        }
        if let Some(snapshot) = self.history.pop_back() {
            self.future.push(snapshot);
            self.revision += 1;
            debug!("reverted redo step");
        }
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    /// The current state, if the timeline has been initialized.
    pub fn current(&self) -> Option<&Snapshot> {
        self.history.back()
    }

    /// Committed entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn guard(&self) -> &RestoreGuard {
        &self.guard
    }
}
