// The board document: everything the user has drawn or written.
// It is the thing that gets serialized into undo snapshots and saved.

use board_history::{ImportError, Importer, Serializer, Snapshot};
use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Stroke {
        points: Vec<Pos2>,
        color: Color32,
        width: f32,
    },
    Label {
        at: Pos2,
        text: String,
        color: Color32,
    },
}

impl Element {
    // Does a circle of `radius` around `pos` touch this element?
    pub fn hit(&self, pos: Pos2, radius: f32) -> bool {
        match self {
            Element::Stroke { points, width, .. } => {
                let reach = radius + width / 2.0;
                points.iter().any(|p| p.distance(pos) <= reach)
            }
            Element::Label { at, .. } => at.distance(pos) <= radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub background: Color32,
    // Only grown through add_*, which keep every number finite. serde_json
    // writes non-finite floats as null, and those snapshots would not import.
    elements: Vec<Element>,
}

impl Board {
    pub fn new(background: Color32) -> Self {
        debug!("Creating new board with background {:?}", background);
        Self {
            background,
            elements: Vec::new(),
        }
    }

    // Add a stroke. Non-finite points are dropped; returns false if nothing is left
    // or the width is unusable.
    pub fn add_stroke(&mut self, points: &[Pos2], color: Color32, width: f32) -> bool {
        if !width.is_finite() || width < 0.0 {
            warn!("Ignoring stroke with width {}", width);
            return false;
        }

        let points: Vec<Pos2> = points
            .iter()
            .copied()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .collect();

        if points.is_empty() {
            warn!("Ignoring stroke without usable points");
            return false;
        }

        trace!("Adding stroke of {} points, width {}", points.len(), width);
        self.elements.push(Element::Stroke {
            points,
            color,
            width,
        });
        true
    }

    pub fn add_label(&mut self, at: Pos2, text: impl Into<String>, color: Color32) -> bool {
        let text = text.into();
        if text.trim().is_empty() || !(at.x.is_finite() && at.y.is_finite()) {
            warn!("Ignoring empty or misplaced label");
            return false;
        }

        trace!("Adding label {:?} at {:?}", text, at);
        self.elements.push(Element::Label { at, text, color });
        true
    }

    // Remove every element touched by the eraser circle. Returns how many went.
    pub fn erase_at(&mut self, pos: Pos2, radius: f32) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !e.hit(pos, radius));
        let removed = before - self.elements.len();
        trace!("Erased {} elements at {:?}", removed, pos);
        removed
    }

    pub fn clear(&mut self) {
        debug!("Clearing board");
        self.elements.clear();
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(Color32::WHITE)
    }
}

impl Serializer for Board {
    fn serialize(&self) -> Snapshot {
        match serde_json::to_string(self) {
            Ok(json) => Snapshot::from(json),
            Err(err) => {
                // serde_json only fails on non-string map keys or custom
                // serialize errors, neither of which Board has. An empty
                // snapshot fails import instead of restoring the wrong board.
                error!("Failed to serialize board: {}", err);
                Snapshot::from("")
            }
        }
    }
}

impl Importer for Board {
    fn import_silently(&mut self, snapshot: &Snapshot) -> Result<(), ImportError> {
        let board: Board =
            serde_json::from_str(snapshot.as_str()).map_err(|e| ImportError::Malformed {
                reason: e.to_string(),
            })?;

        debug!("Imported board with {} elements", board.len());
        *self = board;
        Ok(())
    }
}
