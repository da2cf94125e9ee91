// Drawing tools for the board editor.

use crate::Board;
use egui::{Color32, Pos2};
use tracing::{debug, trace};

pub trait Tool {
    // Apply one gesture (pointer path) to the board. Returns true if the board changed.
    fn apply(&self, board: &mut Board, path: &[Pos2]) -> bool;

    fn name(&self) -> &str;

    fn cursor_size(&self) -> f32 {
        1.0
    }
}

#[derive(Debug, Clone)]
pub struct Pen {
    pub width: f32,
    pub color: Color32,
}

impl Pen {
    pub fn new(width: f32, color: Color32) -> Self {
        Self { width, color }
    }
}

impl Tool for Pen {
    fn apply(&self, board: &mut Board, path: &[Pos2]) -> bool {
        trace!(
            "Applying Pen over {} points with width {} and color {:?}",
            path.len(),
            self.width,
            self.color
        );
        board.add_stroke(path, self.color, self.width)
    }

    fn name(&self) -> &str {
        "Pen"
    }

    fn cursor_size(&self) -> f32 {
        self.width
    }
}

#[derive(Debug, Clone)]
pub struct Eraser {
    pub radius: f32,
}

impl Eraser {
    pub fn new(radius: f32) -> Self {
        debug!("Creating Eraser tool with radius {}", radius);
        Self { radius }
    }
}

impl Tool for Eraser {
    fn apply(&self, board: &mut Board, path: &[Pos2]) -> bool {
        let removed: usize = path
            .iter()
            .map(|p| board.erase_at(*p, self.radius))
            .sum();
        debug!("Eraser removed {} elements", removed);
        removed > 0
    }

    fn name(&self) -> &str {
        "Eraser"
    }

    fn cursor_size(&self) -> f32 {
        self.radius * 2.0
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub color: Color32,
}

impl Label {
    pub fn new(text: impl Into<String>, color: Color32) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

impl Tool for Label {
    // Labels go where the gesture starts.
    fn apply(&self, board: &mut Board, path: &[Pos2]) -> bool {
        match path.first() {
            Some(at) => board.add_label(*at, self.text.clone(), self.color),
            None => {
                debug!("Label tool used without a position");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "Label"
    }
}
