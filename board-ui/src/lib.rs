//! board-ui: the reference board document and editor front for the
//! undo/redo history.

pub mod editor;

pub use editor::{Board, Editor, Element, Eraser, Label, Pen, Tool};
