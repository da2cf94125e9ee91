// Editor module for the board UI.

pub mod board;
pub mod tools;
pub mod workspace;

pub use board::{Board, Element};
pub use tools::{Eraser, Label, Pen, Tool};
pub use workspace::Editor;
