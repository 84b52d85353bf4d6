//! Placement operations for the gallery wall.
//!
//! [`Wall`] ties together the tile layout, the occupancy store and two
//! bounded undo stacks: one for manual edits and one for shuffles.

pub mod undo;
pub mod wall;

pub use undo::{HistoryStatus, UndoHistory, UndoKind, UndoStack, DEFAULT_UNDO_DEPTH};
pub use wall::{ReconcileReport, Wall};
