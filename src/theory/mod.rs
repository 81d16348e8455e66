//! Theory module
//!
//! Pure music-theory helpers: note naming, keyboard geometry, the practice
//! drill catalog, and the on-disk reference dataset for key rendering.

pub mod catalog;
pub mod note;
pub mod reference;

pub use catalog::{DrillMode, DRILL_MODES};
pub use note::{keyboard_x, NoteName, NOTE_NAMES, NOTE_OFFSETS, OCTAVE_WIDTH};
pub use reference::{ReferenceError, TheoryReference};
