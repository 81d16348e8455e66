//! Widgets module
//!
//! Custom UI controls for the trainer interface.

pub mod piano;

pub use piano::{piano, ActiveNotes, KeySprite, PianoConfig};
