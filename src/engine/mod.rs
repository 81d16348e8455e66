//! Engine module
//!
//! MIDI input plumbing: the background listener, raw-byte parsing, and the
//! typed note-event dispatch that feeds the UI.

pub mod events;
pub mod listener;

pub use events::{classify, MidiEvent, NoteColor, NoteDispatcher, NoteEvent, ObserverId};
pub use listener::{DeviceSelector, MidiError, MidiListener, DEFAULT_EVENT_BUFFER_SIZE};
