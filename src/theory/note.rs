//! Note naming and keyboard geometry.
//!
//! Pure mappings from MIDI note numbers (0-127) to note names and to
//! horizontal pixel offsets on the keyboard graphic. Both are total over the
//! MIDI range; callers are responsible for validating anything wider.

use std::fmt;

/// Letter classes for the 12 semitones, starting from C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pixel width of one octave's worth of keys on the keyboard graphic.
pub const OCTAVE_WIDTH: f32 = 239.0;

/// Within-octave horizontal offset for each semitone, in pixels.
///
/// White keys sit on a 7-key grid (239 / 7 ≈ 34.1 px per key); black keys
/// straddle the gaps between them.
pub const NOTE_OFFSETS: [f32; 12] = [
    0.0,   // C
    24.0,  // C#
    34.0,  // D
    58.0,  // D#
    68.0,  // E
    102.0, // F
    126.0, // F#
    137.0, // G
    160.0, // G#
    171.0, // A
    194.0, // A#
    205.0, // B
];

/// A note name derived from a MIDI note number, e.g. C4 for note 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName {
    /// Letter class ("C", "C#", ... "B").
    pub letter: &'static str,
    /// Scientific pitch octave; middle C (note 60) is octave 4.
    pub octave: i32,
}

impl NoteName {
    /// Derive the name for a MIDI note number.
    pub fn from_midi(note: u8) -> Self {
        Self {
            letter: NOTE_NAMES[(note % 12) as usize],
            octave: (note / 12) as i32 - 1,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.octave)
    }
}

/// Horizontal pixel offset of a note's key on the keyboard graphic.
///
/// The graphic's origin octave starts at MIDI note 48 (C3), so middle C lands
/// one octave width in.
pub fn keyboard_x(note: u8) -> f32 {
    NOTE_OFFSETS[(note % 12) as usize] + ((note / 12) as f32 - 4.0) * OCTAVE_WIDTH
}
