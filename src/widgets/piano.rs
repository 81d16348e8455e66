//! Piano keyboard widget for visual feedback of held notes.
//!
//! Draws a multi-octave keyboard and overlays the currently held keys in
//! their event colors. The widget renders from an [`ActiveNotes`] map, which
//! tracks one visual handle per held MIDI note.

use std::collections::BTreeMap;

use egui::{Color32, Pos2, Rect, Response, Sense, Ui, Vec2};

use crate::engine::{NoteColor, NoteEvent};
use crate::theory::{keyboard_x, NoteName, TheoryReference, OCTAVE_WIDTH};

/// Semitones that fall on white keys (C D E F G A B).
const WHITE_KEY_NOTES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Semitones that fall on black keys (C# D# F# G# A#).
const BLACK_KEY_NOTES: [u8; 5] = [1, 3, 6, 8, 10];

/// Visual handle for one held key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySprite {
    /// Overlay color from the activation event.
    pub color: NoteColor,
    /// Horizontal pixel offset on the keyboard graphic.
    pub x: f32,
    /// Overlay image identifier, when the reference dataset provides one.
    pub image: Option<String>,
}

/// Currently held keys, one entry per MIDI note.
///
/// Activating a note that is already held replaces its sprite rather than
/// stacking a duplicate; releasing a note that is not held is a no-op. Owned
/// by the UI thread.
#[derive(Debug, Clone, Default)]
pub struct ActiveNotes {
    notes: BTreeMap<u8, KeySprite>,
}

impl ActiveNotes {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a note as held, replacing any prior sprite for the same note.
    pub fn activate(&mut self, note: u8, color: NoteColor, reference: &TheoryReference) {
        let sprite = KeySprite {
            color,
            x: keyboard_x(note),
            image: reference.key_image(note % 12, color.id()),
        };
        self.notes.insert(note, sprite);
    }

    /// Mark a note as released. No-op when the note is not held.
    pub fn release(&mut self, note: u8) {
        self.notes.remove(&note);
    }

    /// Apply a note event.
    pub fn apply(&mut self, event: &NoteEvent, reference: &TheoryReference) {
        match event {
            NoteEvent::Activated { note, color } => self.activate(*note, *color, reference),
            NoteEvent::Released { note } => self.release(*note),
        }
    }

    /// Sprite for a held note, if any.
    pub fn sprite(&self, note: u8) -> Option<&KeySprite> {
        self.notes.get(&note)
    }

    /// Whether the note is currently held.
    pub fn contains(&self, note: u8) -> bool {
        self.notes.contains_key(&note)
    }

    /// Number of held notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True when no note is held.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Iterate held notes in ascending note order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &KeySprite)> {
        self.notes.iter().map(|(note, sprite)| (*note, sprite))
    }

    /// Drop all held notes (e.g. when the listener reconnects).
    pub fn clear(&mut self) {
        self.notes.clear();
    }
}

/// Configuration for the piano keyboard widget.
#[derive(Clone, Debug)]
pub struct PianoConfig {
    /// First displayed note; must be a C for the key grid to line up.
    pub start_note: u8,
    /// Number of octaves displayed.
    pub octaves: u8,
    /// Key height in UI points.
    pub height: f32,
    /// Horizontal scale: UI points per layout pixel.
    pub scale: f32,
    /// Color of white keys when inactive.
    pub white_key_color: Color32,
    /// Color of black keys when inactive.
    pub black_key_color: Color32,
    /// Whether to label each C with its octave.
    pub show_labels: bool,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            start_note: 48, // C3, the graphic's origin octave
            octaves: 3,
            height: 90.0,
            scale: 1.0,
            white_key_color: Color32::from_rgb(240, 240, 235),
            black_key_color: Color32::from_rgb(30, 30, 35),
            show_labels: true,
        }
    }
}

impl PianoConfig {
    /// Set the displayed range.
    pub fn with_range(mut self, start_note: u8, octaves: u8) -> Self {
        self.start_note = start_note;
        self.octaves = octaves;
        self
    }

    /// Set the key height.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Total widget width in UI points.
    pub fn width(&self) -> f32 {
        self.octaves as f32 * OCTAVE_WIDTH * self.scale
    }

    /// End of the displayed range (exclusive), clamped to the MIDI range.
    /// Computed in u16 so any `start_note`/`octaves` combination is valid.
    pub fn end_note(&self) -> u8 {
        (self.start_note as u16 + self.octaves as u16 * 12).min(127) as u8
    }
}

/// Fill color for a held key overlay.
fn overlay_color(color: NoteColor) -> Color32 {
    match color {
        NoteColor::Green => Color32::from_rgb(102, 187, 106),
        NoteColor::Red => Color32::from_rgb(239, 83, 80),
        NoteColor::Yellow => Color32::from_rgb(255, 213, 79),
    }
}

/// A piano keyboard widget showing which notes are currently held.
pub fn piano(ui: &mut Ui, active: &ActiveNotes, config: &PianoConfig) -> Response {
    let label_height = if config.show_labels { 14.0 } else { 0.0 };
    let (rect, response) = ui.allocate_exact_size(
        Vec2::new(config.width(), config.height + label_height),
        Sense::hover(),
    );

    if !ui.is_rect_visible(rect) {
        return response;
    }

    let painter = ui.painter();
    let white_key_width = OCTAVE_WIDTH / 7.0 * config.scale;
    let black_key_width = white_key_width * 0.6;
    let black_key_height = config.height * 0.6;
    let origin_x = keyboard_x(config.start_note);

    // Key x on screen from the layout-pixel offset.
    let key_screen_x = |note: u8| rect.left() + (keyboard_x(note) - origin_x) * config.scale;

    let last_note = config.end_note();

    // White keys first, overlays and black keys on top.
    for note in config.start_note..last_note {
        if !WHITE_KEY_NOTES.contains(&(note % 12)) {
            continue;
        }
        let key_rect = Rect::from_min_size(
            Pos2::new(key_screen_x(note), rect.top()),
            Vec2::new(white_key_width - 1.0, config.height),
        );

        let fill = match active.sprite(note) {
            Some(sprite) => overlay_color(sprite.color),
            None => config.white_key_color,
        };
        painter.rect_filled(key_rect, 2.0, fill);
        painter.rect_stroke(key_rect, 2.0, egui::Stroke::new(0.5, Color32::from_gray(120)));

        if config.show_labels && note % 12 == 0 {
            painter.text(
                Pos2::new(key_rect.center().x, rect.bottom() - 6.0),
                egui::Align2::CENTER_CENTER,
                NoteName::from_midi(note).to_string(),
                egui::FontId::proportional(9.0),
                Color32::from_gray(160),
            );
        }
    }

    for note in config.start_note..last_note {
        if !BLACK_KEY_NOTES.contains(&(note % 12)) {
            continue;
        }
        // Black-key offsets in the layout table are the key's left edge,
        // already straddling the gap between its white neighbors.
        let key_rect = Rect::from_min_size(
            Pos2::new(key_screen_x(note), rect.top()),
            Vec2::new(black_key_width, black_key_height),
        );

        let fill = match active.sprite(note) {
            Some(sprite) => overlay_color(sprite.color),
            None => config.black_key_color,
        };
        painter.rect_filled(key_rect, 1.5, fill);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> TheoryReference {
        TheoryReference::builtin()
    }

    #[test]
    fn test_activate_then_release() {
        let mut active = ActiveNotes::new();
        active.activate(60, NoteColor::Green, &reference());
        assert!(active.contains(60));
        assert_eq!(active.len(), 1);

        active.release(60);
        assert!(active.is_empty());
    }

    #[test]
    fn test_duplicate_activation_replaces() {
        let mut active = ActiveNotes::new();
        active.activate(60, NoteColor::Green, &reference());
        active.activate(60, NoteColor::Red, &reference());

        assert_eq!(active.len(), 1);
        assert_eq!(active.sprite(60).unwrap().color, NoteColor::Red);
    }

    #[test]
    fn test_release_absent_is_noop() {
        let mut active = ActiveNotes::new();
        active.release(60);
        assert!(active.is_empty());
    }

    #[test]
    fn test_rapid_on_on_off_leaves_nothing() {
        let reference = reference();
        let mut active = ActiveNotes::new();
        for event in [
            NoteEvent::Activated {
                note: 60,
                color: NoteColor::Green,
            },
            NoteEvent::Activated {
                note: 60,
                color: NoteColor::Green,
            },
            NoteEvent::Released { note: 60 },
        ] {
            active.apply(&event, &reference);
        }
        assert!(active.is_empty());
    }

    #[test]
    fn test_sprite_carries_position_and_image() {
        let mut active = ActiveNotes::new();
        active.activate(60, NoteColor::Green, &reference());

        let sprite = active.sprite(60).unwrap();
        assert!((sprite.x - keyboard_x(60)).abs() < f32::EPSILON);
        assert_eq!(sprite.image.as_deref(), Some("key_green_c.png"));
    }

    #[test]
    fn test_sprite_degrades_without_reference_data() {
        let mut active = ActiveNotes::new();
        active.activate(60, NoteColor::Green, &TheoryReference::default());
        assert!(active.sprite(60).unwrap().image.is_none());
    }

    #[test]
    fn test_iter_in_note_order() {
        let reference = reference();
        let mut active = ActiveNotes::new();
        active.activate(67, NoteColor::Green, &reference);
        active.activate(60, NoteColor::Green, &reference);
        active.activate(64, NoteColor::Green, &reference);

        let notes: Vec<u8> = active.iter().map(|(note, _)| note).collect();
        assert_eq!(notes, vec![60, 64, 67]);
    }

    #[test]
    fn test_config_width_scales_with_octaves() {
        let config = PianoConfig::default().with_range(48, 2);
        assert!((config.width() - 2.0 * OCTAVE_WIDTH).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_end_note_clamps_to_midi_range() {
        let config = PianoConfig::default().with_range(48, 3);
        assert_eq!(config.end_note(), 84);

        let wide = PianoConfig::default().with_range(48, 255);
        assert_eq!(wide.end_note(), 127);

        let high = PianoConfig::default().with_range(255, 255);
        assert_eq!(high.end_note(), 127);
    }

    #[test]
    fn test_key_tables() {
        assert_eq!(WHITE_KEY_NOTES, [0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(BLACK_KEY_NOTES, [1, 3, 6, 8, 10]);
    }
}
