//! Note events
//!
//! Parses raw MIDI bytes into note events and fans them out to an explicit
//! observer list. Classification is a pure dispatch step: it performs no I/O
//! and never blocks, so it is safe to run inside the listener's delivery path.

/// MIDI event types the trainer reacts to.
///
/// Only channel-voice note messages are represented; everything else parses
/// to `None` and is dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    /// Note On event.
    NoteOn {
        /// Note number (0-127).
        note: u8,
        /// Velocity (1-127; velocity 0 parses as NoteOff).
        velocity: u8,
    },
    /// Note Off event.
    NoteOff {
        /// Note number (0-127).
        note: u8,
    },
}

impl MidiEvent {
    /// Parse a MIDI event from raw bytes.
    /// Returns None for unsupported or malformed messages.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }

        match data[0] & 0xF0 {
            0x90 => {
                // Note On (velocity 0 = Note Off)
                let note = data[1] & 0x7F;
                let velocity = data[2] & 0x7F;
                if velocity == 0 {
                    Some(MidiEvent::NoteOff { note })
                } else {
                    Some(MidiEvent::NoteOn { note, velocity })
                }
            }
            0x80 => Some(MidiEvent::NoteOff {
                note: data[1] & 0x7F,
            }),
            _ => None,
        }
    }

    /// Get the note number for this event.
    pub fn note(&self) -> u8 {
        match self {
            MidiEvent::NoteOn { note, .. } => *note,
            MidiEvent::NoteOff { note } => *note,
        }
    }
}

/// Display color for an activated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteColor {
    Green,
    Red,
    Yellow,
}

impl NoteColor {
    /// Lowercase identifier used in overlay image names.
    pub fn id(&self) -> &'static str {
        match self {
            NoteColor::Green => "green",
            NoteColor::Red => "red",
            NoteColor::Yellow => "yellow",
        }
    }
}

/// Typed note event delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    /// A key was pressed.
    Activated { note: u8, color: NoteColor },
    /// A key was released.
    Released { note: u8 },
}

/// Classify a raw MIDI event into a note event.
///
/// Live input is always shown green; drill feedback recolors keys separately.
pub fn classify(event: MidiEvent) -> Option<NoteEvent> {
    match event {
        MidiEvent::NoteOn { note, .. } => Some(NoteEvent::Activated {
            note,
            color: NoteColor::Green,
        }),
        MidiEvent::NoteOff { note } => Some(NoteEvent::Released { note }),
    }
}

/// Handle identifying a registered observer, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Explicit observer list for note events.
///
/// Observers are invoked in registration order, on the thread that calls
/// `dispatch` (the UI thread in the running app).
#[derive(Default)]
pub struct NoteDispatcher {
    observers: Vec<(ObserverId, Box<dyn FnMut(&NoteEvent)>)>,
    next_id: u64,
}

impl NoteDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Returns a handle for unsubscribing.
    pub fn subscribe(&mut self, observer: impl FnMut(&NoteEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Unknown handles are ignored.
    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    /// Deliver one event to every observer, in registration order.
    pub fn dispatch(&mut self, event: &NoteEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}
