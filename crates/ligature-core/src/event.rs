//! Normalized performance events.
//!
//! Events arrive already decoded from their transport (MIDI, OSC, MPE...) into
//! a single representation. Every event carries a `time`: the sample offset
//! inside the block being rendered, in `0..=BLOCK_SIZE`.
//!
//! Value ranges follow conventional MIDI-derived control:
//!
//! - velocity, controller and pressure values in `[0, 1]`
//! - pitch wheel bipolar in `[-1, 1]`
//! - key numbers `0..=127`
//!
//! ```rust
//! use ligature_core::{Event, EventKind};
//!
//! let on = Event::note_on(12, 60, 0.8);
//! assert_eq!(on.time, 12);
//! assert!(matches!(on.kind, EventKind::NoteOn { key: 60, .. }));
//! ```

/// A timestamped performance event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Sample offset within the current block
    pub time: usize,
    /// What happened
    pub kind: EventKind,
}

/// The payload of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EventKind {
    /// A key was pressed.
    NoteOn {
        /// Physical key number
        key: u8,
        /// Note value passed to the scale (usually the key number)
        note: f32,
        /// Strike velocity in `[0, 1]`
        velocity: f32,
    },
    /// A key was released.
    NoteOff {
        /// Physical key number
        key: u8,
    },
    /// A sounding voice is restarted on a new note.
    ///
    /// Normally produced internally when a voice is stolen.
    NoteRetrig {
        /// Physical key number
        key: u8,
        /// Note value passed to the scale
        note: f32,
        /// Strike velocity in `[0, 1]`
        velocity: f32,
    },
    /// Continuous controller change.
    Controller {
        /// Controller number (1 = mod wheel, 73 = X, 74 = Y, 120/123 = channel mode)
        number: u8,
        /// Controller value in `[0, 1]`
        value: f32,
    },
    /// Pitch wheel position in `[-1, 1]`.
    PitchWheel {
        /// Bipolar wheel position
        value: f32,
    },
    /// Key pressure (aftertouch).
    NotePressure {
        /// Physical key number
        key: u8,
        /// Pressure in `[0, 1]`
        value: f32,
    },
    /// Sustain pedal; down when `value > 0.5`.
    SustainPedal {
        /// Pedal position in `[0, 1]`
        value: f32,
    },
    /// No-op placeholder.
    #[default]
    Null,
}

impl Event {
    /// Create an event at `time` with the given payload.
    pub const fn new(time: usize, kind: EventKind) -> Self {
        Self { time, kind }
    }

    /// Key press whose note value is the key number itself.
    pub fn note_on(time: usize, key: u8, velocity: f32) -> Self {
        Self::new(
            time,
            EventKind::NoteOn {
                key,
                note: f32::from(key),
                velocity,
            },
        )
    }

    /// Key press with an explicit note value for the scale.
    pub fn note_on_with_note(time: usize, key: u8, note: f32, velocity: f32) -> Self {
        Self::new(time, EventKind::NoteOn { key, note, velocity })
    }

    /// Key release.
    pub fn note_off(time: usize, key: u8) -> Self {
        Self::new(time, EventKind::NoteOff { key })
    }

    /// Restart a sounding voice on `key`.
    pub fn note_retrig(time: usize, key: u8, velocity: f32) -> Self {
        Self::new(
            time,
            EventKind::NoteRetrig {
                key,
                note: f32::from(key),
                velocity,
            },
        )
    }

    /// Controller change.
    pub fn controller(time: usize, number: u8, value: f32) -> Self {
        Self::new(time, EventKind::Controller { number, value })
    }

    /// Pitch wheel move.
    pub fn pitch_wheel(time: usize, value: f32) -> Self {
        Self::new(time, EventKind::PitchWheel { value })
    }

    /// Key pressure.
    pub fn note_pressure(time: usize, key: u8, value: f32) -> Self {
        Self::new(time, EventKind::NotePressure { key, value })
    }

    /// Sustain pedal move.
    pub fn sustain_pedal(time: usize, value: f32) -> Self {
        Self::new(time, EventKind::SustainPedal { value })
    }

    /// Key number this event refers to, if any.
    pub fn key(&self) -> Option<u8> {
        match self.kind {
            EventKind::NoteOn { key, .. }
            | EventKind::NoteOff { key }
            | EventKind::NoteRetrig { key, .. }
            | EventKind::NotePressure { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new(0, EventKind::Null)
    }
}

impl EventKind {
    /// Short lowercase name, used in diagnostics and scripts.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::NoteOn { .. } => "note_on",
            EventKind::NoteOff { .. } => "note_off",
            EventKind::NoteRetrig { .. } => "note_retrig",
            EventKind::Controller { .. } => "controller",
            EventKind::PitchWheel { .. } => "pitch_wheel",
            EventKind::NotePressure { .. } => "note_pressure",
            EventKind::SustainPedal { .. } => "sustain_pedal",
            EventKind::Null => "null",
        }
    }
}
