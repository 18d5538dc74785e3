//! Note-to-pitch mapping.
//!
//! Voices emit pitch in the log domain: one unit is one octave, and 0.0 is
//! A440. How a note number becomes a log pitch is up to the [`Scale`]; the
//! engine treats it as an opaque function.

/// Maps a note value to a log-domain pitch (octaves relative to A440).
pub trait Scale {
    /// Log pitch for `note`. `note` may be fractional.
    fn note_to_log_pitch(&self, note: f32) -> f32;
}

/// Equal division of the octave around a reference note.
///
/// The default is 12-TET with MIDI note 69 (A4) at log pitch 0.
///
/// ```rust
/// use ligature_core::{EqualTemperament, Scale};
///
/// let scale = EqualTemperament::default();
/// assert_eq!(scale.note_to_log_pitch(69.0), 0.0);
/// assert_eq!(scale.note_to_log_pitch(81.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualTemperament {
    /// Note number that maps to log pitch 0
    pub reference_note: f32,
    /// Notes per octave
    pub divisions: f32,
}

impl EqualTemperament {
    /// Create an equal temperament with `divisions` notes per octave.
    pub fn new(reference_note: f32, divisions: f32) -> Self {
        Self {
            reference_note,
            divisions: divisions.max(f32::MIN_POSITIVE),
        }
    }
}

impl Default for EqualTemperament {
    fn default() -> Self {
        Self::new(69.0, 12.0)
    }
}

impl Scale for EqualTemperament {
    #[inline]
    fn note_to_log_pitch(&self, note: f32) -> f32 {
        (note - self.reference_note) / self.divisions
    }
}

impl<S: Scale + ?Sized> Scale for &S {
    fn note_to_log_pitch(&self, note: f32) -> f32 {
        (**self).note_to_log_pitch(note)
    }
}

/// Convert a log pitch (octaves relative to A440) to frequency in Hz.
#[inline]
pub fn log_pitch_to_freq(log_pitch: f32) -> f32 {
    440.0 * libm::exp2f(log_pitch)
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    log_pitch_to_freq(EqualTemperament::default().note_to_log_pitch(f32::from(note)))
}
