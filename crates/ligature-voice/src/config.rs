//! Construction-time engine parameters.

use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Default voice pool capacity.
pub const DEFAULT_MAX_VOICES: usize = 16;

/// Default pitch-bend range in semitones.
pub const DEFAULT_PITCH_BEND_SEMITONES: f32 = 7.0;

/// Everything needed to build an [`Engine`](crate::Engine) in one step.
///
/// # Example
///
/// ```rust
/// use ligature_voice::{Engine, EngineConfig};
///
/// let config = EngineConfig::new(44100.0)
///     .with_max_voices(8)
///     .with_polyphony(4)
///     .with_glide_time(0.05);
/// let engine = Engine::from_config(&config);
/// assert_eq!(engine.polyphony(), 4);
/// assert_eq!(engine.capacity(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Voice pool capacity, fixed for the engine's lifetime
    pub max_voices: usize,
    /// Active voices; `None` uses the whole pool
    pub polyphony: Option<usize>,
    /// Event queue capacity
    pub queue_capacity: usize,
    /// Pitch glide (portamento) time in seconds
    pub glide_time: f32,
    /// Drift amount, 0 disables drift
    pub drift_amount: f32,
    /// Pitch-bend range in semitones
    pub pitch_bend_semitones: f32,
    /// Start in unison mode
    pub unison: bool,
}

impl EngineConfig {
    /// Defaults at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Set the pool capacity.
    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    /// Set the active voice count.
    pub fn with_polyphony(mut self, polyphony: usize) -> Self {
        self.polyphony = Some(polyphony);
        self
    }

    /// Set the event queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the pitch glide time in seconds.
    pub fn with_glide_time(mut self, seconds: f32) -> Self {
        self.glide_time = seconds;
        self
    }

    /// Set the drift amount.
    pub fn with_drift_amount(mut self, amount: f32) -> Self {
        self.drift_amount = amount;
        self
    }

    /// Set the pitch-bend range in semitones.
    pub fn with_pitch_bend_semitones(mut self, semitones: f32) -> Self {
        self.pitch_bend_semitones = semitones;
        self
    }

    /// Set unison mode.
    pub fn with_unison(mut self, unison: bool) -> Self {
        self.unison = unison;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_voices: DEFAULT_MAX_VOICES,
            polyphony: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            glide_time: 0.0,
            drift_amount: 0.0,
            pitch_bend_semitones: DEFAULT_PITCH_BEND_SEMITONES,
            unison: false,
        }
    }
}
