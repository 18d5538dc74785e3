//! The event-to-signal engine.
//!
//! [`Engine`] owns a fixed pool of [`Voice`]s, the event queue's consumer half
//! and the key-state table. Each call to [`Engine::process`] runs one block:
//!
//! 1. every voice begins the block (cursor rewind, drift scheduling);
//! 2. queued events are drained in FIFO order and dispatched by kind;
//! 3. every voice ends the block, completing all output channels.
//!
//! Nothing in `process` allocates, locks or blocks. Producer contract
//! violations (queue overflow, late timestamps, unknown keys) are counted in
//! [`Diagnostics`] and otherwise absorbed.

use ligature_core::{
    BLOCK_SIZE, EqualTemperament, Event, EventKind, KEY_COUNT, KeyState, KeyStateTable, Scale,
};

use crate::allocator::{VoiceAllocator, VoicePool};
use crate::config::{DEFAULT_MAX_VOICES, EngineConfig};
use crate::queue::{EventReceiver, EventSender, event_queue};
use crate::voice::Voice;

/// Mod wheel controller number.
pub const CC_MOD_WHEEL: u8 = 1;
/// Controller routed to the X channel.
pub const CC_X: u8 = 73;
/// Controller routed to the Y channel.
pub const CC_Y: u8 = 74;
/// All sound off: full engine reset.
pub const CC_ALL_SOUND_OFF: u8 = 120;
/// All notes off: release every voice and key.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Counters for producer contract violations, cumulative since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Events dropped because the queue was full, from either producer.
    /// Calls to [`Engine::add_event`] after the sender was taken are not
    /// counted.
    pub dropped_events: usize,
    /// Events whose time was past the block end and was clamped
    pub clamped_times: usize,
    /// Events naming a key outside `0..KEY_COUNT`, ignored
    pub invalid_keys: usize,
}

impl Diagnostics {
    /// Check whether every counter is zero.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Polyphonic voice allocator and event-to-signal converter.
///
/// # Example
///
/// ```rust
/// use ligature_core::{BLOCK_SIZE, Event};
/// use ligature_voice::{Channel, Engine};
///
/// let mut engine = Engine::new(48000.0, 4);
/// engine.add_event(Event::note_on(16, 60, 0.8));
/// engine.process();
///
/// let gate = engine.voices()[0].output(Channel::Gate);
/// assert_eq!(gate[15], 0.0);
/// assert_eq!(gate[16], 0.8);
/// assert_eq!(gate[BLOCK_SIZE - 1], 0.8);
/// ```
#[derive(Debug)]
pub struct Engine<S: Scale = EqualTemperament> {
    /// Pre-allocated pool; only `..polyphony` receive events
    voices: Vec<Voice>,
    polyphony: usize,
    allocator: VoiceAllocator,
    keys: KeyStateTable,
    scale: S,

    /// Producer half, until handed out by [`Engine::event_sender`]
    sender: Option<EventSender>,
    receiver: EventReceiver,

    sample_rate: f32,
    glide_time: f32,
    drift_amount: f32,
    pitch_bend_semitones: f32,

    clamped_times: usize,
    invalid_keys: usize,
}

impl Engine<EqualTemperament> {
    /// Create an engine with a pool of `max_voices` voices, all active, in
    /// 12-tone equal temperament.
    pub fn new(sample_rate: f32, max_voices: usize) -> Self {
        Self::from_config(
            &EngineConfig::new(sample_rate).with_max_voices(max_voices),
        )
    }

    /// Create an engine from a full configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::from_config_with_scale(config, EqualTemperament::default())
    }
}

impl Default for Engine<EqualTemperament> {
    fn default() -> Self {
        Self::new(48000.0, DEFAULT_MAX_VOICES)
    }
}

impl<S: Scale> Engine<S> {
    /// Create an engine with a custom note-to-pitch mapping.
    pub fn with_scale(sample_rate: f32, max_voices: usize, scale: S) -> Self {
        Self::from_config_with_scale(
            &EngineConfig::new(sample_rate).with_max_voices(max_voices),
            scale,
        )
    }

    /// Create an engine from a configuration and a note-to-pitch mapping.
    ///
    /// A pool capacity of zero is raised to one. Polyphony is clamped to the
    /// capacity.
    pub fn from_config_with_scale(config: &EngineConfig, scale: S) -> Self {
        let capacity = config.max_voices.max(1);
        let glide_time = config.glide_time.max(0.0);
        let drift_amount = config.drift_amount.max(0.0);

        let voices = (0..capacity)
            .map(|i| {
                let mut voice = Voice::new(i, config.sample_rate);
                voice.set_params(glide_time, drift_amount, config.sample_rate);
                voice
            })
            .collect();

        let (sender, receiver) = event_queue(config.queue_capacity);

        let mut allocator = VoiceAllocator::new();
        allocator.set_unison(config.unison);

        let mut engine = Self {
            voices,
            polyphony: capacity,
            allocator,
            keys: KeyStateTable::new(),
            scale,
            sender: Some(sender),
            receiver,
            sample_rate: config.sample_rate,
            glide_time,
            drift_amount,
            pitch_bend_semitones: config.pitch_bend_semitones,
            clamped_times: 0,
            invalid_keys: 0,
        };
        if let Some(polyphony) = config.polyphony {
            engine.set_polyphony(polyphony);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = engine.sample_rate,
            capacity,
            polyphony = engine.polyphony,
            queue_capacity = engine.receiver.capacity(),
            "engine created"
        );

        engine
    }

    /// Set the number of active voices, clamped to `1..=capacity`.
    ///
    /// Resets the engine. Returns the polyphony actually set.
    pub fn set_polyphony(&mut self, polyphony: usize) -> usize {
        self.reset();
        self.polyphony = polyphony.clamp(1, self.voices.len());

        #[cfg(feature = "tracing")]
        tracing::debug!(requested = polyphony, actual = self.polyphony, "set_polyphony");

        self.polyphony
    }

    /// Number of active voices.
    pub fn polyphony(&self) -> usize {
        self.polyphony
    }

    /// Size of the voice pool, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    /// Clear the queue, every voice, the key table and the allocation cursor.
    ///
    /// Unison mode, glide, drift and bend range are kept. Diagnostics
    /// counters are cumulative and survive resets.
    pub fn reset(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(pending = self.receiver.len(), "engine reset");

        self.reset_state();
    }

    /// Reset without logging, for use on the render path.
    fn reset_state(&mut self) {
        self.receiver.clear();
        for voice in &mut self.voices {
            voice.reset();
        }
        self.keys.clear();
        self.allocator.reset();
    }

    /// Clear the queue and zero every voice's age without touching notes.
    pub fn reset_times(&mut self) {
        self.receiver.clear();
        for voice in &mut self.voices {
            voice.reset_time();
        }
        self.allocator.reset_cursor();
    }

    /// Queue `event` for the next [`process`](Self::process) call.
    ///
    /// Returns `false` if the event was dropped, either because the queue is
    /// full or because the producer half has been handed out with
    /// [`event_sender`](Self::event_sender).
    ///
    /// Only a full queue counts toward [`Diagnostics::dropped_events`]. Once
    /// the sender is taken, events belong on that sender and nothing is
    /// recorded here.
    #[inline]
    pub fn add_event(&mut self, event: Event) -> bool {
        self.sender
            .as_mut()
            .is_some_and(|sender| sender.push(event))
    }

    /// Move the producer half of the queue out, for use on another thread.
    ///
    /// Returns `None` if it was already taken. Afterwards
    /// [`add_event`](Self::add_event) always returns `false`.
    pub fn event_sender(&mut self) -> Option<EventSender> {
        let sender = self.sender.take();

        #[cfg(feature = "tracing")]
        tracing::debug!(taken = sender.is_some(), "event_sender");

        sender
    }

    /// Render one block.
    pub fn process(&mut self) {
        for voice in &mut self.voices {
            voice.begin_process(self.sample_rate);
        }

        while let Some(event) = self.receiver.pop() {
            self.dispatch(event);
        }

        for voice in &mut self.voices {
            voice.end_process(self.pitch_bend_semitones, self.sample_rate);
        }
    }

    fn dispatch(&mut self, event: Event) {
        // Pressure is broadcast, so its key is not checked
        let key = match event.kind {
            EventKind::NoteOn { key, .. }
            | EventKind::NoteOff { key }
            | EventKind::NoteRetrig { key, .. } => Some(key),
            _ => None,
        };
        if let Some(key) = key
            && usize::from(key) >= KEY_COUNT
        {
            self.invalid_keys += 1;
            return;
        }

        let time = if event.time > BLOCK_SIZE {
            self.clamped_times += 1;
            BLOCK_SIZE
        } else {
            event.time
        };

        if let EventKind::Controller {
            number: CC_ALL_SOUND_OFF,
            ..
        } = event.kind
        {
            self.reset_state();
            return;
        }

        let mut pool = VoicePool {
            voices: &mut self.voices[..self.polyphony],
            scale: &self.scale,
            sample_rate: self.sample_rate,
        };
        let keys = &mut self.keys;
        let allocator = &mut self.allocator;

        match event.kind {
            EventKind::NoteOn {
                key,
                note,
                velocity,
            } => allocator.note_on(&mut pool, keys, time, key, note, velocity),
            EventKind::NoteRetrig {
                key,
                note,
                velocity,
            } => allocator.note_retrig(&mut pool, keys, time, key, note, velocity),
            EventKind::NoteOff { key } => allocator.note_off(&mut pool, keys, time, key),
            EventKind::Controller { number, value } => match number {
                CC_MOD_WHEEL => pool.voices.iter_mut().for_each(|v| v.set_modulation(value)),
                CC_X => pool.voices.iter_mut().for_each(|v| v.set_x(value)),
                CC_Y => pool.voices.iter_mut().for_each(|v| v.set_y(value)),
                CC_ALL_NOTES_OFF => allocator.all_notes_off(&mut pool, keys, time),
                _ => {}
            },
            EventKind::PitchWheel { value } => {
                pool.voices.iter_mut().for_each(|v| v.set_pitch_bend(value));
            }
            EventKind::NotePressure { value, .. } => {
                pool.voices.iter_mut().for_each(|v| v.set_z(value));
            }
            EventKind::SustainPedal { value } => {
                allocator.sustain_pedal(&mut pool, keys, time, value);
            }
            EventKind::Null => {}
        }
    }

    /// Set the pitch-bend range in semitones for a full wheel deflection.
    pub fn set_pitch_bend_in_semitones(&mut self, semitones: f32) {
        self.pitch_bend_semitones = semitones;

        #[cfg(feature = "tracing")]
        tracing::debug!(semitones, "set_pitch_bend_in_semitones");
    }

    /// Set the pitch glide (portamento) time; negative values are treated as 0.
    pub fn set_glide_time_in_seconds(&mut self, seconds: f32) {
        self.glide_time = seconds.max(0.0);
        self.apply_voice_params();

        #[cfg(feature = "tracing")]
        tracing::debug!(seconds = self.glide_time, "set_glide_time_in_seconds");
    }

    /// Set the drift amount; negative values are treated as 0.
    pub fn set_drift_amount(&mut self, amount: f32) {
        self.drift_amount = amount.max(0.0);
        self.apply_voice_params();

        #[cfg(feature = "tracing")]
        tracing::debug!(amount = self.drift_amount, "set_drift_amount");
    }

    /// Switch unison mode. Takes effect from the next note event.
    pub fn set_unison(&mut self, unison: bool) {
        self.allocator.set_unison(unison);

        #[cfg(feature = "tracing")]
        tracing::debug!(unison, "set_unison");
    }

    /// Change the sample rate; sounding notes are kept and ages are zeroed.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.apply_voice_params();
        self.reset_times();

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, "set_sample_rate");
    }

    fn apply_voice_params(&mut self) {
        for voice in &mut self.voices {
            voice.set_params(self.glide_time, self.drift_amount, self.sample_rate);
        }
    }

    /// Active voices, in pool order.
    pub fn voices(&self) -> &[Voice] {
        &self.voices[..self.polyphony]
    }

    /// Active voice at `index`.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices().get(index)
    }

    /// Number of active voices that own a note.
    pub fn busy_voice_count(&self) -> usize {
        self.voices().iter().filter(|v| !v.is_free()).count()
    }

    /// Voice that answered the latest polyphonic note on.
    pub fn newest_voice(&self) -> Option<usize> {
        self.allocator.newest_voice()
    }

    /// Key-state table entry for `key`.
    pub fn key_state(&self, key: u8) -> Option<&KeyState> {
        self.keys.get(key)
    }

    /// The whole key-state table.
    pub fn key_states(&self) -> &KeyStateTable {
        &self.keys
    }

    /// Events waiting for the next block.
    pub fn pending_events(&self) -> usize {
        self.receiver.len()
    }

    /// Contract-violation counters.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            dropped_events: self.receiver.dropped(),
            clamped_times: self.clamped_times,
            invalid_keys: self.invalid_keys,
        }
    }

    /// Check whether the sustain pedal is down.
    pub fn is_sustain_active(&self) -> bool {
        self.allocator.is_sustain_active()
    }

    /// Check whether unison mode is on.
    pub fn is_unison(&self) -> bool {
        self.allocator.is_unison()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Pitch glide time in seconds.
    pub fn glide_time(&self) -> f32 {
        self.glide_time
    }

    /// Drift amount.
    pub fn drift_amount(&self) -> f32 {
        self.drift_amount
    }

    /// Pitch-bend range in semitones.
    pub fn pitch_bend_semitones(&self) -> f32 {
        self.pitch_bend_semitones
    }

    /// Event queue capacity.
    pub fn queue_capacity(&self) -> usize {
        self.receiver.capacity()
    }

    /// The note-to-pitch mapping.
    pub fn scale(&self) -> &S {
        &self.scale
    }
}
