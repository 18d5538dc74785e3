//! A single polyphonic voice and its sample-accurate signal writer.
//!
//! A [`Voice`] turns note boundaries into per-sample control signals for one
//! block at a time. Events can land on any sample inside the block. The writer
//! keeps a frame cursor (`next_frame`): every note change first fills the
//! frames between the cursor and the event time with the *previously* held
//! state, then commits the new state. [`Voice::end_process`] fills whatever
//! is left of the block, so every frame of every channel is written exactly
//! once per block.
//!
//! ```text
//!   frame:   0 1 2 3 4 5 6 7 ... 63
//!   gate:    a a a a b b b b ... b      NoteOn(b) at time 4
//!   gate:    a a a 0 b b b b ... b      Retrigger(b) at time 4
//!   gate:    a a a a 0 0 0 0 ... 0      NoteOff at time 4
//! ```
//!
//! Pitch is glided per sample toward the held pitch. Pitch bend, drift and
//! the continuous modulation channels are glided at block rate in
//! [`Voice::end_process`], and bend and drift are summed into the pitch
//! channel.

use ligature_core::{BLOCK_SIZE, DriftScheduler, Glide, Scale};

/// Number of output channels per voice.
pub const CHANNEL_COUNT: usize = 8;

/// Glide time for pitch bend and the continuous modulation channels, in seconds.
pub const CONTROLLER_GLIDE_SECONDS: f32 = 0.01;

/// Mean interval between drift changes, also the drift glide time, in seconds.
pub const DRIFT_TIME_SECONDS: f32 = 2.0;

/// Log-pitch offset produced by a drift value of 1.0 at drift amount 1.0.
pub const DRIFT_SCALE: f32 = 0.004;

/// Per-sample output channels of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Held velocity, 0 when the note is off
    Gate,
    /// Log pitch including bend and drift
    Pitch,
    /// Seconds since the last note start
    ElapsedTime,
    /// Mod wheel (controller 1)
    Mod,
    /// Controller 73
    X,
    /// Controller 74
    Y,
    /// Pressure
    Z,
    /// Constant index of the voice in the pool
    VoiceIndex,
}

impl Channel {
    /// All channels in output order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Gate,
        Channel::Pitch,
        Channel::ElapsedTime,
        Channel::Mod,
        Channel::X,
        Channel::Y,
        Channel::Z,
        Channel::VoiceIndex,
    ];

    /// Row of this channel in the voice's output buffer.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase channel name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Gate => "gate",
            Channel::Pitch => "pitch",
            Channel::ElapsedTime => "elapsed",
            Channel::Mod => "mod",
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Z => "z",
            Channel::VoiceIndex => "voice",
        }
    }

    /// Parse a channel from its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// A note-level change delivered to a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteCommand {
    /// Start a note; the gate moves straight to the new velocity.
    On {
        /// Owning key
        key: u8,
        /// Note value for the scale
        note: f32,
        /// New gate level
        velocity: f32,
    },
    /// Restart a sounding voice with a one-sample gate drop before the new note.
    Retrigger {
        /// Owning key
        key: u8,
        /// Note value for the scale
        note: f32,
        /// New gate level
        velocity: f32,
    },
    /// Release the note; pitch keeps gliding toward the last note.
    Off,
}

/// One polyphonic slot.
///
/// Owns its glides, age counter, drift scheduler and a block of output
/// frames for each [`Channel`].
#[derive(Debug, Clone)]
pub struct Voice {
    /// Position in the pool, written to the voice-index channel
    index: usize,
    /// Key that started the sounding note, `None` when free
    owner: Option<u8>,

    // Held state
    pitch: f32,
    velocity: f32,
    pitch_bend: f32,
    modulation: f32,
    x: f32,
    y: f32,
    z: f32,

    /// Samples since the last note start
    age_in_samples: u32,
    /// 1 once a note has started, 0 after reset
    age_step: u32,
    /// First frame of the current block not yet written
    next_frame: usize,

    pitch_glide: Glide,
    bend_glide: Glide,
    mod_glide: Glide,
    x_glide: Glide,
    y_glide: Glide,
    z_glide: Glide,
    drift_glide: Glide,

    drift: DriftScheduler,
    drift_amount: f32,

    outputs: [[f32; BLOCK_SIZE]; CHANNEL_COUNT],
}

impl Voice {
    /// Create the voice at pool position `index`.
    pub fn new(index: usize, sample_rate: f32) -> Self {
        let mut voice = Self {
            index,
            owner: None,
            pitch: 0.0,
            velocity: 0.0,
            pitch_bend: 0.0,
            modulation: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            age_in_samples: 0,
            age_step: 0,
            next_frame: 0,
            pitch_glide: Glide::default(),
            bend_glide: Glide::default(),
            mod_glide: Glide::default(),
            x_glide: Glide::default(),
            y_glide: Glide::default(),
            z_glide: Glide::default(),
            drift_glide: Glide::default(),
            drift: DriftScheduler::for_voice(index),
            drift_amount: 0.0,
            outputs: [[0.0; BLOCK_SIZE]; CHANNEL_COUNT],
        };
        voice.set_params(0.0, 0.0, sample_rate);
        voice.reset();
        voice
    }

    /// Apply glide time, drift amount and sample rate to the voice's glides.
    pub fn set_params(&mut self, pitch_glide_seconds: f32, drift_amount: f32, sample_rate: f32) {
        self.pitch_glide
            .set_glide_time(sample_rate, pitch_glide_seconds);

        for glide in [
            &mut self.bend_glide,
            &mut self.mod_glide,
            &mut self.x_glide,
            &mut self.y_glide,
            &mut self.z_glide,
        ] {
            glide.set_glide_time(sample_rate, CONTROLLER_GLIDE_SECONDS);
        }

        self.drift_glide
            .set_glide_time(sample_rate, DRIFT_TIME_SECONDS);
        self.drift_amount = drift_amount;
    }

    /// Return to the idle state: free, silent, all glides at rest.
    pub fn reset(&mut self) {
        self.owner = None;
        self.next_frame = 0;
        self.age_in_samples = 0;
        self.age_step = 0;

        self.pitch = 0.0;
        self.velocity = 0.0;
        self.pitch_bend = 0.0;
        self.modulation = 0.0;
        self.x = 0.0;
        self.y = 0.0;
        self.z = 0.0;

        for glide in [
            &mut self.pitch_glide,
            &mut self.bend_glide,
            &mut self.mod_glide,
            &mut self.x_glide,
            &mut self.y_glide,
            &mut self.z_glide,
            &mut self.drift_glide,
        ] {
            glide.set_value(0.0);
        }
        self.drift.reset(self.index);

        for row in &mut self.outputs {
            row.fill(0.0);
        }
        self.outputs[Channel::VoiceIndex.index()].fill(self.index as f32);
    }

    /// Zero the age counter without touching note state.
    pub fn reset_time(&mut self) {
        self.age_in_samples = 0;
    }

    /// Start a block: rewind the frame cursor and advance the drift schedule.
    pub fn begin_process(&mut self, sample_rate: f32) {
        self.next_frame = 0;
        self.drift
            .advance(BLOCK_SIZE, sample_rate, DRIFT_TIME_SECONDS);
    }

    /// Write held state up to `time`, then apply `command` at `time`.
    ///
    /// `time` is clamped to `[0, BLOCK_SIZE]`. Frames already written in this
    /// block are never rewritten, except that a retrigger arriving after the
    /// block is full drops the gate of the last frame.
    pub fn write_note_event<S: Scale + ?Sized>(
        &mut self,
        time: usize,
        command: NoteCommand,
        scale: &S,
        sample_rate: f32,
    ) {
        let dest = time.min(BLOCK_SIZE);

        match command {
            NoteCommand::On {
                key,
                note,
                velocity,
            } => {
                self.fill_to(dest, sample_rate);
                self.start_note(key, scale.note_to_log_pitch(note), velocity);
            }
            NoteCommand::Retrigger {
                key,
                note,
                velocity,
            } => {
                // Room for the one-frame gate drop before the new note
                let dest = dest.max(self.next_frame + 1).clamp(1, BLOCK_SIZE);
                let pulse = dest - 1;

                self.fill_to(pulse, sample_rate);
                if pulse >= self.next_frame {
                    self.write_frame(pulse, 0.0, sample_rate);
                    self.next_frame = dest;
                } else {
                    self.outputs[Channel::Gate.index()][pulse] = 0.0;
                }
                self.start_note(key, scale.note_to_log_pitch(note), velocity);
            }
            NoteCommand::Off => {
                self.fill_to(dest, sample_rate);
                self.owner = None;
                self.velocity = 0.0;
            }
        }
    }

    /// Finish the block.
    ///
    /// Fills the remaining frames with held state, runs the block-rate glides
    /// and adds pitch bend (scaled by `pitch_bend_semitones`) and drift to the
    /// pitch channel.
    pub fn end_process(&mut self, pitch_bend_semitones: f32, sample_rate: f32) {
        self.fill_to(BLOCK_SIZE, sample_rate);

        self.mod_glide
            .process_block(self.modulation, &mut self.outputs[Channel::Mod.index()]);
        self.x_glide
            .process_block(self.x, &mut self.outputs[Channel::X.index()]);
        self.y_glide
            .process_block(self.y, &mut self.outputs[Channel::Y.index()]);
        self.z_glide
            .process_block(self.z, &mut self.outputs[Channel::Z.index()]);

        let bend_scale = pitch_bend_semitones / 12.0;
        let drift_scale = self.drift_amount * DRIFT_SCALE;
        let drift_target = self.drift.value();
        for pitch in &mut self.outputs[Channel::Pitch.index()] {
            let bend = self.bend_glide.next_sample(self.pitch_bend);
            let drift = self.drift_glide.next_sample(drift_target);
            *pitch += bend * bend_scale + drift * drift_scale;
        }
    }

    /// Output frames of `channel` for the current block.
    #[inline]
    pub fn output(&self, channel: Channel) -> &[f32; BLOCK_SIZE] {
        &self.outputs[channel.index()]
    }

    /// All output rows, indexed by [`Channel::index`].
    pub fn outputs(&self) -> &[[f32; BLOCK_SIZE]; CHANNEL_COUNT] {
        &self.outputs
    }

    /// Position of this voice in the pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Key that owns the sounding note, `None` when the voice is free.
    #[inline]
    pub fn owner(&self) -> Option<u8> {
        self.owner
    }

    /// Check whether the voice can take a new note without stealing.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Held log pitch, before glide, bend and drift.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Held gate level.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Samples since the last note start.
    pub fn age_in_samples(&self) -> u32 {
        self.age_in_samples
    }

    /// Frames written so far in the current block.
    pub fn frames_processed(&self) -> usize {
        self.next_frame
    }

    /// Set the held pitch-bend position (bipolar).
    pub fn set_pitch_bend(&mut self, value: f32) {
        self.pitch_bend = value;
    }

    /// Set the held mod-wheel value.
    pub fn set_modulation(&mut self, value: f32) {
        self.modulation = value;
    }

    /// Set the held X value.
    pub fn set_x(&mut self, value: f32) {
        self.x = value;
    }

    /// Set the held Y value.
    pub fn set_y(&mut self, value: f32) {
        self.y = value;
    }

    /// Set the held Z (pressure) value.
    pub fn set_z(&mut self, value: f32) {
        self.z = value;
    }

    fn start_note(&mut self, key: u8, log_pitch: f32, velocity: f32) {
        self.owner = Some(key);
        self.pitch = log_pitch;
        self.velocity = velocity;
        self.age_in_samples = 0;
        self.age_step = 1;
    }

    /// Write held state into frames `next_frame..end`; the cursor never moves back.
    #[inline]
    fn fill_to(&mut self, end: usize, sample_rate: f32) {
        let end = end.min(BLOCK_SIZE);
        for t in self.next_frame..end {
            self.write_frame(t, self.velocity, sample_rate);
        }
        self.next_frame = self.next_frame.max(end);
    }

    #[inline]
    fn write_frame(&mut self, t: usize, gate: f32, sample_rate: f32) {
        self.outputs[Channel::Gate.index()][t] = gate;
        self.outputs[Channel::Pitch.index()][t] = self.pitch_glide.next_sample(self.pitch);
        self.age_in_samples = self.age_in_samples.saturating_add(self.age_step);
        self.outputs[Channel::ElapsedTime.index()][t] =
            age_in_seconds(self.age_in_samples, sample_rate);
    }
}

/// Convert an age in samples to seconds, computed in double precision.
#[inline]
fn age_in_seconds(age: u32, sample_rate: f32) -> f32 {
    (f64::from(age) / f64::from(sample_rate)) as f32
}
