//! Ligature Voice - polyphonic voice allocation and event-to-signal conversion
//!
//! This crate turns a stream of timestamped performance events (notes,
//! controllers, pitch wheel, pressure, sustain pedal) into per-sample control
//! signals for a bank of synthesizer voices. Downstream synthesis reads one
//! block of [`Channel`] outputs per voice per [`Engine::process`] call.
//!
//! # Core Components
//!
//! - [`Engine`] - Owns the voice pool, drains the event queue, dispatches events
//! - [`Voice`] - Per-sample writer for one voice's output channels
//! - [`VoiceAllocator`] - Round-robin allocation, nearest-key stealing, unison and sustain
//! - [`event_queue`] / [`EventSender`] / [`EventReceiver`] - Lock-free SPSC event queue
//! - [`EngineConfig`] - Construction-time parameters
//!
//! # Output Channels
//!
//! | Channel | Contents |
//! |---------|----------|
//! | `Gate` | Held velocity, 0 when released |
//! | `Pitch` | Log pitch in octaves from A440, with bend and drift |
//! | `ElapsedTime` | Seconds since the note started |
//! | `Mod`, `X`, `Y` | Controllers 1, 73, 74 |
//! | `Z` | Pressure |
//! | `VoiceIndex` | Constant pool index |
//!
//! # Example
//!
//! ```rust
//! use ligature_core::Event;
//! use ligature_voice::{Channel, Engine};
//!
//! let mut engine = Engine::new(48000.0, 4);
//! engine.add_event(Event::note_on(0, 60, 1.0));
//! engine.add_event(Event::note_on(0, 64, 1.0));
//! engine.add_event(Event::note_off(32, 60));
//! engine.process();
//!
//! let first = engine.voices()[0].output(Channel::Gate);
//! assert_eq!(first[31], 1.0);
//! assert_eq!(first[32], 0.0);
//! assert_eq!(engine.voices()[1].owner(), Some(64));
//! ```
//!
//! # Threading
//!
//! [`Engine::process`] runs on the render thread and never allocates, locks
//! or blocks. Events can be produced on another thread by taking the
//! producer half with [`Engine::event_sender`].
//!
//! # Logging
//!
//! With the `tracing` feature, control-path operations (construction,
//! resets, parameter changes) emit `tracing` debug events. The render path
//! never logs.

pub mod allocator;
pub mod config;
pub mod engine;
pub mod queue;
pub mod voice;

pub use allocator::{VoiceAllocator, VoicePool};
pub use config::{DEFAULT_MAX_VOICES, DEFAULT_PITCH_BEND_SEMITONES, EngineConfig};
pub use engine::{
    CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_MOD_WHEEL, CC_X, CC_Y, Diagnostics, Engine,
};
pub use queue::{DEFAULT_QUEUE_CAPACITY, EventReceiver, EventSender, event_queue};
pub use voice::{
    CHANNEL_COUNT, CONTROLLER_GLIDE_SECONDS, Channel, DRIFT_SCALE, DRIFT_TIME_SECONDS,
    NoteCommand, Voice,
};
