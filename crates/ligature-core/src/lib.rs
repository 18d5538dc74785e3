//! Ligature Core - control-signal primitives for polyphonic voice engines
//!
//! This crate provides the leaf building blocks that the voice engine in
//! `ligature-voice` is assembled from. Everything here is allocation-free and
//! safe to call from a real-time audio thread.
//!
//! # Core Abstractions
//!
//! ## Glides
//!
//! - [`Glide`] - Linear ramp toward a target, usable per sample or per block
//!
//! ## Drift
//!
//! - [`DriftSource`] - Deterministic pseudo-random source in `[-1, 1)`
//! - [`DriftScheduler`] - Re-samples a drift value at randomized intervals
//!
//! ## Performance State
//!
//! - [`Event`] / [`EventKind`] - Normalized, timestamped control events
//! - [`KeyStateTable`] - Logical state and press order of every physical key
//!
//! ## Pitch
//!
//! - [`Scale`] - Note-to-log-pitch mapping
//! - [`EqualTemperament`] - Default 12-TET mapping, A440 at log-pitch 0
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ligature-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod drift;
pub mod event;
pub mod glide;
pub mod key_state;
pub mod scale;

pub use drift::{DriftScheduler, DriftSource};
pub use event::{Event, EventKind};
pub use glide::Glide;
pub use key_state::{KeyState, KeyStateTable, KeyStatus};
pub use scale::{EqualTemperament, Scale, log_pitch_to_freq, midi_to_freq};

/// Number of samples in one processing block.
///
/// Every voice writes exactly this many frames per channel per block.
pub const BLOCK_SIZE: usize = 64;

/// Number of physical keys tracked by the [`KeyStateTable`] (keys `0..=127`).
pub const KEY_COUNT: usize = 128;
