//! Per-voice pitch drift.
//!
//! Analog oscillators wander slightly off pitch. Each voice owns a
//! [`DriftScheduler`] that picks a new random drift target at irregular
//! intervals, giving every voice an uncorrelated, slow pitch wander. The
//! voice smooths the stepped value through a [`Glide`](crate::Glide) before
//! adding it to its pitch output.
//!
//! The interval between changes is `base_interval * (1 + |r|)` for a fresh
//! random `r`, so the wander never settles into a regular rhythm.

/// Deterministic pseudo-random source producing values in `[-1, 1)`.
///
/// A 32-bit linear congruential generator whose upper mantissa bits are
/// reinterpreted as a float in `[1, 2)` and rescaled. The sequence depends
/// only on the seed, so a reset engine replays the same drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftSource {
    seed: u32,
}

impl DriftSource {
    /// Create a source with an explicit seed.
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Create the source for the voice at `index`.
    ///
    /// Seeds are spread so neighbouring voices produce unrelated sequences.
    pub fn for_voice(index: usize) -> Self {
        Self::new((index as u32).wrapping_mul(232))
    }

    /// Restart the sequence from `seed`.
    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Next value in `[-1, 1)`.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(0x0019_660D).wrapping_add(0x3C6E_F35F);
        let bits = ((self.seed >> 9) & 0x007F_FFFF) | 0x3F80_0000;
        f32::from_bits(bits) * 2.0 - 3.0
    }
}

/// Block-rate scheduler for a voice's drift target.
#[derive(Debug, Clone)]
pub struct DriftScheduler {
    source: DriftSource,
    /// Samples elapsed since the last change
    counter: u32,
    /// Samples until the next change
    next_change: u32,
    /// Current stepped drift value in `[-1, 1)`
    value: f32,
}

impl DriftScheduler {
    /// Create a scheduler for the voice at `index`.
    ///
    /// The first call to [`advance`](Self::advance) picks a drift value.
    pub fn for_voice(index: usize) -> Self {
        Self {
            source: DriftSource::for_voice(index),
            counter: 0,
            next_change: 0,
            value: 0.0,
        }
    }

    /// Return to the freshly constructed state for voice `index`.
    pub fn reset(&mut self, index: usize) {
        *self = Self::for_voice(index);
    }

    /// Account for `frames` elapsed samples and re-sample the drift value
    /// when the current interval has run out.
    ///
    /// `base_interval_seconds` is the mean time between changes.
    pub fn advance(&mut self, frames: usize, sample_rate: f32, base_interval_seconds: f32) {
        self.counter = self.counter.saturating_add(frames as u32);
        if self.counter >= self.next_change {
            self.value = self.source.next_value();
            let interval_mul = 1.0 + libm::fabsf(self.source.next_value());
            self.counter = 0;
            self.next_change = (sample_rate * interval_mul * base_interval_seconds) as u32;
        }
    }

    /// Current drift value in `[-1, 1)`.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Samples until the next change.
    pub fn samples_until_change(&self) -> u32 {
        self.next_change.saturating_sub(self.counter)
    }
}
