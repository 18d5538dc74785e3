//! Linear glide for click-free control signals.
//!
//! A [`Glide`] converts a stepped target value into a continuous ramp. When the
//! target changes, the glide computes a constant per-sample increment that
//! reaches the new target after exactly `glide_samples` samples.
//!
//! The same primitive serves two rates:
//!
//! - **Sample rate**: call [`Glide::next_sample`] once per sample with the
//!   currently held target (pitch portamento).
//! - **Block rate**: call [`Glide::process_block`] once per block; the target is
//!   constant across the block and the ramp is written sample by sample
//!   (pitch bend, mod wheel, pressure).
//!
//! ## Usage
//!
//! ```rust
//! use ligature_core::Glide;
//!
//! let mut glide = Glide::with_time(0.0, 48000.0, 0.01); // 10 ms ramp
//!
//! let mut block = [0.0f32; 64];
//! glide.process_block(1.0, &mut block);
//! assert!(block[63] < 1.0); // still ramping after 64 samples
//! ```

/// Linear ramp toward a target over a fixed number of samples.
///
/// A glide time of zero samples makes every target change take effect on the
/// next sample.
#[derive(Debug, Clone)]
pub struct Glide {
    /// Current output value
    current: f32,
    /// Value the ramp is heading toward
    target: f32,
    /// Increment per sample (can be positive or negative)
    step: f32,
    /// Samples remaining until target reached
    samples_remaining: u32,
    /// Ramp length applied on the next target change
    glide_samples: u32,
}

impl Glide {
    /// Create a glide resting at `initial` with no ramp time.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            glide_samples: 0,
        }
    }

    /// Create a glide with its ramp time given in seconds.
    pub fn with_time(initial: f32, sample_rate: f32, seconds: f32) -> Self {
        let mut glide = Self::new(initial);
        glide.set_glide_time(sample_rate, seconds);
        glide
    }

    /// Set the ramp time in seconds at the given sample rate.
    ///
    /// Takes effect on the next target change; a ramp already in progress
    /// keeps its slope.
    pub fn set_glide_time(&mut self, sample_rate: f32, seconds: f32) {
        let samples = libm::roundf((sample_rate * seconds).max(0.0));
        self.set_glide_samples(samples as u32);
    }

    /// Set the ramp time directly in samples.
    pub fn set_glide_samples(&mut self, samples: u32) {
        self.glide_samples = samples;
    }

    /// Ramp length in samples.
    pub fn glide_samples(&self) -> u32 {
        self.glide_samples
    }

    /// Jump to `value` immediately, cancelling any ramp.
    pub fn set_value(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    /// Advance one sample toward `target` and return the new output.
    #[inline]
    pub fn next_sample(&mut self, target: f32) -> f32 {
        if target != self.target {
            self.retarget(target);
        }
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current = self.target; // Snap to exact target
            }
        }
        self.current
    }

    /// Fill `out` with the ramp toward `target`, one value per sample.
    #[inline]
    pub fn process_block(&mut self, target: f32, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(target);
        }
    }

    /// Current output value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Check if the ramp has finished.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_remaining == 0
    }

    fn retarget(&mut self, target: f32) {
        self.target = target;
        if self.glide_samples == 0 {
            self.current = target;
            self.step = 0.0;
            self.samples_remaining = 0;
        } else {
            // The first step is taken by the same call, so `glide_samples`
            // calls land exactly on the target.
            self.step = (target - self.current) / self.glide_samples as f32;
            self.samples_remaining = self.glide_samples;
        }
    }
}

impl Default for Glide {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_time_jumps_on_next_sample() {
        let mut glide = Glide::new(0.0);
        let out = glide.next_sample(0.75);
        assert_eq!(out, 0.75, "zero glide time should jump");
        assert!(glide.is_settled());
    }

    #[test]
    fn reaches_target_in_exact_samples() {
        let mut glide = Glide::new(0.0);
        glide.set_glide_samples(100);

        for _ in 0..99 {
            glide.next_sample(1.0);
        }
        assert!(!glide.is_settled(), "should still ramp before 100 samples");

        let out = glide.next_sample(1.0);
        assert_eq!(out, 1.0, "should land exactly on target");
        assert!(glide.is_settled());
    }

    #[test]
    fn ramp_is_linear() {
        let mut glide = Glide::with_time(0.0, 1000.0, 0.1); // 100 samples
        let mut block = [0.0f32; 50];
        glide.process_block(2.0, &mut block);

        assert!(
            (block[49] - 1.0).abs() < 1e-4,
            "should be halfway after half the ramp, got {}",
            block[49]
        );
        let first_step = block[1] - block[0];
        let last_step = block[49] - block[48];
        assert!(
            (first_step - last_step).abs() < 1e-5,
            "steps should be constant: {first_step} vs {last_step}"
        );
    }

    #[test]
    fn retarget_mid_ramp_starts_from_current() {
        let mut glide = Glide::new(0.0);
        glide.set_glide_samples(10);
        for _ in 0..5 {
            glide.next_sample(1.0);
        }
        let midway = glide.get();

        let next = glide.next_sample(0.0);
        assert!(next < midway, "ramp should reverse from {midway}, got {next}");
        for _ in 0..9 {
            glide.next_sample(0.0);
        }
        assert_eq!(glide.get(), 0.0);
    }

    #[test]
    fn set_value_cancels_ramp() {
        let mut glide = Glide::new(0.0);
        glide.set_glide_samples(1000);
        glide.next_sample(1.0);
        glide.set_value(0.25);

        assert_eq!(glide.get(), 0.25);
        assert!(glide.is_settled());
        assert_eq!(glide.next_sample(0.25), 0.25);
    }
}
