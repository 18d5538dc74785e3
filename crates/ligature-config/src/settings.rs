//! Engine settings file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use ligature_core::EqualTemperament;
use ligature_voice::{
    DEFAULT_MAX_VOICES, DEFAULT_PITCH_BEND_SEMITONES, DEFAULT_QUEUE_CAPACITY, Engine, EngineConfig,
};

use crate::error::{ConfigError, write_with_parents};
use crate::validation::{ValidationError, ValidationResult, check_range};

/// Largest voice pool a settings file may request.
pub const MAX_VOICES_LIMIT: usize = 256;

/// Persistent engine settings.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// max_voices = 16
/// polyphony = 8
/// queue_capacity = 128
/// glide_time = 0.05
/// drift_amount = 0.5
/// pitch_bend_semitones = 2.0
/// unison = false
///
/// [tuning]
/// reference_note = 69.0
/// divisions = 12.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Sample rate in Hz.
    pub sample_rate: u32,

    /// Voice pool capacity.
    pub max_voices: usize,

    /// Active voices; the whole pool when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyphony: Option<usize>,

    /// Event queue capacity.
    pub queue_capacity: usize,

    /// Pitch glide time in seconds.
    pub glide_time: f32,

    /// Drift amount, 0 disables drift.
    pub drift_amount: f32,

    /// Pitch-bend range in semitones.
    pub pitch_bend_semitones: f32,

    /// Start in unison mode.
    pub unison: bool,

    /// Equal-temperament tuning.
    pub tuning: TuningSettings,
}

/// Equal-temperament tuning section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TuningSettings {
    /// Note number at A440.
    pub reference_note: f32,
    /// Notes per octave.
    pub divisions: f32,
}

impl Default for TuningSettings {
    fn default() -> Self {
        let scale = EqualTemperament::default();
        Self {
            reference_note: scale.reference_note,
            divisions: scale.divisions,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            max_voices: DEFAULT_MAX_VOICES,
            polyphony: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            glide_time: 0.0,
            drift_amount: 0.0,
            pitch_bend_semitones: DEFAULT_PITCH_BEND_SEMITONES,
            unison: false,
            tuning: TuningSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_toml()?)
    }

    /// Render the settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        check_range(
            &mut errors,
            "sample_rate",
            f64::from(self.sample_rate),
            8000.0,
            384_000.0,
        );
        check_range(
            &mut errors,
            "max_voices",
            self.max_voices as f64,
            1.0,
            MAX_VOICES_LIMIT as f64,
        );
        if let Some(polyphony) = self.polyphony {
            check_range(
                &mut errors,
                "polyphony",
                polyphony as f64,
                1.0,
                self.max_voices.max(1) as f64,
            );
        }
        check_range(
            &mut errors,
            "queue_capacity",
            self.queue_capacity as f64,
            1.0,
            65536.0,
        );
        check_range(&mut errors, "glide_time", f64::from(self.glide_time), 0.0, 10.0);
        check_range(&mut errors, "drift_amount", f64::from(self.drift_amount), 0.0, 10.0);
        check_range(
            &mut errors,
            "pitch_bend_semitones",
            f64::from(self.pitch_bend_semitones),
            0.0,
            48.0,
        );
        check_range(
            &mut errors,
            "tuning.reference_note",
            f64::from(self.tuning.reference_note),
            0.0,
            127.0,
        );
        check_range(
            &mut errors,
            "tuning.divisions",
            f64::from(self.tuning.divisions),
            1.0,
            1200.0,
        );

        ValidationError::collect(errors)
    }

    /// Engine construction parameters.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: self.sample_rate as f32,
            max_voices: self.max_voices,
            polyphony: self.polyphony,
            queue_capacity: self.queue_capacity,
            glide_time: self.glide_time,
            drift_amount: self.drift_amount,
            pitch_bend_semitones: self.pitch_bend_semitones,
            unison: self.unison,
        }
    }

    /// The configured tuning.
    pub fn scale(&self) -> EqualTemperament {
        EqualTemperament::new(self.tuning.reference_note, self.tuning.divisions)
    }

    /// Validate, then build an engine from these settings.
    pub fn build_engine(&self) -> Result<Engine<EqualTemperament>, ConfigError> {
        self.validate()?;
        Ok(Engine::from_config_with_scale(
            &self.engine_config(),
            self.scale(),
        ))
    }
}
