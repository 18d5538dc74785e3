//! Configuration and event scripts for the ligature voice engine.
//!
//! # Features
//!
//! - **Engine settings**: sample rate, pool size, polyphony, glide, drift,
//!   bend range, unison and tuning, stored as TOML
//! - **Event scripts**: timestamped note and controller events addressed by
//!   block, for offline rendering and reproducible tests
//! - **Validation**: range checks that report every problem at once
//!
//! # Example
//!
//! ```rust
//! use ligature_config::{EngineSettings, EventScript};
//!
//! let settings = EngineSettings::from_toml("max_voices = 4\nglide_time = 0.02").unwrap();
//! let mut engine = settings.build_engine().unwrap();
//!
//! let script = EventScript::from_toml(
//!     r#"
//!     [[events]]
//!     type = "note_on"
//!     key = 60
//!     "#,
//! )
//! .unwrap();
//!
//! for scheduled in script.to_schedule().unwrap() {
//!     engine.add_event(scheduled.event);
//! }
//! engine.process();
//! assert_eq!(engine.busy_voice_count(), 1);
//! ```

mod error;
mod script;
mod settings;

/// Range and shape checks for settings and scripts.
pub mod validation;

pub use error::ConfigError;
pub use script::{EventScript, ScheduledEvent, ScriptEvent};
pub use settings::{EngineSettings, MAX_VOICES_LIMIT, TuningSettings};
pub use validation::{ValidationError, ValidationResult};
