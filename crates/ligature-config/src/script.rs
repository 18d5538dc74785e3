//! Event script file format.
//!
//! A script is a list of timestamped events addressed by block number and
//! sample offset within the block. Scripts drive the engine offline, which is
//! how the CLI renders and how signal behavior is reproduced from a file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use ligature_core::{BLOCK_SIZE, Event, EventKind, KEY_COUNT};

use crate::error::{ConfigError, write_with_parents};
use crate::validation::{ValidationError, ValidationResult};

/// One script entry.
///
/// Which optional fields are required depends on `type`:
///
/// | `type` | Fields |
/// |--------|--------|
/// | `note_on`, `note_retrig` | `key`, optional `note` (defaults to `key`), optional `velocity` (defaults to 1) |
/// | `note_off` | `key` |
/// | `controller` | `number`, `value` |
/// | `pitch_wheel` | `value` in `[-1, 1]` |
/// | `note_pressure` | `key`, `value` |
/// | `sustain_pedal` | `value` |
/// | `null` | none |
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptEvent {
    /// Block in which the event is queued.
    #[serde(default)]
    pub block: usize,

    /// Sample offset within the block.
    #[serde(default)]
    pub time: usize,

    /// Event type name.
    #[serde(rename = "type")]
    pub kind: String,

    /// Key number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<u32>,

    /// Note value for the scale; defaults to the key number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<f32>,

    /// Note velocity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f32>,

    /// Controller number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,

    /// Controller, wheel, pressure or pedal value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
}

/// An engine event paired with the block it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    /// Block in which the event is queued
    pub block: usize,
    /// The event, with its time inside the block
    pub event: Event,
}

/// A TOML event script.
///
/// # TOML Format
///
/// ```toml
/// name = "stolen voice"
///
/// [[events]]
/// type = "note_on"
/// key = 60
/// velocity = 0.8
///
/// [[events]]
/// block = 2
/// time = 32
/// type = "note_off"
/// key = 60
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventScript {
    /// Optional script name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Events, in the order they are queued.
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl ScriptEvent {
    /// Script entry for `event` in `block`.
    pub fn from_event(block: usize, event: &Event) -> Self {
        let mut entry = Self {
            block,
            time: event.time,
            kind: event.kind.name().to_string(),
            key: None,
            note: None,
            velocity: None,
            number: None,
            value: None,
        };
        match event.kind {
            EventKind::NoteOn {
                key,
                note,
                velocity,
            }
            | EventKind::NoteRetrig {
                key,
                note,
                velocity,
            } => {
                entry.key = Some(u32::from(key));
                if note != f32::from(key) {
                    entry.note = Some(note);
                }
                entry.velocity = Some(velocity);
            }
            EventKind::NoteOff { key } => entry.key = Some(u32::from(key)),
            EventKind::Controller { number, value } => {
                entry.number = Some(u32::from(number));
                entry.value = Some(value);
            }
            EventKind::NotePressure { key, value } => {
                entry.key = Some(u32::from(key));
                entry.value = Some(value);
            }
            EventKind::PitchWheel { value } | EventKind::SustainPedal { value } => {
                entry.value = Some(value);
            }
            EventKind::Null => {}
        }
        entry
    }

    /// Convert to an engine event; `index` is used in error messages.
    pub fn to_event(&self, index: usize) -> ValidationResult<Event> {
        let mut errors = Vec::new();
        let check = FieldCheck { index };

        if self.time > BLOCK_SIZE {
            errors.push(check.out_of_range("time", self.time as f64, 0.0, BLOCK_SIZE as f64));
        }

        let kind = match self.kind.as_str() {
            "note_on" | "note_retrig" => {
                let key = check.key(self, &mut errors);
                let velocity = check.unit(self.velocity.unwrap_or(1.0), "velocity", &mut errors);
                let note = self.note.unwrap_or(f32::from(key));
                if self.kind == "note_on" {
                    EventKind::NoteOn {
                        key,
                        note,
                        velocity,
                    }
                } else {
                    EventKind::NoteRetrig {
                        key,
                        note,
                        velocity,
                    }
                }
            }
            "note_off" => EventKind::NoteOff {
                key: check.key(self, &mut errors),
            },
            "controller" => {
                let number = match self.number {
                    Some(n) if n <= 127 => n as u8,
                    Some(n) => {
                        errors.push(check.out_of_range("number", f64::from(n), 0.0, 127.0));
                        0
                    }
                    None => {
                        errors.push(check.missing(&self.kind, "number"));
                        0
                    }
                };
                let value = check.required_unit(self, &mut errors);
                EventKind::Controller { number, value }
            }
            "pitch_wheel" => {
                let value = check.required(self, &mut errors);
                if !(-1.0..=1.0).contains(&value) {
                    errors.push(check.out_of_range("value", f64::from(value), -1.0, 1.0));
                }
                EventKind::PitchWheel { value }
            }
            "note_pressure" => {
                let key = check.key(self, &mut errors);
                let value = check.required_unit(self, &mut errors);
                EventKind::NotePressure { key, value }
            }
            "sustain_pedal" => EventKind::SustainPedal {
                value: check.required_unit(self, &mut errors),
            },
            "null" => EventKind::Null,
            other => {
                errors.push(ValidationError::UnknownEventType {
                    index,
                    name: other.to_string(),
                });
                EventKind::Null
            }
        };

        ValidationError::collect(errors)?;
        Ok(Event::new(self.time, kind))
    }
}

/// Error builders for one script entry.
struct FieldCheck {
    index: usize,
}

impl FieldCheck {
    fn missing(&self, kind: &str, field: &'static str) -> ValidationError {
        ValidationError::MissingField {
            index: self.index,
            kind: kind.to_string(),
            field,
        }
    }

    fn out_of_range(&self, field: &'static str, value: f64, min: f64, max: f64) -> ValidationError {
        ValidationError::FieldOutOfRange {
            index: self.index,
            field,
            value,
            min,
            max,
        }
    }

    fn key(&self, entry: &ScriptEvent, errors: &mut Vec<ValidationError>) -> u8 {
        match entry.key {
            Some(key) if (key as usize) < KEY_COUNT => key as u8,
            Some(key) => {
                errors.push(self.out_of_range(
                    "key",
                    f64::from(key),
                    0.0,
                    (KEY_COUNT - 1) as f64,
                ));
                0
            }
            None => {
                errors.push(self.missing(&entry.kind, "key"));
                0
            }
        }
    }

    fn required(&self, entry: &ScriptEvent, errors: &mut Vec<ValidationError>) -> f32 {
        entry.value.unwrap_or_else(|| {
            errors.push(self.missing(&entry.kind, "value"));
            0.0
        })
    }

    fn required_unit(&self, entry: &ScriptEvent, errors: &mut Vec<ValidationError>) -> f32 {
        let value = self.required(entry, errors);
        self.unit(value, "value", errors)
    }

    fn unit(&self, value: f32, field: &'static str, errors: &mut Vec<ValidationError>) -> f32 {
        if !(0.0..=1.0).contains(&value) {
            errors.push(self.out_of_range(field, f64::from(value), 0.0, 1.0));
        }
        value
    }
}

impl EventScript {
    /// Build a script from scheduled events.
    pub fn from_events(events: impl IntoIterator<Item = ScheduledEvent>) -> Self {
        Self {
            name: None,
            events: events
                .into_iter()
                .map(|s| ScriptEvent::from_event(s.block, &s.event))
                .collect(),
        }
    }

    /// Load a script from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a script from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the script to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_toml()?)
    }

    /// Render the script as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the script has no entries.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Blocks needed to reach the last scripted event.
    pub fn block_count(&self) -> usize {
        self.events.iter().map(|e| e.block + 1).max().unwrap_or(0)
    }

    /// Check every entry; all problems are reported together.
    pub fn validate(&self) -> ValidationResult<()> {
        self.to_schedule().map(|_| ())
    }

    /// Convert every entry, stably sorted by block.
    ///
    /// Entries in the same block keep their file order, which is the order
    /// the engine will process them in.
    pub fn to_schedule(&self) -> ValidationResult<Vec<ScheduledEvent>> {
        let mut errors = Vec::new();
        let mut schedule = Vec::with_capacity(self.events.len());

        for (index, entry) in self.events.iter().enumerate() {
            match entry.to_event(index) {
                Ok(event) => schedule.push(ScheduledEvent {
                    block: entry.block,
                    event,
                }),
                Err(ValidationError::Multiple(mut many)) => errors.append(&mut many),
                Err(err) => errors.push(err),
            }
        }

        ValidationError::collect(errors)?;
        schedule.sort_by_key(|s| s.block);
        Ok(schedule)
    }
}
