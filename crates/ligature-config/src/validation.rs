//! Range and shape checks for settings and scripts.
//!
//! Validation collects every problem it finds instead of stopping at the
//! first, so a hand-edited file can be fixed in one pass.
//!
//! # Example
//!
//! ```rust
//! use ligature_config::{EngineSettings, ValidationError};
//!
//! let mut settings = EngineSettings::default();
//! settings.glide_time = -1.0;
//! settings.max_voices = 0;
//!
//! match settings.validate() {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
//!     other => panic!("expected two errors, got {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Setting value out of range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the setting.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Script entry with an unrecognized `type`.
    #[error("event {index}: unknown event type '{name}'")]
    UnknownEventType {
        /// Position of the entry in the script.
        index: usize,
        /// The unrecognized type name.
        name: String,
    },

    /// Script entry missing a field its type requires.
    #[error("event {index}: '{kind}' requires field '{field}'")]
    MissingField {
        /// Position of the entry in the script.
        index: usize,
        /// Event type name.
        kind: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Script entry field out of range.
    #[error("event {index}: '{field}' value {value} out of range [{min}, {max}]")]
    FieldOutOfRange {
        /// Position of the entry in the script.
        index: usize,
        /// Name of the field.
        field: &'static str,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    /// Fold a list of errors: none is `Ok`, one is itself, more are `Multiple`.
    pub fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }

    /// Number of individual problems this error stands for.
    pub fn count(&self) -> usize {
        match self {
            ValidationError::Multiple(errors) => errors.iter().map(Self::count).sum(),
            _ => 1,
        }
    }
}

/// Push an [`OutOfRange`](ValidationError::OutOfRange) error unless
/// `min <= value <= max`. NaN is always out of range.
pub(crate) fn check_range(
    errors: &mut Vec<ValidationError>,
    param: &str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !(min..=max).contains(&value) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_folds_by_count() {
        assert_eq!(ValidationError::collect(Vec::new()), Ok(()));

        let one = ValidationError::UnknownEventType {
            index: 0,
            name: "x".to_string(),
        };
        assert_eq!(
            ValidationError::collect(vec![one.clone()]),
            Err(one.clone())
        );

        let many = ValidationError::collect(vec![one.clone(), one]);
        assert!(matches!(many, Err(ValidationError::Multiple(ref v)) if v.len() == 2));
        assert_eq!(many.unwrap_err().count(), 2);
    }

    #[test]
    fn nan_is_out_of_range() {
        let mut errors = Vec::new();
        check_range(&mut errors, "glide_time", f64::NAN, 0.0, 10.0);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::MissingField {
                index: 1,
                kind: "note_on".to_string(),
                field: "key",
            },
            ValidationError::OutOfRange {
                param: "max_voices".to_string(),
                value: 0.0,
                min: 1.0,
                max: 256.0,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: event 1: 'note_on' requires field 'key'; \
             'max_voices' value 0 out of range [1, 256]"
        );
    }
}
