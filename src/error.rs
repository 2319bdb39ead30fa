//! Error types for record validation.
//!
//! Records are checked structurally before they enter a store. The checks
//! here are deliberately shallow: they reject values no store could hold
//! meaningfully (empty keys, NaN quantities) and leave domain rules to the
//! stores' dependency resolution.

use thiserror::Error;

/// Validation errors raised by [`Record::validate`](crate::record::Record::validate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A key-like field is empty or whitespace.
    #[error("Field '{field}' cannot be empty")]
    EmptyKey {
        /// Offending field.
        field: String,
    },

    /// A numeric field is NaN or infinite.
    #[error("Field '{field}' must be a finite number")]
    NonFiniteValue {
        /// Offending field.
        field: String,
    },

    /// A quantity that must be non-negative is below zero.
    #[error("Field '{field}' must not be negative (got {value})")]
    NegativeValue {
        /// Offending field.
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// An agent share outside the unit interval.
    #[error("Agent share {value} is out of range [0.0, 1.0]")]
    ShareOutOfRange {
        /// The rejected share.
        value: f64,
    },
}

/// Reject empty or whitespace-only key-like fields.
pub(crate) fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyKey {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_message_names_field() {
        let err = ValidationError::EmptyKey {
            field: "region".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("region"));
        assert!(msg.contains("cannot be empty"));
    }

    #[test]
    fn test_validate_non_empty_rejects_whitespace() {
        assert!(validate_non_empty("name", "R1").is_ok());
        assert_eq!(
            validate_non_empty("name", "   "),
            Err(ValidationError::EmptyKey {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("heat_rate", 0.0).is_ok());
        assert!(matches!(
            validate_non_negative("heat_rate", -1.5),
            Err(ValidationError::NegativeValue { value, .. }) if value == -1.5
        ));
        assert!(matches!(
            validate_non_negative("heat_rate", f64::NAN),
            Err(ValidationError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_share_out_of_range_message() {
        let err = ValidationError::ShareOutOfRange { value: 1.5 };
        assert!(err.to_string().contains("1.5"));
    }
}
