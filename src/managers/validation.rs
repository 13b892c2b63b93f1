//! Form checks that run before any store call.

use crate::locale;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", locale::field_required(.0))]
    Required(&'static str),
    #[error("{}", locale::field_below_minimum(.field, *.min))]
    BelowMinimum { field: &'static str, min: i64 },
    /// The create-user form reports every missing field with one message.
    #[error("{}", locale::MISSING_FIELDS)]
    MissingFields,
    #[error("{}", locale::UNKNOWN_STATUS)]
    UnknownStatus,
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub fn at_least(field: &'static str, value: i64, min: i64) -> Result<(), ValidationError> {
    if value < min {
        Err(ValidationError::BelowMinimum { field, min })
    } else {
        Ok(())
    }
}

/// Empty strings from form inputs are stored as null.
pub fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
