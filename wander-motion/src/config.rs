//! Configuration errors and the validation helpers strategy configs share.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a strategy cannot be built from its configuration.
///
/// These surface at construction time only; a running strategy never fails.
#[derive(Debug, Error)]
pub enum MotionConfigError {
    #[error("unknown strategy type `{0}`")]
    UnknownStrategy(String),
    #[error("invalid strategy parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("{field} must be greater than zero (got {value:.4})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be at least {min:.4} (got {value:.4})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.4} and {max:.4} (got {value:.4})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} range invalid (min {min:.4} > max {max:.4})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

/// Inclusive range a pause length is drawn from, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseWindow {
    pub min: f64,
    pub max: f64,
}

impl PauseWindow {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub(crate) fn validate(&self, field: &'static str) -> Result<(), MotionConfigError> {
        finite(field, self.min)?;
        finite(field, self.max)?;
        at_least(field, self.min, 0.0)?;
        if self.min > self.max {
            return Err(MotionConfigError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<(), MotionConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MotionConfigError::NonFinite { field })
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), MotionConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(MotionConfigError::NonPositive { field, value })
    }
}

pub(crate) fn at_least(field: &'static str, value: f64, min: f64) -> Result<(), MotionConfigError> {
    finite(field, value)?;
    if value >= min {
        Ok(())
    } else {
        Err(MotionConfigError::MinViolation { field, min, value })
    }
}

pub(crate) fn within(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), MotionConfigError> {
    finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(MotionConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}
