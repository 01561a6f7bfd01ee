//! Validation errors for alert configuration.

use thiserror::Error;

/// Errors raised while building an [`AlertConfig`](crate::AlertConfig).
/// Nothing is scheduled when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Upper threshold ({upper}) must be greater than lower threshold ({lower})")]
    InvalidThresholds { lower: f64, upper: f64 },

    #[error("Threshold must be a finite number, got {0}")]
    NonFiniteThreshold(f64),

    #[error("Poll interval must be at least {min:?}", min = crate::MIN_POLL_INTERVAL)]
    InvalidPollInterval,

    #[error("Display precision {0} is too large (max {max})", max = crate::MAX_PRECISION)]
    PrecisionTooLarge(u32),

    #[error("Coin type {0} is not supported")]
    UnsupportedAsset(String),

    #[error("Currency unit {0} is not supported")]
    UnsupportedCurrency(String),

    #[error("Invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
}
