//! Per-session alert configuration.

use crate::{Asset, ConfigError, CurrencyUnit};
use std::time::Duration;

/// Default number of decimals used when displaying prices.
pub const DEFAULT_PRECISION: u32 = 3;
/// Largest accepted display precision.
pub const MAX_PRECISION: u32 = 12;
/// Default interval between price checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Shortest accepted poll interval. It also bounds each price fetch.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Alert settings for one tracked asset.
///
/// Fields are private so a config can only exist in validated form; it is
/// immutable once a tracking session has been started with it.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    asset: Asset,
    lower_threshold: f64,
    upper_threshold: f64,
    currency: CurrencyUnit,
    precision: u32,
    poll_interval: Duration,
}

impl AlertConfig {
    /// Create a config with the default currency, precision and poll interval.
    pub fn new(asset: Asset, lower_threshold: f64, upper_threshold: f64) -> Result<Self, ConfigError> {
        Self::with_options(
            asset,
            lower_threshold,
            upper_threshold,
            CurrencyUnit::default(),
            DEFAULT_PRECISION,
            DEFAULT_POLL_INTERVAL,
        )
    }

    /// Create a fully specified config.
    pub fn with_options(
        asset: Asset,
        lower_threshold: f64,
        upper_threshold: f64,
        currency: CurrencyUnit,
        precision: u32,
        poll_interval: Duration,
    ) -> Result<Self, ConfigError> {
        for threshold in [lower_threshold, upper_threshold] {
            if !threshold.is_finite() {
                return Err(ConfigError::NonFiniteThreshold(threshold));
            }
        }
        if upper_threshold <= lower_threshold {
            return Err(ConfigError::InvalidThresholds {
                lower: lower_threshold,
                upper: upper_threshold,
            });
        }
        if poll_interval < MIN_POLL_INTERVAL {
            return Err(ConfigError::InvalidPollInterval);
        }
        if precision > MAX_PRECISION {
            return Err(ConfigError::PrecisionTooLarge(precision));
        }

        Ok(Self {
            asset,
            lower_threshold,
            upper_threshold,
            currency,
            precision,
            poll_interval,
        })
    }

    pub fn asset(&self) -> Asset {
        self.asset
    }

    pub fn lower_threshold(&self) -> f64 {
        self.lower_threshold
    }

    pub fn upper_threshold(&self) -> f64 {
        self.upper_threshold
    }

    pub fn currency(&self) -> CurrencyUnit {
        self.currency
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
