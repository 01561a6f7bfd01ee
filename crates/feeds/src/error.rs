//! Error types for price source operations.

use coin_alert_core::{Asset, CurrencyUnit};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while configuring or querying a price source.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{source_name} does not support {asset}")]
    UnsupportedAsset {
        source_name: &'static str,
        asset: Asset,
    },

    #[error("{source_name} does not support currency {currency}")]
    UnsupportedCurrency {
        source_name: &'static str,
        currency: CurrencyUnit,
    },

    #[error("Price source used before init")]
    NotInitialized,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no price data")]
    EmptySeries,

    #[error("Price fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

impl FeedError {
    /// Returns true for fetch failures that the next tick may recover from.
    pub fn is_transient(&self) -> bool {
        !self.is_unsupported()
    }

    /// Returns true if the source can never serve the requested pair.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            FeedError::UnsupportedAsset { .. } | FeedError::UnsupportedCurrency { .. }
        )
    }
}
