//! Price observations and zone classification.

use serde::{Deserialize, Serialize};

/// Latest price reported by a price source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Timestamp in milliseconds, as reported by the source
    pub timestamp_ms: u64,
    /// Price in the session's currency unit
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: u64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }

    /// Create a point stamped with the current wall-clock time.
    pub fn now(price: f64) -> Self {
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self::new(timestamp_ms, price)
    }
}

/// Position of a price relative to the `[lower, upper)` alert band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceZone {
    /// price < lower
    Below,
    /// lower <= price < upper
    Between,
    /// price >= upper
    Above,
}

impl PriceZone {
    /// Classify a price. The lower bound is inclusive for `Between`,
    /// the upper bound is inclusive for `Above`.
    pub fn classify(price: f64, lower: f64, upper: f64) -> Self {
        if price >= upper {
            PriceZone::Above
        } else if price < lower {
            PriceZone::Below
        } else {
            PriceZone::Between
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceZone::Below => "below",
            PriceZone::Between => "between",
            PriceZone::Above => "above",
        }
    }
}

impl std::fmt::Display for PriceZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
