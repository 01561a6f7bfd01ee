//! Offline price source for dry runs (demo mode).

use crate::{FeedError, PriceSource};
use async_trait::async_trait;
use coin_alert_core::{Asset, CurrencyUnit, PricePoint};
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces a slow sine-wave drift around a per-asset base price.
pub struct SimulatedSource {
    base_price: Option<f64>,
    counter: AtomicU64,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            base_price: None,
            counter: AtomicU64::new(0),
        }
    }

    /// Rough USD base price per asset.
    fn base_usd(asset: Asset) -> f64 {
        match asset {
            Asset::Sol => 100.0,
            Asset::Sui => 1.5,
        }
    }

    /// Approximate units of `currency` per USD.
    fn usd_rate(currency: CurrencyUnit) -> f64 {
        match currency {
            CurrencyUnit::Usd => 1.0,
            CurrencyUnit::Idr => 15_500.0,
            CurrencyUnit::Eur => 0.92,
            CurrencyUnit::Btc => 0.000_015,
        }
    }

    /// Price for the n-th sample: +/-8% swing over roughly 60 samples.
    fn sample(base: f64, n: u64) -> f64 {
        base * (1.0 + (n as f64 * 0.1).sin() * 0.08)
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "Simulated"
    }

    fn init(&mut self, currency: CurrencyUnit, asset: Asset) -> Result<(), FeedError> {
        self.base_price = Some(Self::base_usd(asset) * Self::usd_rate(currency));
        self.counter.store(0, Ordering::Relaxed);
        Ok(())
    }

    async fn latest_price(&self) -> Result<PricePoint, FeedError> {
        let base = self.base_price.ok_or(FeedError::NotInitialized)?;
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(PricePoint::now(Self::sample(base, n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_sample_is_base_price() {
        let mut source = SimulatedSource::new();
        source.init(CurrencyUnit::Usd, Asset::Sol).unwrap();
        let point = source.latest_price().await.unwrap();
        assert_eq!(point.price, 100.0);
    }

    #[tokio::test]
    async fn test_samples_stay_within_band() {
        let mut source = SimulatedSource::new();
        source.init(CurrencyUnit::Usd, Asset::Sol).unwrap();
        for _ in 0..200 {
            let price = source.latest_price().await.unwrap().price;
            assert!((92.0..=108.0).contains(&price), "price {} out of band", price);
        }
    }

    #[tokio::test]
    async fn test_currency_scales_base() {
        let mut source = SimulatedSource::new();
        source.init(CurrencyUnit::Idr, Asset::Sui).unwrap();
        let point = source.latest_price().await.unwrap();
        assert!((point.price - 1.5 * 15_500.0).abs() < 1e-6);
    }
}
