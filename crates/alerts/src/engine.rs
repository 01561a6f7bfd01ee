//! Threshold alert state machine.
//!
//! The engine tracks which [`PriceZone`] the last alert was sent for and only
//! produces a message when a fresh price lands in a different zone, so a
//! price sitting in one band never triggers repeat alerts.

use crate::format::format_alert_message;
use coin_alert_core::{AlertConfig, PricePoint, PriceZone};
use coin_alert_feeds::{FeedError, PriceSource};
use tracing::debug;

/// Alert evaluation for one tracked asset.
pub struct AlertEngine {
    config: AlertConfig,
    source: Box<dyn PriceSource>,
    zone: Option<PriceZone>,
    last_price: Option<f64>,
}

impl AlertEngine {
    /// Bind `source` to the config's pair. Fails if the source cannot serve it.
    pub fn new(config: AlertConfig, mut source: Box<dyn PriceSource>) -> Result<Self, FeedError> {
        source.init(config.currency(), config.asset())?;
        Ok(Self {
            config,
            source,
            zone: None,
            last_price: None,
        })
    }

    /// Start from a known zone instead of unset.
    #[cfg(test)]
    pub fn with_zone(mut self, zone: PriceZone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Zone of the last alert, `None` until the first one.
    pub fn zone(&self) -> Option<PriceZone> {
        self.zone
    }

    /// Last successfully fetched price.
    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Fetch the latest price and return the alerts it triggers.
    ///
    /// The fetch is bounded by the poll interval. On error the zone is left
    /// untouched so the next evaluation starts from the same state.
    pub async fn evaluate(&mut self) -> Result<Vec<String>, FeedError> {
        let timeout = self.config.poll_interval();
        let point = tokio::time::timeout(timeout, self.source.latest_price())
            .await
            .map_err(|_| FeedError::Timeout(timeout))??;

        if !point.price.is_finite() {
            return Err(FeedError::Parse(format!("non-finite price {}", point.price)));
        }

        Ok(self.observe(point).into_iter().collect())
    }

    /// Apply one price observation. Returns the alert message on a zone change.
    pub fn observe(&mut self, point: PricePoint) -> Option<String> {
        self.last_price = Some(point.price);

        let zone = PriceZone::classify(
            point.price,
            self.config.lower_threshold(),
            self.config.upper_threshold(),
        );
        if self.zone == Some(zone) {
            debug!(
                asset = %self.config.asset(),
                zone = %zone,
                price = point.price,
                "Zone unchanged, no alert"
            );
            return None;
        }

        self.zone = Some(zone);
        Some(format_alert_message(&self.config, zone, point.price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coin_alert_core::{Asset, CurrencyUnit};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays a fixed list of prices; `None` entries fail with an HTTP error.
    struct ScriptedSource {
        prices: Mutex<VecDeque<Option<f64>>>,
    }

    impl ScriptedSource {
        fn boxed(prices: &[Option<f64>]) -> Box<dyn PriceSource> {
            Box::new(Self {
                prices: Mutex::new(prices.iter().copied().collect()),
            })
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "Scripted"
        }

        fn init(&mut self, _currency: CurrencyUnit, _asset: Asset) -> Result<(), FeedError> {
            Ok(())
        }

        async fn latest_price(&self) -> Result<PricePoint, FeedError> {
            match self.prices.lock().unwrap().pop_front() {
                Some(Some(price)) => Ok(PricePoint::new(0, price)),
                Some(None) => Err(FeedError::Http("connection reset".into())),
                None => Err(FeedError::EmptySeries),
            }
        }
    }

    /// Never answers.
    struct HangingSource;

    #[async_trait]
    impl PriceSource for HangingSource {
        fn name(&self) -> &'static str {
            "Hanging"
        }

        fn init(&mut self, _currency: CurrencyUnit, _asset: Asset) -> Result<(), FeedError> {
            Ok(())
        }

        async fn latest_price(&self) -> Result<PricePoint, FeedError> {
            std::future::pending().await
        }
    }

    /// Rejects every pair.
    struct NoPairsSource;

    #[async_trait]
    impl PriceSource for NoPairsSource {
        fn name(&self) -> &'static str {
            "NoPairs"
        }

        fn init(&mut self, _currency: CurrencyUnit, asset: Asset) -> Result<(), FeedError> {
            Err(FeedError::UnsupportedAsset {
                source_name: "NoPairs",
                asset,
            })
        }

        async fn latest_price(&self) -> Result<PricePoint, FeedError> {
            Err(FeedError::NotInitialized)
        }
    }

    fn sol_config() -> AlertConfig {
        AlertConfig::new(Asset::Sol, 95.0, 102.0).unwrap()
    }

    fn engine(prices: &[Option<f64>]) -> AlertEngine {
        AlertEngine::new(sol_config(), ScriptedSource::boxed(prices)).unwrap()
    }

    #[tokio::test]
    async fn test_four_transitions_four_messages() {
        let mut engine = engine(&[Some(90.0), Some(98.0), Some(105.0), Some(100.0)]);

        let step1 = engine.evaluate().await.unwrap();
        assert_eq!(step1, vec!["SOL price is < $95 (current price: $90.000)".to_string()]);
        assert_eq!(engine.zone(), Some(PriceZone::Below));

        let step2 = engine.evaluate().await.unwrap();
        assert_eq!(
            step2,
            vec!["SOL price is between $95 and $102 (current price: $98.000)".to_string()]
        );

        let step3 = engine.evaluate().await.unwrap();
        assert_eq!(step3, vec!["SOL price is >= $102 (current price: $105.000)".to_string()]);
        assert_eq!(engine.zone(), Some(PriceZone::Above));

        let step4 = engine.evaluate().await.unwrap();
        assert_eq!(
            step4,
            vec!["SOL price is between $95 and $102 (current price: $100.000)".to_string()]
        );
        assert_eq!(engine.last_price(), Some(100.0));
    }

    #[tokio::test]
    async fn test_stable_price_no_repeat_alerts() {
        let mut engine = engine(&[Some(100.0), Some(100.0), Some(100.0)]).with_zone(PriceZone::Between);

        for _ in 0..3 {
            assert!(engine.evaluate().await.unwrap().is_empty());
        }
        assert_eq!(engine.zone(), Some(PriceZone::Between));
        assert_eq!(engine.last_price(), Some(100.0));
    }

    #[tokio::test]
    async fn test_first_evaluation_always_alerts() {
        let mut engine = engine(&[Some(100.0), Some(101.0)]);
        assert_eq!(engine.zone(), None);
        assert_eq!(engine.evaluate().await.unwrap().len(), 1);
        assert!(engine.evaluate().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_zone_unchanged() {
        let mut engine = engine(&[Some(90.0), None, Some(98.0)]);

        assert_eq!(engine.evaluate().await.unwrap().len(), 1);
        assert_eq!(engine.zone(), Some(PriceZone::Below));

        let err = engine.evaluate().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(engine.zone(), Some(PriceZone::Below));
        assert_eq!(engine.last_price(), Some(90.0));

        let messages = engine.evaluate().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("between"));
        assert_eq!(engine.zone(), Some(PriceZone::Between));
    }

    #[tokio::test]
    async fn test_message_iff_zone_changes() {
        let prices = [
            80.0, 94.9, 95.0, 101.9, 102.0, 150.0, 101.0, 50.0, 50.0, 102.0, 95.0, 94.0,
        ];
        let script: Vec<Option<f64>> = prices.iter().map(|p| Some(*p)).collect();
        let mut engine = engine(&script);

        let mut previous: Option<PriceZone> = None;
        for price in prices {
            let messages = engine.evaluate().await.unwrap();
            let zone = PriceZone::classify(price, 95.0, 102.0);
            let expected = if previous == Some(zone) { 0 } else { 1 };
            assert_eq!(messages.len(), expected, "price {}", price);
            previous = Some(zone);
        }
    }

    #[tokio::test]
    async fn test_boundary_prices() {
        let mut engine = engine(&[Some(102.0), Some(95.0)]);
        engine.evaluate().await.unwrap();
        assert_eq!(engine.zone(), Some(PriceZone::Above));
        engine.evaluate().await.unwrap();
        assert_eq!(engine.zone(), Some(PriceZone::Between));
    }

    #[tokio::test]
    async fn test_non_finite_price_rejected() {
        let mut engine = engine(&[Some(f64::NAN)]);
        assert!(matches!(engine.evaluate().await, Err(FeedError::Parse(_))));
        assert_eq!(engine.zone(), None);
        assert_eq!(engine.last_price(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_bounded_by_poll_interval() {
        let config = AlertConfig::with_options(
            Asset::Sol,
            95.0,
            102.0,
            CurrencyUnit::Usd,
            3,
            Duration::from_secs(60),
        )
        .unwrap();
        let mut engine = AlertEngine::new(config, Box::new(HangingSource)).unwrap();

        let err = engine.evaluate().await.unwrap_err();
        assert!(matches!(err, FeedError::Timeout(d) if d == Duration::from_secs(60)));
        assert_eq!(engine.zone(), None);
    }

    #[test]
    fn test_new_propagates_unsupported_pair() {
        let result = AlertEngine::new(sol_config(), Box::new(NoPairsSource));
        assert!(matches!(result, Err(FeedError::UnsupportedAsset { .. })));
    }
}
