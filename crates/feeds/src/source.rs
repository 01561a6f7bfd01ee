//! Price source capability shared by every data provider.

use crate::{BinanceSource, CoinGeckoSource, FeedError, SimulatedSource};
use async_trait::async_trait;
use coin_alert_core::{Asset, CurrencyUnit, PricePoint};
use serde::Deserialize;
use std::sync::Arc;

/// Trait for price data providers.
///
/// A source is bound to one (currency, asset) pair by [`PriceSource::init`]
/// and must be initialized before [`PriceSource::latest_price`] is called.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Provider name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Bind the source to a pair. Fails if the provider cannot serve it.
    fn init(&mut self, currency: CurrencyUnit, asset: Asset) -> Result<(), FeedError>;

    /// Fetch the most recent price for the bound pair.
    async fn latest_price(&self) -> Result<PricePoint, FeedError>;
}

/// Builds a fresh, uninitialized source for each tracking session.
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn PriceSource> + Send + Sync>;

/// Available price providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    CoinGecko,
    Binance,
    Simulated,
}

/// Create a factory for the given provider.
///
/// `base_url` overrides the provider's default endpoint and is ignored by
/// the simulated source. All sources built by one factory share one HTTP
/// client.
pub fn source_factory(kind: SourceKind, base_url: Option<String>) -> SourceFactory {
    let client = reqwest::Client::new();
    match kind {
        SourceKind::CoinGecko => Arc::new(move || -> Box<dyn PriceSource> {
            let base_url = base_url
                .clone()
                .unwrap_or_else(|| CoinGeckoSource::BASE_URL.to_string());
            Box::new(CoinGeckoSource::with_client(client.clone(), base_url))
        }),
        SourceKind::Binance => Arc::new(move || -> Box<dyn PriceSource> {
            let base_url = base_url
                .clone()
                .unwrap_or_else(|| BinanceSource::BASE_URL.to_string());
            Box::new(BinanceSource::with_client(client.clone(), base_url))
        }),
        SourceKind::Simulated => Arc::new(|| -> Box<dyn PriceSource> { Box::new(SimulatedSource::new()) }),
    }
}
