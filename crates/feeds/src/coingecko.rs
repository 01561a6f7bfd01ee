//! CoinGecko price chart source.
//!
//! Reads the public 24h price chart and reports its most recent point.

use crate::{FeedError, PriceSource};
use async_trait::async_trait;
use coin_alert_core::{Asset, CurrencyUnit, PricePoint};
use serde::Deserialize;
use tracing::debug;

/// 24h chart payload: `{"stats": [[timestamp_ms, price], ...], "total_volumes": [...]}`
#[derive(Debug, Deserialize)]
struct ChartResponse {
    stats: Vec<(f64, f64)>,
}

/// CoinGecko chart-endpoint price source.
pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
    url: Option<String>,
}

impl CoinGeckoSource {
    pub const BASE_URL: &'static str = "https://www.coingecko.com/price_charts";

    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), Self::BASE_URL)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            url: None,
        }
    }

    /// CoinGecko's internal coin id for an asset.
    pub fn coin_id(asset: Asset) -> Option<&'static str> {
        match asset {
            Asset::Sol => Some("4128"),
            Asset::Sui => Some("26375"),
        }
    }

    /// Chart URL for a pair.
    pub fn chart_url(base_url: &str, coin_id: &str, currency: CurrencyUnit) -> String {
        format!(
            "{}/{}/{}/24_hours.json",
            base_url.trim_end_matches('/'),
            coin_id,
            currency.code()
        )
    }

    /// Extract the latest point from a chart response body.
    pub fn parse_latest(body: &str) -> Result<PricePoint, FeedError> {
        let chart: ChartResponse = serde_json::from_str(body)?;
        let (timestamp, price) = chart.stats.last().copied().ok_or(FeedError::EmptySeries)?;
        if !price.is_finite() {
            return Err(FeedError::Parse(format!("non-finite price {}", price)));
        }
        Ok(PricePoint::new(timestamp as u64, price))
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &'static str {
        "CoinGecko"
    }

    fn init(&mut self, currency: CurrencyUnit, asset: Asset) -> Result<(), FeedError> {
        let coin_id = Self::coin_id(asset).ok_or(FeedError::UnsupportedAsset {
            source_name: self.name(),
            asset,
        })?;
        self.url = Some(Self::chart_url(&self.base_url, coin_id, currency));
        Ok(())
    }

    async fn latest_price(&self) -> Result<PricePoint, FeedError> {
        let url = self.url.as_deref().ok_or(FeedError::NotInitialized)?;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            debug!("CoinGecko: chart HTTP {}", response.status());
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        Self::parse_latest(&body)
    }
}
