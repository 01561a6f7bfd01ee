//! Binance REST ticker source.

use crate::{FeedError, PriceSource};
use async_trait::async_trait;
use coin_alert_core::{Asset, CurrencyUnit, PricePoint};
use serde::Deserialize;
use tracing::debug;

/// `{"symbol":"SOLUSDT","price":"95.12000000"}`
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Binance spot ticker price source. USD prices are read from USDT pairs.
pub struct BinanceSource {
    client: reqwest::Client,
    base_url: String,
    symbol: Option<String>,
}

impl BinanceSource {
    pub const BASE_URL: &'static str = "https://api.binance.com";

    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), Self::BASE_URL)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            symbol: None,
        }
    }

    /// Binance market symbol for a pair, if listed.
    pub fn market_symbol(currency: CurrencyUnit, asset: Asset) -> Option<String> {
        match currency {
            CurrencyUnit::Usd => Some(format!("{}USDT", asset.ticker())),
            _ => None,
        }
    }

    /// Parse a ticker price body. Binance does not timestamp this endpoint,
    /// so the point is stamped with the local clock.
    pub fn parse_ticker(body: &str) -> Result<PricePoint, FeedError> {
        let ticker: TickerPrice = serde_json::from_str(body)?;
        let price = ticker
            .price
            .parse::<f64>()
            .map_err(|_| FeedError::Parse(format!("invalid price {:?}", ticker.price)))?;
        Ok(PricePoint::now(price))
    }
}

impl Default for BinanceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn name(&self) -> &'static str {
        "Binance"
    }

    fn init(&mut self, currency: CurrencyUnit, asset: Asset) -> Result<(), FeedError> {
        let symbol = Self::market_symbol(currency, asset).ok_or(FeedError::UnsupportedCurrency {
            source_name: self.name(),
            currency,
        })?;
        self.symbol = Some(symbol);
        Ok(())
    }

    async fn latest_price(&self) -> Result<PricePoint, FeedError> {
        let symbol = self.symbol.as_deref().ok_or(FeedError::NotInitialized)?;
        let url = format!(
            "{}/api/v3/ticker/price",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        if !response.status().is_success() {
            debug!("Binance: ticker HTTP {} for {}", response.status(), symbol);
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        Self::parse_ticker(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_symbol() {
        assert_eq!(
            BinanceSource::market_symbol(CurrencyUnit::Usd, Asset::Sol).as_deref(),
            Some("SOLUSDT")
        );
        assert_eq!(BinanceSource::market_symbol(CurrencyUnit::Idr, Asset::Sol), None);
    }

    #[test]
    fn test_init_rejects_currency() {
        let mut source = BinanceSource::new();
        let err = source.init(CurrencyUnit::Eur, Asset::Sui).unwrap_err();
        assert!(err.is_unsupported());
        assert!(source.init(CurrencyUnit::Usd, Asset::Sui).is_ok());
        assert_eq!(source.symbol.as_deref(), Some("SUIUSDT"));
    }

    #[test]
    fn test_parse_ticker() {
        let point = BinanceSource::parse_ticker(r#"{"symbol":"SOLUSDT","price":"95.12000000"}"#)
            .unwrap();
        assert_eq!(point.price, 95.12);
    }

    #[test]
    fn test_parse_ticker_invalid_price() {
        assert!(matches!(
            BinanceSource::parse_ticker(r#"{"symbol":"SOLUSDT","price":"abc"}"#),
            Err(FeedError::Parse(_))
        ));
    }
}
