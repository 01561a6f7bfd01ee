//! Alert message formatting.

use coin_alert_core::{AlertConfig, Asset, CurrencyUnit, PriceZone};

/// Format a price with the currency symbol and a fixed number of decimals.
pub fn format_price(price: f64, currency: CurrencyUnit, precision: u32) -> String {
    format!(
        "{}{:.*}",
        currency.display_symbol(),
        precision as usize,
        price
    )
}

/// Format a threshold with the currency symbol, in its shortest form.
pub fn format_threshold(threshold: f64, currency: CurrencyUnit) -> String {
    format!("{}{}", currency.display_symbol(), threshold)
}

/// Format the alert sent when a price enters `zone`.
///
/// - above: `SOL price is >= $102 (current price: $105.000)`
/// - below: `SOL price is < $95 (current price: $90.000)`
/// - between: `SOL price is between $95 and $102 (current price: $98.000)`
pub fn format_alert_message(config: &AlertConfig, zone: PriceZone, price: f64) -> String {
    let currency = config.currency();
    let ticker = config.asset().ticker();
    let lower = format_threshold(config.lower_threshold(), currency);
    let upper = format_threshold(config.upper_threshold(), currency);
    let current = format_price(price, currency, config.precision());

    match zone {
        PriceZone::Above => format!("{} price is >= {} (current price: {})", ticker, upper, current),
        PriceZone::Below => format!("{} price is < {} (current price: {})", ticker, lower, current),
        PriceZone::Between => format!(
            "{} price is between {} and {} (current price: {})",
            ticker, lower, upper, current
        ),
    }
}

/// One `/list` line: `SOL: $100.000`, or `SOL: -` before the first price.
pub fn format_summary_line(
    asset: Asset,
    last_price: Option<f64>,
    currency: CurrencyUnit,
    precision: u32,
) -> String {
    match last_price {
        Some(price) => format!("{}: {}", asset.ticker(), format_price(price, currency, precision)),
        None => format!("{}: -", asset.ticker()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_alert_core::DEFAULT_POLL_INTERVAL;
    use pretty_assertions::assert_eq;

    fn sol_config() -> AlertConfig {
        AlertConfig::new(Asset::Sol, 95.0, 102.0).unwrap()
    }

    /// Pull every number following a currency symbol out of a message.
    fn numbers_after(message: &str, symbol: &str) -> Vec<f64> {
        message
            .split(symbol)
            .skip(1)
            .map(|rest| {
                rest.chars()
                    .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect::<String>()
            })
            .map(|s| s.parse::<f64>().unwrap())
            .collect()
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(98.0, CurrencyUnit::Usd, 3), "$98.000");
        assert_eq!(format_price(1234.5678, CurrencyUnit::Idr, 2), "Rp1234.57");
        assert_eq!(format_price(7.6, CurrencyUnit::Usd, 0), "$8");
    }

    #[test]
    fn test_format_threshold_shortest_form() {
        assert_eq!(format_threshold(102.0, CurrencyUnit::Usd), "$102");
        assert_eq!(format_threshold(95.5, CurrencyUnit::Eur), "€95.5");
    }

    #[test]
    fn test_above_message() {
        let msg = format_alert_message(&sol_config(), PriceZone::Above, 105.0);
        assert_eq!(msg, "SOL price is >= $102 (current price: $105.000)");
    }

    #[test]
    fn test_below_message() {
        let msg = format_alert_message(&sol_config(), PriceZone::Below, 90.0);
        assert_eq!(msg, "SOL price is < $95 (current price: $90.000)");
    }

    #[test]
    fn test_between_message() {
        let msg = format_alert_message(&sol_config(), PriceZone::Between, 98.0);
        assert_eq!(msg, "SOL price is between $95 and $102 (current price: $98.000)");
    }

    #[test]
    fn test_unknown_symbol_uses_default() {
        let config = AlertConfig::with_options(
            Asset::Sui,
            0.00001,
            0.00002,
            CurrencyUnit::Btc,
            8,
            DEFAULT_POLL_INTERVAL,
        )
        .unwrap();
        let msg = format_alert_message(&config, PriceZone::Above, 0.000025);
        assert_eq!(msg, "SUI price is >= $0.00002 (current price: $0.00002500)");
    }

    #[test]
    fn test_numbers_recoverable_from_message() {
        let config = AlertConfig::with_options(
            Asset::Sol,
            95.25,
            102.75,
            CurrencyUnit::Usd,
            3,
            DEFAULT_POLL_INTERVAL,
        )
        .unwrap();
        let price = 98.123456;
        let msg = format_alert_message(&config, PriceZone::Between, price);

        let numbers = numbers_after(&msg, "$");
        assert_eq!(numbers.len(), 3);
        assert_eq!(numbers[0], 95.25);
        assert_eq!(numbers[1], 102.75);
        assert!((numbers[2] - price).abs() <= 0.5e-3);
    }

    #[test]
    fn test_summary_line() {
        assert_eq!(
            format_summary_line(Asset::Sol, Some(100.0), CurrencyUnit::Usd, 3),
            "SOL: $100.000"
        );
        assert_eq!(
            format_summary_line(Asset::Sui, None, CurrencyUnit::Usd, 3),
            "SUI: -"
        );
    }
}
