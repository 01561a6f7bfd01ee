//! Currency units prices are quoted in.

use serde::{Deserialize, Serialize};

/// Symbol used when a currency unit has no known display symbol.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Currency a tracked price is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    /// US Dollar
    #[default]
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Bitcoin (quoted as a cross rate)
    Btc,
}

impl CurrencyUnit {
    /// Every supported currency unit, in display order.
    pub const ALL: [CurrencyUnit; 4] = [
        CurrencyUnit::Usd,
        CurrencyUnit::Idr,
        CurrencyUnit::Eur,
        CurrencyUnit::Btc,
    ];

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Some(CurrencyUnit::Usd),
            "idr" => Some(CurrencyUnit::Idr),
            "eur" => Some(CurrencyUnit::Eur),
            "btc" => Some(CurrencyUnit::Btc),
            _ => None,
        }
    }

    /// Lower-case code used in commands and provider URLs.
    pub fn code(self) -> &'static str {
        match self {
            CurrencyUnit::Usd => "usd",
            CurrencyUnit::Idr => "idr",
            CurrencyUnit::Eur => "eur",
            CurrencyUnit::Btc => "btc",
        }
    }

    /// Known display symbol, if any.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            CurrencyUnit::Usd => Some("$"),
            CurrencyUnit::Idr => Some("Rp"),
            CurrencyUnit::Eur => Some("€"),
            CurrencyUnit::Btc => None,
        }
    }

    /// Display symbol, falling back to [`DEFAULT_CURRENCY_SYMBOL`].
    pub fn display_symbol(self) -> &'static str {
        self.symbol().unwrap_or(DEFAULT_CURRENCY_SYMBOL)
    }

    /// Comma-separated list of supported codes, for help texts.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.code())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code().to_uppercase())
    }
}
