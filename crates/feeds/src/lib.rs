//! Price sources for the coin alert bot.
//!
//! Every provider implements [`PriceSource`]; the scheduler builds one source
//! per tracking session through a [`SourceFactory`].
//!
//! ## Providers
//!
//! - `coingecko` - public 24h price chart, any supported currency
//! - `binance` - spot ticker price, USD (USDT pairs) only
//! - `simulated` - offline sine-wave prices for dry runs

pub mod binance;
pub mod coingecko;
pub mod error;
pub mod simulated;
pub mod source;

pub use binance::BinanceSource;
pub use coingecko::CoinGeckoSource;
pub use error::*;
pub use simulated::SimulatedSource;
pub use source::*;
