//! Core data types for the coin alert bot.

pub mod asset;
pub mod config;
pub mod currency;
pub mod error;
pub mod price;

pub use asset::*;
pub use config::*;
pub use currency::*;
pub use error::*;
pub use price::*;
