//! Tracked asset definitions.

use serde::{Deserialize, Serialize};

/// Crypto asset that can be tracked for price alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    /// Solana
    Sol,
    /// Sui
    Sui,
}

impl Asset {
    /// Every supported asset, in display order.
    pub const ALL: [Asset; 2] = [Asset::Sol, Asset::Sui];

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sol" => Some(Asset::Sol),
            "sui" => Some(Asset::Sui),
            _ => None,
        }
    }

    /// Lower-case identifier used in commands and URLs.
    pub fn id(self) -> &'static str {
        match self {
            Asset::Sol => "sol",
            Asset::Sui => "sui",
        }
    }

    /// Upper-case ticker used in alert messages.
    pub fn ticker(self) -> &'static str {
        match self {
            Asset::Sol => "SOL",
            Asset::Sui => "SUI",
        }
    }

    /// Comma-separated list of supported asset ids, for help texts.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|a| a.id())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ticker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Asset::from_str("sol"), Some(Asset::Sol));
        assert_eq!(Asset::from_str("SUI"), Some(Asset::Sui));
        assert_eq!(Asset::from_str(" Sol "), Some(Asset::Sol));
        assert_eq!(Asset::from_str("btc"), None);
        assert_eq!(Asset::from_str(""), None);
    }

    #[test]
    fn test_id_and_ticker() {
        assert_eq!(Asset::Sol.id(), "sol");
        assert_eq!(Asset::Sol.ticker(), "SOL");
        assert_eq!(Asset::Sui.id(), "sui");
        assert_eq!(format!("{}", Asset::Sui), "SUI");
    }

    #[test]
    fn test_supported_list() {
        assert_eq!(Asset::supported_list(), "sol, sui");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Asset::Sol).unwrap();
        assert_eq!(json, "\"sol\"");
        let parsed: Asset = serde_json::from_str("\"sui\"").unwrap();
        assert_eq!(parsed, Asset::Sui);
    }
}
