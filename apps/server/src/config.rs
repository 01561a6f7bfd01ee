//! Application configuration.

use coin_alert_alerts::{AlertDefaults, SchedulerConfig};
use coin_alert_core::{DEFAULT_PRECISION, MAX_PRECISION, MIN_POLL_INTERVAL};
use coin_alert_feeds::SourceKind;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Price provider.
    pub source: SourceKind,
    /// Override for the CoinGecko chart endpoint.
    pub coingecko_base_url: Option<String>,
    /// Override for the Binance REST endpoint.
    pub binance_base_url: Option<String>,
    /// Scheduler settings.
    pub scheduler: SchedulerSettings,
    /// Defaults for new alerts.
    pub defaults: DefaultSettings,
    /// Logging level.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            coingecko_base_url: None,
            binance_base_url: None,
            scheduler: SchedulerSettings::default(),
            defaults: DefaultSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Endpoint override for the selected source.
    pub fn base_url(&self) -> Option<String> {
        match self.source {
            SourceKind::CoinGecko => self.coingecko_base_url.clone(),
            SourceKind::Binance => self.binance_base_url.clone(),
            SourceKind::Simulated => None,
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Minimum seconds between two effective checks of one alert.
    pub min_check_spacing_secs: u64,
    /// Send the first fetch error of an alert to its chat.
    pub report_errors: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        let config = SchedulerConfig::default();
        Self {
            min_check_spacing_secs: config.min_check_spacing.as_secs(),
            report_errors: config.report_errors,
        }
    }
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        SchedulerConfig {
            min_check_spacing: Duration::from_secs(settings.min_check_spacing_secs),
            report_errors: settings.report_errors,
        }
    }
}

/// Defaults applied to `/alert` commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    /// Decimals shown for current prices.
    pub precision: u32,
    /// Poll interval in minutes when the command omits it.
    pub poll_minutes: f64,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            poll_minutes: 1.0,
        }
    }
}

impl DefaultSettings {
    pub fn alert_defaults(&self) -> Result<AlertDefaults, AppConfigError> {
        if self.precision > MAX_PRECISION {
            return Err(AppConfigError::Invalid(format!(
                "defaults.precision must be at most {}",
                MAX_PRECISION
            )));
        }
        let poll_interval = Duration::try_from_secs_f64(self.poll_minutes * 60.0)
            .ok()
            .filter(|d| *d >= MIN_POLL_INTERVAL)
            .ok_or_else(|| {
                AppConfigError::Invalid(format!(
                    "defaults.poll_minutes must be at least {:?}, got {}",
                    MIN_POLL_INTERVAL,
                    self.poll_minutes
                ))
            })?;

        Ok(AlertDefaults {
            precision: self.precision,
            poll_interval,
        })
    }
}
