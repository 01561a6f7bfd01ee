//! Chat command surface.
//!
//! Parsing and replies live here, independent of the Telegram transport, so
//! the whole command flow can be driven in tests against a real scheduler.

use crate::format::format_summary_line;
use crate::scheduler::{Scheduler, SessionSnapshot};
use coin_alert_core::{
    AlertConfig, Asset, ConfigError, CurrencyUnit, DEFAULT_POLL_INTERVAL, DEFAULT_PRECISION,
};
use std::sync::Arc;
use std::time::Duration;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

pub const WELCOME_TEXT: &str = "Welcome to Crypto Alert Bot!\n\nUse /help to see available commands.";

/// Bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot. With arguments, same as /alert")]
    Start(String),
    #[command(description = "Show help")]
    Help,
    #[command(description = "Set an alert. Usage: /alert sol 95 102 usd 1")]
    Alert(String),
    #[command(description = "Stop an alert. Usage: /stop sol")]
    Stop(String),
    #[command(description = "Show last prices of active alerts")]
    List,
}

/// Values used for optional `/alert` arguments and settings not exposed in chat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertDefaults {
    pub precision: u32,
    pub poll_interval: Duration,
}

impl Default for AlertDefaults {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_asset(value: &str) -> Result<Asset, ConfigError> {
    Asset::from_str(value).ok_or_else(|| ConfigError::UnsupportedAsset(value.to_string()))
}

/// Parse `<asset> <lower> <upper> [currency] [pollMinutes]`.
pub fn parse_alert_args(args: &str, defaults: &AlertDefaults) -> Result<AlertConfig, ConfigError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ConfigError::MissingArgument("coin type, lower and upper threshold"));
    }

    let asset = parse_asset(parts[0])?;
    let currency = match parts.get(3) {
        Some(code) => CurrencyUnit::from_str(code)
            .ok_or_else(|| ConfigError::UnsupportedCurrency(code.to_string()))?,
        None => CurrencyUnit::default(),
    };
    let lower = parse_number("lower threshold", parts[1])?;
    let upper = parse_number("upper threshold", parts[2])?;

    let poll_interval = match parts.get(4) {
        Some(raw) => {
            let minutes = parse_number("polling interval", raw)?;
            if minutes.is_sign_negative() {
                return Err(ConfigError::InvalidNumber {
                    field: "polling interval",
                    value: raw.to_string(),
                });
            }
            Duration::try_from_secs_f64(minutes * 60.0).map_err(|_| ConfigError::InvalidNumber {
                field: "polling interval",
                value: raw.to_string(),
            })?
        }
        None => defaults.poll_interval,
    };

    AlertConfig::with_options(asset, lower, upper, currency, defaults.precision, poll_interval)
}

/// Parse `<asset>`.
pub fn parse_stop_args(args: &str) -> Result<Asset, ConfigError> {
    let value = args
        .split_whitespace()
        .next()
        .ok_or(ConfigError::MissingArgument("coin type"))?;
    parse_asset(value)
}

pub fn help_text() -> String {
    format!(
        "Commands:\n\
         /alert <coinType> <lowerThreshold> <upperThreshold> <currencyUnit> <pollingInterval>\n\
         Example: /alert sol 95 102 usd 1\n\n\
         /stop <coinType>\n\
         Example: /stop sui\n\n\
         /list\n\n\
         Note:\n\
         - supported coinType: {}\n\
         - supported currencyUnit: {}\n\
         - intervals are in minutes\n\
         - default pollingInterval is 1 minute",
        Asset::supported_list(),
        CurrencyUnit::supported_list()
    )
}

/// `/list` reply body.
pub fn format_session_list(sessions: &[SessionSnapshot]) -> String {
    if sessions.is_empty() {
        return "No alerts are set".to_string();
    }
    sessions
        .iter()
        .map(|s| format_summary_line(s.asset, s.last_price, s.currency, s.precision))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Executes commands for one destination against the scheduler.
pub struct CommandHandler {
    scheduler: Arc<Scheduler>,
    defaults: AlertDefaults,
}

impl CommandHandler {
    pub fn new(scheduler: Arc<Scheduler>, defaults: AlertDefaults) -> Self {
        Self { scheduler, defaults }
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Run `command` for `destination` and return the reply text.
    pub async fn handle(&self, destination: &str, command: Command) -> String {
        match command {
            Command::Start(args) if args.trim().is_empty() => WELCOME_TEXT.to_string(),
            Command::Start(args) | Command::Alert(args) => self.set_alert(destination, &args).await,
            Command::Stop(args) => self.stop_alert(destination, &args).await,
            Command::List => format_session_list(&self.scheduler.sessions(destination)),
            Command::Help => help_text(),
        }
    }

    async fn set_alert(&self, destination: &str, args: &str) -> String {
        let config = match parse_alert_args(args, &self.defaults) {
            Ok(config) => config,
            Err(e) => {
                info!(destination = destination, error = %e, "Rejected alert command");
                return e.to_string();
            }
        };

        let asset = config.asset();
        match self.scheduler.start(destination, config).await {
            Ok(_) => format!("Alert for {} has been set", asset.id()),
            Err(e) => {
                warn!(destination = destination, asset = %asset, error = %e, "Failed to start alert");
                e.to_string()
            }
        }
    }

    async fn stop_alert(&self, destination: &str, args: &str) -> String {
        let asset = match parse_stop_args(args) {
            Ok(asset) => asset,
            Err(e) => return e.to_string(),
        };

        if self.scheduler.stop(destination, asset).await {
            format!("Alert for {} has been stopped", asset.id())
        } else {
            format!("No alert for {} is set", asset.id())
        }
    }
}
