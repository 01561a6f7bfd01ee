//! Coin Alert Bot server.
//!
//! Loads configuration, wires the price source, scheduler and Telegram bot
//! together, and tears everything down on Ctrl+C / SIGTERM.

mod config;

use clap::Parser;
use coin_alert_alerts::{
    AlertDefaults, CommandHandler, LogSink, NotificationSink, Scheduler, SchedulerConfig,
    TelegramBot, TelegramSink,
};
use coin_alert_core::{AlertConfig, Asset, CurrencyUnit};
use coin_alert_feeds::{source_factory, SourceKind};
use config::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teloxide::Bot;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Destination used for log-only dry runs.
const CONSOLE_DESTINATION: &str = "console";

/// Coin Alert Bot CLI
#[derive(Parser, Debug)]
#[command(name = "coin-alert-bot")]
#[command(about = "Telegram price alerts for SOL and SUI", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log level: trace, debug, info, warn, error (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Use simulated prices. Without a bot token, alerts are only logged
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// Minimum seconds between two checks of one alert (overrides config)
    #[arg(long)]
    min_spacing_secs: Option<u64>,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Apply CLI overrides on top of the file config.
fn apply_args(config: &mut AppConfig, args: &Args) {
    if args.simulate {
        config.source = SourceKind::Simulated;
    }
    if let Some(secs) = args.min_spacing_secs {
        config.scheduler.min_check_spacing_secs = secs;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
}

/// Alert started for dry runs so the log shows the full alert cycle.
fn demo_alert(defaults: &AlertDefaults) -> Option<AlertConfig> {
    AlertConfig::with_options(
        Asset::Sol,
        95.0,
        102.0,
        CurrencyUnit::Usd,
        defaults.precision,
        defaults.poll_interval,
    )
    .ok()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let loaded = AppConfig::load(&args.config);
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            init_logging(args.log_level.as_deref().unwrap_or("info"));
            error!("{}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };
    apply_args(&mut config, &args);
    init_logging(&config.log_level);

    let defaults = match config.defaults.alert_defaults() {
        Ok(defaults) => defaults,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let scheduler_config = SchedulerConfig::from(&config.scheduler);

    info!("Coin Alert Bot starting...");
    info!("  Price source: {:?}", config.source);
    info!("  Min check spacing: {}s", scheduler_config.min_check_spacing.as_secs());
    info!("  Default poll interval: {}s", defaults.poll_interval.as_secs());
    info!("  Report errors: {}", scheduler_config.report_errors);

    let sources = source_factory(config.source, config.base_url());
    let token = std::env::var("TELEGRAM_BOT_TOKEN").ok().filter(|t| !t.is_empty());

    let bot = match token {
        Some(token) => Some(Bot::new(token)),
        None if args.simulate => {
            warn!("TELEGRAM_BOT_TOKEN not set, alerts will only be logged");
            None
        }
        None => {
            error!("TELEGRAM_BOT_TOKEN not set");
            std::process::exit(1);
        }
    };

    let sink: Arc<dyn NotificationSink> = match &bot {
        Some(bot) => Arc::new(TelegramSink::new(bot.clone())),
        None => Arc::new(LogSink),
    };
    let scheduler = Arc::new(Scheduler::new(scheduler_config, sources, sink));

    let bot_handle = match bot {
        Some(bot) => {
            let handler = CommandHandler::new(Arc::clone(&scheduler), defaults);
            let telegram = Arc::new(TelegramBot::new(bot, handler));
            Some(tokio::spawn(telegram.run()))
        }
        None => {
            if let Some(alert) = demo_alert(&defaults) {
                if let Err(e) = scheduler.start(CONSOLE_DESTINATION, alert).await {
                    error!("Failed to start demo alert: {}", e);
                }
            }
            None
        }
    };

    info!("Press Ctrl+C to stop...");
    shutdown_signal().await;

    warn!("Shutdown signal received");
    scheduler.shutdown().await;

    if let Some(handle) = bot_handle {
        handle.abort();
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }

    info!("Coin Alert Bot stopped");
}
