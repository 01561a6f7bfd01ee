//! Price alert system.
//!
//! This crate provides:
//! - Zone-based alert evaluation for one tracked asset
//! - A scheduler running one polling timer per (chat, asset)
//! - Telegram command handling and alert delivery

pub mod commands;
pub mod engine;
pub mod format;
pub mod notifier;
pub mod scheduler;
pub mod telegram;

pub use commands::{AlertDefaults, Command, CommandHandler};
pub use engine::AlertEngine;
pub use notifier::{LogSink, NotificationSink, NotifierError};
pub use scheduler::{
    Scheduler, SchedulerConfig, SchedulerError, SessionHandle, SessionKey, SessionSnapshot, SessionState,
};
pub use telegram::{TelegramBot, TelegramError, TelegramSink};
