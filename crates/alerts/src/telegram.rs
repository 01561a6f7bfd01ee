//! Telegram bot handlers.

use crate::commands::{Command, CommandHandler};
use crate::notifier::{NotificationSink, NotifierError};
use async_trait::async_trait;
use std::sync::Arc;
use teloxide::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
}

/// Parse a destination string into a Telegram chat id.
pub fn parse_chat_id(destination: &str) -> Result<ChatId, NotifierError> {
    destination
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| NotifierError::InvalidDestination(destination.to_string()))
}

/// Delivers alerts as Telegram chat messages.
#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, destination: &str, messages: &[String]) -> Result<(), NotifierError> {
        if messages.is_empty() {
            return Ok(());
        }
        let chat_id = parse_chat_id(destination)?;
        self.bot
            .send_message(chat_id, messages.join("\n"))
            .await
            .map_err(TelegramError::from)?;
        Ok(())
    }
}

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
    handler: CommandHandler,
}

impl TelegramBot {
    pub fn new(bot: Bot, handler: CommandHandler) -> Self {
        Self { bot, handler }
    }

    /// Run the bot command handler until the dispatcher stops.
    ///
    /// No Ctrl+C handler is installed here; the server aborts this task
    /// after cancelling every alert session.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();
        let handler = Update::filter_message().filter_command::<Command>().endpoint(
            move |bot: Bot, msg: Message, cmd: Command| {
                let this = Arc::clone(&self);
                async move { this.handle_command(bot, msg, cmd).await }
            },
        );

        info!("Telegram bot is online");
        Dispatcher::builder(bot, handler).build().dispatch().await;
    }

    async fn handle_command(&self, bot: Bot, msg: Message, cmd: Command) -> Result<(), TelegramError> {
        let chat_id = msg.chat.id.to_string();
        debug!(chat_id = %chat_id, command = ?cmd, "Received command");

        let reply = self.handler.handle(&chat_id, cmd).await;
        bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }
}
