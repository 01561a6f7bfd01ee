//! Notification delivery.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] crate::telegram::TelegramError),
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Delivers alert text to a destination (a chat id).
///
/// Delivery is best-effort: callers log failures and never retry.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `messages`, in order, to `destination`.
    async fn send(&self, destination: &str, messages: &[String]) -> Result<(), NotifierError>;
}

/// Sink that only writes messages to the log. Used for dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, destination: &str, messages: &[String]) -> Result<(), NotifierError> {
        for message in messages {
            info!(destination = destination, "{}", message);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_accepts_any_destination() {
        let sink = LogSink;
        assert!(sink.send("123", &["hello".to_string()]).await.is_ok());
        assert!(sink.send("", &[]).await.is_ok());
    }
}
