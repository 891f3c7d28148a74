//! Outbound notifications (alerts the assistant sends to the operator).

pub mod telegram;

pub use telegram::TelegramNotifier;

use crate::errors::ServiceError;
use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `chat_id`, or to the default chat when `None`.
    async fn notify(&self, chat_id: Option<&str>, message: &str) -> Result<(), ServiceError>;
}
