//! Telegram Bot API notifier.

use crate::errors::ServiceError;
use crate::notify::Notifier;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    api_url: String,
    bot_token: String,
    default_chat_id: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, default_chat_id: &str) -> Self {
        Self::with_api_url(TELEGRAM_API, bot_token, default_chat_id)
    }

    pub fn with_api_url(api_url: &str, bot_token: &str, default_chat_id: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            default_chat_id: default_chat_id.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Pick the explicit chat or fall back to the default one.
    fn resolve_chat<'a>(&'a self, chat_id: Option<&'a str>) -> Result<&'a str, ServiceError> {
        if self.bot_token.is_empty() {
            return Err(ServiceError::NotConfigured("Telegram bot token is not set".into()));
        }
        match chat_id.filter(|c| !c.is_empty()) {
            Some(chat) => Ok(chat),
            None if !self.default_chat_id.is_empty() => Ok(&self.default_chat_id),
            None => Err(ServiceError::NotConfigured(
                "no chat_id given and no default Telegram chat configured".into(),
            )),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, chat_id: Option<&str>, message: &str) -> Result<(), ServiceError> {
        let chat = self.resolve_chat(chat_id)?;

        let resp = self
            .http
            .post(format!("{}/bot{}/sendMessage", self.api_url, self.bot_token))
            .json(&SendMessageRequest { chat_id: chat, text: message })
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::from_response("telegram", status.as_u16(), &body));
        }

        info!("Telegram notification sent to {}", chat);
        Ok(())
    }
}
