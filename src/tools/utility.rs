//! Network stats, .sol domains and Telegram notifications.

use crate::notify::Notifier;
use crate::solana::{ChainAction, SolanaAgent};
use crate::tools::args::{opt_str, opt_u64, str_arg};
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_DOMAIN_SPACE_KB: u64 = 10;

/// Telegram rejects longer messages.
const MAX_TELEGRAM_MESSAGE: usize = 4096;

pub struct GetTps {
    solana: Arc<dyn SolanaAgent>,
}

impl GetTps {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for GetTps {
    fn name(&self) -> &str {
        "get_tps"
    }

    fn description(&self) -> &str {
        "Get the current transactions per second of the Solana network."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Utility
    }

    async fn execute(&self, _args: &Value) -> Result<String, ToolError> {
        let tps = self.solana.tps().await?;
        Ok(format!("{:.0} transactions per second", tps))
    }
}

pub struct RegisterDomain {
    solana: Arc<dyn SolanaAgent>,
}

impl RegisterDomain {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

/// Lowercased label without the `.sol` suffix.
fn domain_label(name: &str) -> Result<String, ToolError> {
    let label = name.trim().to_lowercase();
    let label = label.strip_suffix(".sol").unwrap_or(&label).to_string();
    let valid = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(label)
    } else {
        Err(ToolError::validation(format!("'{}' is not a valid .sol domain", name)))
    }
}

#[async_trait]
impl Tool for RegisterDomain {
    fn name(&self) -> &str {
        "register_domain"
    }

    fn description(&self) -> &str {
        "Register a .sol domain name for the agent's wallet."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Domain name, with or without .sol" },
                "space_kb": { "type": "integer", "description": "Storage space in KB, 1 to 10 (default 1)" }
            },
            "required": ["name"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Utility
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let name = domain_label(str_arg(args, "name")?)?;
        let space_kb = opt_u64(args, "space_kb").unwrap_or(1);
        if !(1..=MAX_DOMAIN_SPACE_KB).contains(&space_kb) {
            return Err(ToolError::validation(format!(
                "space_kb must be between 1 and {}, got {}",
                MAX_DOMAIN_SPACE_KB, space_kb
            )));
        }

        let receipt = self
            .solana
            .submit(ChainAction::RegisterDomain {
                name: name.clone(),
                space_kb: space_kb as u32,
            })
            .await?;
        Ok(format!(
            "Registered {}.sol. Signature: {}",
            name, receipt.signature
        ))
    }
}

pub struct TelegramNotify {
    notifier: Arc<dyn Notifier>,
}

impl TelegramNotify {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl Tool for TelegramNotify {
    fn name(&self) -> &str {
        "telegram_notify"
    }

    fn description(&self) -> &str {
        "Send a notification message to the configured Telegram chat."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string", "description": "Message text" },
                "chat_id": { "type": "string", "description": "Override the configured chat id" }
            },
            "required": ["message"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Utility
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let message = str_arg(args, "message")?;
        if message.chars().count() > MAX_TELEGRAM_MESSAGE {
            return Err(ToolError::validation(format!(
                "message exceeds {} characters",
                MAX_TELEGRAM_MESSAGE
            )));
        }
        self.notifier.notify(opt_str(args, "chat_id"), message).await?;
        Ok("Notification sent".to_string())
    }
}
