//! Configuration schema for agent.toml.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// OpenAI API key used for assistants, threads and image generation.
    pub openai_api_key: String,

    /// OpenAI API base URL.
    pub openai_api_url: String,

    /// Assistant model identifier.
    pub model: String,

    /// Display name of the remote assistant.
    pub assistant_name: String,

    /// Attempts made to create the remote assistant before giving up.
    pub max_retries: u32,

    /// HTTP listen port.
    pub port: u16,

    /// Requests one client IP may make per rate-limit window.
    pub rate_limit_max: u32,

    /// Length of the rate-limit window in seconds.
    pub rate_limit_window_secs: u64,

    /// Path to the SQLite database.
    pub database_path: String,

    /// Allowed CORS origin in production.
    pub frontend_url: String,

    /// Environment name (`development`, `production`, ...).
    pub environment: String,

    /// Start the terminal chat alongside the HTTP server.
    pub cli_mode: bool,

    /// Solana JSON-RPC endpoint.
    pub solana_rpc_url: String,

    /// Agent-kit gateway that signs and submits write transactions.
    pub agent_kit_url: String,

    /// Bearer token for the agent-kit gateway.
    pub agent_kit_api_key: String,

    /// Path to the Solana keypair file.
    pub wallet_path: String,

    /// Telegram bot token for notifications (empty disables notifications).
    pub telegram_bot_token: String,

    /// Default Telegram chat to notify.
    pub telegram_chat_id: String,

    /// Interval between run status polls.
    pub run_poll_interval_ms: u64,

    /// Give up waiting on a run after this many seconds.
    pub run_timeout_secs: u64,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_api_url: "https://api.openai.com".into(),
            model: "gpt-4-1106-preview".into(),
            assistant_name: "SolanaAI".into(),
            max_retries: 3,
            port: 5000,
            rate_limit_max: 100,
            rate_limit_window_secs: 15 * 60,
            database_path: "~/.solana-agent/state.db".into(),
            frontend_url: String::new(),
            environment: "development".into(),
            cli_mode: false,
            solana_rpc_url: "https://api.devnet.solana.com".into(),
            agent_kit_url: "http://localhost:8787".into(),
            agent_kit_api_key: String::new(),
            wallet_path: "~/.solana-agent/wallet.json".into(),
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            run_poll_interval_ms: 1000,
            run_timeout_secs: 120,
            log_level: "info".into(),
        }
    }
}

impl AgentConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// Resolved database path.
    pub fn resolved_database_path(&self) -> String {
        self.resolve_path(&self.database_path)
    }

    /// Resolved wallet keypair path.
    pub fn resolved_wallet_path(&self) -> String {
        self.resolve_path(&self.wallet_path)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Origins the HTTP server accepts cross-origin requests from.
    pub fn allowed_origins(&self) -> Vec<String> {
        if self.is_production() {
            if self.frontend_url.is_empty() {
                Vec::new()
            } else {
                vec![self.frontend_url.clone()]
            }
        } else {
            vec![
                "http://localhost:3000".into(),
                "http://localhost:5000".into(),
            ]
        }
    }

    /// Whether Telegram notifications are configured.
    pub fn telegram_enabled(&self) -> bool {
        !self.telegram_bot_token.is_empty()
    }
}
