pub mod schema;

pub use schema::AgentConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default agent home directory (~/.solana-agent).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".solana-agent"))
        .unwrap_or_else(|| PathBuf::from(".solana-agent"))
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("agent.toml")
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read agent config file")?;
        let config: AgentConfig =
            toml::from_str(&contents).context("Failed to parse agent config (TOML)")?;
        Ok(config)
    } else {
        Ok(AgentConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &AgentConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

/// Load the config file and apply process environment overrides on top.
pub fn load_with_env(path: &Path) -> Result<AgentConfig> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Overlay environment values onto `config`. Set variables win over the file.
///
/// `lookup` is injected so tests never touch the real process environment.
pub fn apply_env_overrides<F>(config: &mut AgentConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str, target: &mut String| {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            debug!("Config override from {}", key);
            *target = value;
        }
    };

    set("OPENAI_API_KEY", &mut config.openai_api_key);
    set("DATABASE_URL", &mut config.database_path);
    set("FRONTEND_URL", &mut config.frontend_url);
    set("NODE_ENV", &mut config.environment);
    set("APP_ENV", &mut config.environment);
    set("SOLANA_RPC_URL", &mut config.solana_rpc_url);
    set("AGENT_KIT_URL", &mut config.agent_kit_url);
    set("AGENT_KIT_API_KEY", &mut config.agent_kit_api_key);
    set("TELEGRAM_BOT_TOKEN", &mut config.telegram_bot_token);
    set("TELEGRAM_CHAT_ID", &mut config.telegram_chat_id);

    if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
        config.port = port
            .parse()
            .with_context(|| format!("Invalid PORT value: {}", port))?;
    }

    if let Some(flag) = lookup("CLI_MODE") {
        config.cli_mode = flag == "true";
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.model, "gpt-4-1106-preview");
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("agent.toml");
        let mut config = AgentConfig::default();
        config.assistant_name = "Tester".into();
        config.port = 8080;
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.assistant_name, "Tester");
        assert_eq!(loaded.port, 8080);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(&path, "port = 7000\nenvironment = \"production\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.port, 7000);
        assert!(config.is_production());
        assert_eq!(config.assistant_name, "SolanaAI");
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = AgentConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("PORT", "6001"),
                ("CLI_MODE", "true"),
                ("NODE_ENV", "production"),
                ("FRONTEND_URL", "https://app.example"),
            ]),
        )
        .unwrap();

        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.port, 6001);
        assert!(config.cli_mode);
        assert_eq!(config.allowed_origins(), vec!["https://app.example".to_string()]);
    }

    #[test]
    fn cli_mode_requires_literal_true() {
        let mut config = AgentConfig::default();
        apply_env_overrides(&mut config, env(&[("CLI_MODE", "1")])).unwrap();
        assert!(!config.cli_mode);
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut config = AgentConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("Invalid PORT"));
    }

    #[test]
    fn development_allows_localhost_origins() {
        let config = AgentConfig::default();
        assert_eq!(config.allowed_origins().len(), 2);
        let mut prod = AgentConfig::default();
        prod.environment = "production".into();
        assert!(prod.allowed_origins().is_empty());
    }
}
