//! SPL token tools.

use crate::solana::{is_valid_address, ChainAction, SolanaAgent, TokenQuery};
use crate::tools::args::{bps, opt_f64, opt_str, opt_u64, positive, str_arg};
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_SYMBOL_LEN: usize = 10;
const MAX_DECIMALS: u64 = 9;

const DEFAULT_PUMP_LIQUIDITY_SOL: f64 = 0.0001;
const DEFAULT_PUMP_SLIPPAGE_BPS: u64 = 5;
const DEFAULT_PUMP_PRIORITY_FEE: f64 = 0.00005;

pub struct DeployToken {
    solana: Arc<dyn SolanaAgent>,
}

impl DeployToken {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for DeployToken {
    fn name(&self) -> &str {
        "deploy_token"
    }

    fn description(&self) -> &str {
        "Deploy a new SPL token with metadata. The agent's wallet becomes the mint authority."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Token name" },
                "uri": { "type": "string", "description": "Metadata JSON URI" },
                "symbol": { "type": "string", "description": "Ticker symbol, at most 10 characters" },
                "decimals": { "type": "integer", "description": "Decimals, 0 to 9 (default 9)" },
                "initial_supply": {
                    "type": "number",
                    "description": "Optional amount minted to the agent's wallet"
                }
            },
            "required": ["name", "uri", "symbol"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Token
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let name = str_arg(args, "name")?.to_string();
        let uri = str_arg(args, "uri")?.to_string();
        let symbol = str_arg(args, "symbol")?.to_uppercase();
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(ToolError::validation(format!(
                "symbol must be at most {} characters",
                MAX_SYMBOL_LEN
            )));
        }
        let decimals = opt_u64(args, "decimals").unwrap_or(MAX_DECIMALS);
        if decimals > MAX_DECIMALS {
            return Err(ToolError::validation(format!(
                "decimals must be between 0 and {}, got {}",
                MAX_DECIMALS, decimals
            )));
        }
        let initial_supply = opt_f64(args, "initial_supply")
            .map(|v| positive("initial_supply", v))
            .transpose()?;

        let receipt = self
            .solana
            .submit(ChainAction::DeployToken {
                name: name.clone(),
                uri,
                symbol: symbol.clone(),
                decimals: decimals as u8,
                initial_supply,
            })
            .await?;

        Ok(format!(
            "Deployed token {} ({}) at {}. Signature: {}",
            name,
            symbol,
            receipt.address.as_deref().unwrap_or("unknown address"),
            receipt.signature
        ))
    }
}

pub struct GetTokenData {
    solana: Arc<dyn SolanaAgent>,
}

impl GetTokenData {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for GetTokenData {
    fn name(&self) -> &str {
        "get_token_data"
    }

    fn description(&self) -> &str {
        "Look up token metadata by mint address or by ticker symbol."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mint": { "type": "string", "description": "Token mint address" },
                "ticker": { "type": "string", "description": "Ticker symbol, e.g. BONK" }
            }
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Token
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let query = match (opt_str(args, "mint"), opt_str(args, "ticker")) {
            (Some(mint), _) => {
                if !is_valid_address(mint) {
                    return Err(ToolError::validation(format!(
                        "'mint' is not a valid Solana address: {}",
                        mint
                    )));
                }
                TokenQuery::Mint(mint.to_string())
            }
            (None, Some(ticker)) => TokenQuery::Ticker(ticker.to_string()),
            (None, None) => {
                return Err(ToolError::validation("provide either 'mint' or 'ticker'"))
            }
        };

        let token = self.solana.token_data(&query).await?;
        Ok(format!(
            "Name: {}, Symbol: {}, Decimals: {}, Mint: {}",
            token.name, token.symbol, token.decimals, token.address
        ))
    }
}

pub struct LaunchPumpfunToken {
    solana: Arc<dyn SolanaAgent>,
}

impl LaunchPumpfunToken {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for LaunchPumpfunToken {
    fn name(&self) -> &str {
        "launch_pumpfun_token"
    }

    fn description(&self) -> &str {
        "Launch a new token on Pump.fun with an initial liquidity buy."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "token_name": { "type": "string", "description": "Token name" },
                "token_ticker": { "type": "string", "description": "Ticker symbol" },
                "description": { "type": "string", "description": "Token description" },
                "image_url": { "type": "string", "description": "Token image URL" },
                "twitter": { "type": "string", "description": "Twitter handle" },
                "telegram": { "type": "string", "description": "Telegram group link" },
                "website": { "type": "string", "description": "Project website" },
                "initial_liquidity_sol": {
                    "type": "number",
                    "description": "Initial buy in SOL (default 0.0001)"
                },
                "slippage_bps": { "type": "integer", "description": "Slippage in basis points (default 5)" },
                "priority_fee": { "type": "number", "description": "Priority fee in SOL (default 0.00005)" }
            },
            "required": ["token_name", "token_ticker", "description", "image_url"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Token
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let token_ticker = str_arg(args, "token_ticker")?.to_string();
        let initial_liquidity_sol = positive(
            "initial_liquidity_sol",
            opt_f64(args, "initial_liquidity_sol").unwrap_or(DEFAULT_PUMP_LIQUIDITY_SOL),
        )?;
        let slippage_bps = bps(
            "slippage_bps",
            opt_u64(args, "slippage_bps").unwrap_or(DEFAULT_PUMP_SLIPPAGE_BPS),
        )?;
        let priority_fee = opt_f64(args, "priority_fee").unwrap_or(DEFAULT_PUMP_PRIORITY_FEE);
        if !(priority_fee.is_finite() && priority_fee >= 0.0) {
            return Err(ToolError::validation("'priority_fee' must not be negative"));
        }

        let action = ChainAction::LaunchPumpfunToken {
            token_name: str_arg(args, "token_name")?.to_string(),
            token_ticker: token_ticker.clone(),
            description: str_arg(args, "description")?.to_string(),
            image_url: str_arg(args, "image_url")?.to_string(),
            twitter: opt_str(args, "twitter").map(str::to_string),
            telegram: opt_str(args, "telegram").map(str::to_string),
            website: opt_str(args, "website").map(str::to_string),
            initial_liquidity_sol,
            slippage_bps,
            priority_fee,
        };
        let receipt = self.solana.submit(action).await?;

        Ok(format!(
            "Launched {} on Pump.fun at {}. Signature: {}",
            token_ticker,
            receipt.address.as_deref().unwrap_or("unknown address"),
            receipt.signature
        ))
    }
}
