//! DeFi tools: swaps, lending and oracle prices.

use crate::solana::{ChainAction, SolanaAgent, SOL_MINT};
use crate::tools::args::{address_arg, bps, opt_address, opt_u64, positive_arg, str_arg};
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const DEFAULT_SLIPPAGE_BPS: u64 = 300;

pub struct TradeTokens {
    solana: Arc<dyn SolanaAgent>,
}

impl TradeTokens {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for TradeTokens {
    fn name(&self) -> &str {
        "trade_tokens"
    }

    fn description(&self) -> &str {
        "Swap tokens through Jupiter. Sells SOL unless another input mint is given."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "output_mint": { "type": "string", "description": "Mint of the token to buy" },
                "input_amount": { "type": "number", "description": "Amount of the input token to sell" },
                "input_mint": { "type": "string", "description": "Mint of the token to sell (default SOL)" },
                "slippage_bps": { "type": "integer", "description": "Slippage in basis points (default 300)" }
            },
            "required": ["output_mint", "input_amount"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Defi
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let output_mint = address_arg(args, "output_mint")?;
        let input_amount = positive_arg(args, "input_amount")?;
        let input_mint = opt_address(args, "input_mint")?.unwrap_or_else(|| SOL_MINT.to_string());
        if input_mint == output_mint {
            return Err(ToolError::validation("input and output mints must differ"));
        }
        let slippage_bps = bps(
            "slippage_bps",
            opt_u64(args, "slippage_bps").unwrap_or(DEFAULT_SLIPPAGE_BPS),
        )?;

        let receipt = self
            .solana
            .submit(ChainAction::Trade {
                output_mint: output_mint.clone(),
                input_amount,
                input_mint: input_mint.clone(),
                slippage_bps,
            })
            .await?;

        Ok(format!(
            "Swapped {} of {} for {}. Signature: {}",
            input_amount, input_mint, output_mint, receipt.signature
        ))
    }
}

pub struct LendAsset {
    solana: Arc<dyn SolanaAgent>,
}

impl LendAsset {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for LendAsset {
    fn name(&self) -> &str {
        "lend_asset"
    }

    fn description(&self) -> &str {
        "Lend USDC through Lulo to earn yield."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": { "type": "number", "description": "Amount of USDC to lend" }
            },
            "required": ["amount"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Defi
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let amount = positive_arg(args, "amount")?;
        let receipt = self.solana.submit(ChainAction::Lend { amount }).await?;
        Ok(format!("Lent {} USDC. Signature: {}", amount, receipt.signature))
    }
}

pub struct PythFetchPrice {
    solana: Arc<dyn SolanaAgent>,
}

impl PythFetchPrice {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

/// Pyth feed ids are 32 bytes of hex, optionally `0x`-prefixed.
fn is_feed_id(s: &str) -> bool {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[async_trait]
impl Tool for PythFetchPrice {
    fn name(&self) -> &str {
        "pyth_fetch_price"
    }

    fn description(&self) -> &str {
        "Fetch the latest price from a Pyth price feed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "price_feed_id": {
                    "type": "string",
                    "description": "Pyth price feed id (64 hex characters)"
                }
            },
            "required": ["price_feed_id"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Defi
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let feed_id = str_arg(args, "price_feed_id")?;
        if !is_feed_id(feed_id) {
            return Err(ToolError::validation(format!(
                "'{}' is not a Pyth price feed id",
                feed_id
            )));
        }
        let quote = self.solana.price(feed_id).await?;
        Ok(format!(
            "Price: {} (confidence ±{}) at {}",
            quote.price, quote.confidence, quote.publish_time
        ))
    }
}
