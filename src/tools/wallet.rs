//! Wallet tools: address, balances, faucet and transfers.

use crate::solana::{sol_to_lamports, ChainAction, SolanaAgent};
use crate::tools::args::{address_arg, opt_address, opt_f64, positive, positive_arg};
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Largest faucet request the devnet faucet honours.
const MAX_FAUCET_SOL: f64 = 5.0;

pub struct GetBalance {
    solana: Arc<dyn SolanaAgent>,
}

impl GetBalance {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for GetBalance {
    fn name(&self) -> &str {
        "get_balance"
    }

    fn description(&self) -> &str {
        "Get the balance of the agent's wallet in SOL, or of an SPL token when a token address is given."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "token_address": {
                    "type": "string",
                    "description": "Optional SPL token mint address. Omit for the SOL balance."
                }
            }
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Wallet
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let mint = opt_address(args, "token_address")?;
        let balance = self.solana.balance(mint.as_deref()).await?;
        Ok(format!("{} {}", balance.amount, balance.token))
    }
}

pub struct GetWalletAddress {
    solana: Arc<dyn SolanaAgent>,
}

impl GetWalletAddress {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for GetWalletAddress {
    fn name(&self) -> &str {
        "get_wallet_address"
    }

    fn description(&self) -> &str {
        "Get the public address of the agent's Solana wallet."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Wallet
    }

    async fn execute(&self, _args: &Value) -> Result<String, ToolError> {
        Ok(self.solana.wallet_address().to_string())
    }
}

pub struct RequestFaucetFunds {
    solana: Arc<dyn SolanaAgent>,
}

impl RequestFaucetFunds {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for RequestFaucetFunds {
    fn name(&self) -> &str {
        "request_faucet_funds"
    }

    fn description(&self) -> &str {
        "Request SOL from the devnet/testnet faucet into the agent's wallet."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "Amount of SOL to request (default 1, at most 5)"
                }
            }
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Wallet
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let amount = positive("amount", opt_f64(args, "amount").unwrap_or(1.0))?;
        if amount > MAX_FAUCET_SOL {
            return Err(ToolError::validation(format!(
                "faucet requests are limited to {} SOL",
                MAX_FAUCET_SOL
            )));
        }
        let lamports = sol_to_lamports(amount);
        if lamports == 0 {
            return Err(ToolError::validation(format!(
                "{} SOL is less than one lamport",
                amount
            )));
        }
        let signature = self.solana.request_airdrop(lamports).await?;
        Ok(format!(
            "Requested {} SOL from the faucet. Signature: {}",
            amount, signature
        ))
    }
}

pub struct SendTransfer {
    solana: Arc<dyn SolanaAgent>,
}

impl SendTransfer {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for SendTransfer {
    fn name(&self) -> &str {
        "send_transfer"
    }

    fn description(&self) -> &str {
        "Transfer SOL or an SPL token from the agent's wallet to another address."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "string",
                    "description": "Recipient wallet address"
                },
                "amount": {
                    "type": "number",
                    "description": "Amount to transfer in UI units"
                },
                "mint": {
                    "type": "string",
                    "description": "Optional SPL token mint. Omit to send SOL."
                }
            },
            "required": ["to", "amount"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Wallet
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let to = address_arg(args, "to")?;
        let amount = positive_arg(args, "amount")?;
        let mint = opt_address(args, "mint")?;
        let token = mint.clone().unwrap_or_else(|| "SOL".to_string());

        let receipt = self
            .solana
            .submit(ChainAction::Transfer {
                to: to.clone(),
                amount,
                mint,
            })
            .await?;

        Ok(format!(
            "Transferred {} {} to {}. Signature: {}",
            amount, token, to, receipt.signature
        ))
    }
}
