//! Liquidity pool creation on Orca and Raydium.

use crate::solana::{ChainAction, SolanaAgent, TxReceipt};
use crate::tools::args::{address_arg, f64_arg, positive_arg, u64_arg};
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Fee tiers (percent) Orca whirlpools accept.
pub const ORCA_FEE_TIERS: &[f64] = &[0.01, 0.02, 0.04, 0.05, 0.16, 0.3, 0.65, 1.0, 2.0];

fn is_orca_fee_tier(fee: f64) -> bool {
    ORCA_FEE_TIERS.iter().any(|t| (t - fee).abs() < 1e-9)
}

fn distinct_mints(a: &str, b: &str) -> Result<(), ToolError> {
    if a == b {
        return Err(ToolError::validation("pool mints must differ"));
    }
    Ok(())
}

fn pool_created(kind: &str, receipt: &TxReceipt) -> String {
    format!(
        "Created {} pool {}. Signature: {}",
        kind,
        receipt.address.as_deref().unwrap_or("(address pending)"),
        receipt.signature
    )
}

pub struct CreateOrcaWhirlpool {
    solana: Arc<dyn SolanaAgent>,
}

impl CreateOrcaWhirlpool {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for CreateOrcaWhirlpool {
    fn name(&self) -> &str {
        "create_orca_whirlpool"
    }

    fn description(&self) -> &str {
        "Create an Orca whirlpool with single-sided liquidity between an initial and a maximum price."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "deposit_token_mint": { "type": "string", "description": "Mint of the token deposited" },
                "other_token_mint": { "type": "string", "description": "Mint of the paired token" },
                "initial_price": { "type": "number", "description": "Initial price of the deposit token" },
                "max_price": { "type": "number", "description": "Upper bound of the price range" },
                "deposit_token_amount": { "type": "number", "description": "Amount of the deposit token" },
                "fee_tier": {
                    "type": "number",
                    "description": "Fee tier in percent: 0.01, 0.02, 0.04, 0.05, 0.16, 0.3, 0.65, 1 or 2"
                }
            },
            "required": [
                "deposit_token_mint",
                "other_token_mint",
                "initial_price",
                "max_price",
                "deposit_token_amount",
                "fee_tier"
            ]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Pool
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let deposit_token_mint = address_arg(args, "deposit_token_mint")?;
        let other_token_mint = address_arg(args, "other_token_mint")?;
        distinct_mints(&deposit_token_mint, &other_token_mint)?;

        let initial_price = positive_arg(args, "initial_price")?;
        let max_price = positive_arg(args, "max_price")?;
        if max_price <= initial_price {
            return Err(ToolError::validation(format!(
                "max_price ({}) must be greater than initial_price ({})",
                max_price, initial_price
            )));
        }
        let deposit_token_amount = positive_arg(args, "deposit_token_amount")?;
        let fee_tier = f64_arg(args, "fee_tier")?;
        if !is_orca_fee_tier(fee_tier) {
            return Err(ToolError::validation(format!(
                "unsupported fee tier {}; expected one of {:?}",
                fee_tier, ORCA_FEE_TIERS
            )));
        }

        let receipt = self
            .solana
            .submit(ChainAction::CreateOrcaWhirlpool {
                deposit_token_mint,
                other_token_mint,
                initial_price,
                max_price,
                deposit_token_amount,
                fee_tier,
            })
            .await?;
        Ok(pool_created("Orca whirlpool", &receipt))
    }
}

pub struct RaydiumCreateAmmV4 {
    solana: Arc<dyn SolanaAgent>,
}

impl RaydiumCreateAmmV4 {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for RaydiumCreateAmmV4 {
    fn name(&self) -> &str {
        "raydium_create_ammv4"
    }

    fn description(&self) -> &str {
        "Create a Raydium AMM v4 pool on an existing OpenBook market."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "market_id": { "type": "string", "description": "OpenBook market id" },
                "base_amount": { "type": "number", "description": "Base token amount" },
                "quote_amount": { "type": "number", "description": "Quote token amount" },
                "start_time": { "type": "integer", "description": "Pool open time, unix seconds" }
            },
            "required": ["market_id", "base_amount", "quote_amount", "start_time"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Pool
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let receipt = self
            .solana
            .submit(ChainAction::RaydiumCreateAmmV4 {
                market_id: address_arg(args, "market_id")?,
                base_amount: positive_arg(args, "base_amount")?,
                quote_amount: positive_arg(args, "quote_amount")?,
                start_time: u64_arg(args, "start_time")?,
            })
            .await?;
        Ok(pool_created("Raydium AMM v4", &receipt))
    }
}

pub struct RaydiumCreateClmm {
    solana: Arc<dyn SolanaAgent>,
}

impl RaydiumCreateClmm {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for RaydiumCreateClmm {
    fn name(&self) -> &str {
        "raydium_create_clmm"
    }

    fn description(&self) -> &str {
        "Create a Raydium concentrated liquidity (CLMM) pool."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mint1": { "type": "string", "description": "First token mint" },
                "mint2": { "type": "string", "description": "Second token mint" },
                "config_id": { "type": "string", "description": "CLMM config account" },
                "initial_price": { "type": "number", "description": "Initial price of mint1 in mint2" },
                "start_time": { "type": "integer", "description": "Pool open time, unix seconds" }
            },
            "required": ["mint1", "mint2", "config_id", "initial_price", "start_time"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Pool
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let mint1 = address_arg(args, "mint1")?;
        let mint2 = address_arg(args, "mint2")?;
        distinct_mints(&mint1, &mint2)?;

        let receipt = self
            .solana
            .submit(ChainAction::RaydiumCreateClmm {
                mint1,
                mint2,
                config_id: address_arg(args, "config_id")?,
                initial_price: positive_arg(args, "initial_price")?,
                start_time: u64_arg(args, "start_time")?,
            })
            .await?;
        Ok(pool_created("Raydium CLMM", &receipt))
    }
}

pub struct RaydiumCreateCpmm {
    solana: Arc<dyn SolanaAgent>,
}

impl RaydiumCreateCpmm {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for RaydiumCreateCpmm {
    fn name(&self) -> &str {
        "raydium_create_cpmm"
    }

    fn description(&self) -> &str {
        "Create a Raydium constant product (CPMM) pool."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "mint1": { "type": "string", "description": "First token mint" },
                "mint2": { "type": "string", "description": "Second token mint" },
                "config_id": { "type": "string", "description": "CPMM config account" },
                "mint_a_amount": { "type": "number", "description": "Amount of the first token" },
                "mint_b_amount": { "type": "number", "description": "Amount of the second token" },
                "start_time": { "type": "integer", "description": "Pool open time, unix seconds" }
            },
            "required": ["mint1", "mint2", "config_id", "mint_a_amount", "mint_b_amount", "start_time"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Pool
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let mint1 = address_arg(args, "mint1")?;
        let mint2 = address_arg(args, "mint2")?;
        distinct_mints(&mint1, &mint2)?;

        let receipt = self
            .solana
            .submit(ChainAction::RaydiumCreateCpmm {
                mint1,
                mint2,
                config_id: address_arg(args, "config_id")?,
                mint_a_amount: positive_arg(args, "mint_a_amount")?,
                mint_b_amount: positive_arg(args, "mint_b_amount")?,
                start_time: u64_arg(args, "start_time")?,
            })
            .await?;
        Ok(pool_created("Raydium CPMM", &receipt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solana::SOL_MINT;
    use crate::tools::testing::{FakeSolana, MINT_A, MINT_B};
    use crate::tools::ToolErrorKind;

    fn whirlpool_args(fee_tier: f64, max_price: f64) -> Value {
        json!({
            "deposit_token_mint": MINT_A,
            "other_token_mint": SOL_MINT,
            "initial_price": 0.001,
            "max_price": max_price,
            "deposit_token_amount": 1000,
            "fee_tier": fee_tier
        })
    }

    #[tokio::test]
    async fn whirlpool_accepts_listed_fee_tier() {
        let fake = Arc::new(FakeSolana::default());
        let tool = CreateOrcaWhirlpool::new(fake.clone());
        let out = tool.execute(&whirlpool_args(0.3, 5.0)).await.unwrap();
        assert_eq!(out, "Created Orca whirlpool pool NewAccount1111. Signature: 5igsig");
        assert_eq!(fake.submitted().len(), 1);
    }

    #[tokio::test]
    async fn whirlpool_rejects_unknown_fee_tier_and_inverted_range() {
        let fake = Arc::new(FakeSolana::default());
        let tool = CreateOrcaWhirlpool::new(fake.clone());

        let err = tool.execute(&whirlpool_args(0.25, 5.0)).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);
        assert!(err.message.contains("fee tier"));

        let err = tool.execute(&whirlpool_args(0.3, 0.0005)).await.unwrap_err();
        assert!(err.message.contains("max_price"));
        assert!(fake.submitted().is_empty());
    }

    #[tokio::test]
    async fn ammv4_requires_integer_start_time() {
        let fake = Arc::new(FakeSolana::default());
        let tool = RaydiumCreateAmmV4::new(fake.clone());
        tool.execute(&json!({
            "market_id": MINT_B,
            "base_amount": 10,
            "quote_amount": 20,
            "start_time": 0
        }))
        .await
        .unwrap();
        assert_eq!(fake.submitted()[0].name(), "raydium_create_ammv4");

        let err = tool
            .execute(&json!({
                "market_id": MINT_B,
                "base_amount": 10,
                "quote_amount": 20,
                "start_time": -5
            }))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);
    }

    #[tokio::test]
    async fn clmm_and_cpmm_need_distinct_mints() {
        let fake = Arc::new(FakeSolana::default());
        let err = RaydiumCreateClmm::new(fake.clone())
            .execute(&json!({
                "mint1": MINT_A,
                "mint2": MINT_A,
                "config_id": MINT_B,
                "initial_price": 1,
                "start_time": 0
            }))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);

        RaydiumCreateCpmm::new(fake.clone())
            .execute(&json!({
                "mint1": MINT_A,
                "mint2": SOL_MINT,
                "config_id": MINT_B,
                "mint_a_amount": 100,
                "mint_b_amount": 1,
                "start_time": 1_700_000_000u64
            }))
            .await
            .unwrap();
        assert_eq!(fake.submitted()[0].name(), "raydium_create_cpmm");
    }

    #[test]
    fn fee_tier_lookup_tolerates_float_noise() {
        assert!(is_orca_fee_tier(0.1 + 0.2));
        assert!(is_orca_fee_tier(2.0));
        assert!(!is_orca_fee_tier(0.03));
    }
}
