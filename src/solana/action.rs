//! Write operations submitted through the agent-kit gateway.

use serde::{Deserialize, Serialize};

/// A creator entry for NFT collection royalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftCreator {
    pub address: String,
    /// Share of royalties, 0-100. Shares across creators sum to 100.
    pub percentage: u8,
}

/// Every on-chain write a tool can request. Serialized as the gateway request
/// body, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChainAction {
    Transfer {
        to: String,
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        mint: Option<String>,
    },
    CreateNftCollection {
        name: String,
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        royalty_basis_points: Option<u16>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        creators: Vec<NftCreator>,
    },
    MintNft {
        collection_mint: String,
        name: String,
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        recipient: Option<String>,
    },
    DeployToken {
        name: String,
        uri: String,
        symbol: String,
        decimals: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_supply: Option<f64>,
    },
    LaunchPumpfunToken {
        token_name: String,
        token_ticker: String,
        description: String,
        image_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        twitter: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        telegram: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        website: Option<String>,
        initial_liquidity_sol: f64,
        slippage_bps: u16,
        priority_fee: f64,
    },
    Trade {
        output_mint: String,
        input_amount: f64,
        input_mint: String,
        slippage_bps: u16,
    },
    Lend {
        amount: f64,
    },
    StakeSol {
        amount: f64,
    },
    StakeWithJup {
        amount: f64,
    },
    CreateOrcaWhirlpool {
        deposit_token_mint: String,
        other_token_mint: String,
        initial_price: f64,
        max_price: f64,
        deposit_token_amount: f64,
        fee_tier: f64,
    },
    #[serde(rename = "raydium_create_ammv4")]
    RaydiumCreateAmmV4 {
        market_id: String,
        base_amount: f64,
        quote_amount: f64,
        start_time: u64,
    },
    RaydiumCreateClmm {
        mint1: String,
        mint2: String,
        config_id: String,
        initial_price: f64,
        start_time: u64,
    },
    RaydiumCreateCpmm {
        mint1: String,
        mint2: String,
        config_id: String,
        mint_a_amount: f64,
        mint_b_amount: f64,
        start_time: u64,
    },
    RegisterDomain {
        name: String,
        space_kb: u32,
    },
}

impl ChainAction {
    /// Route segment on the gateway (`/v1/actions/<name>`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::CreateNftCollection { .. } => "create_nft_collection",
            Self::MintNft { .. } => "mint_nft",
            Self::DeployToken { .. } => "deploy_token",
            Self::LaunchPumpfunToken { .. } => "launch_pumpfun_token",
            Self::Trade { .. } => "trade",
            Self::Lend { .. } => "lend",
            Self::StakeSol { .. } => "stake_sol",
            Self::StakeWithJup { .. } => "stake_with_jup",
            Self::CreateOrcaWhirlpool { .. } => "create_orca_whirlpool",
            Self::RaydiumCreateAmmV4 { .. } => "raydium_create_ammv4",
            Self::RaydiumCreateClmm { .. } => "raydium_create_clmm",
            Self::RaydiumCreateCpmm { .. } => "raydium_create_cpmm",
            Self::RegisterDomain { .. } => "register_domain",
        }
    }
}

/// What the gateway returns for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub signature: String,
    /// Account created by the transaction (mint, collection, pool, domain), if any.
    #[serde(default)]
    pub address: Option<String>,
    /// Fee payer that signed the transaction.
    #[serde(default)]
    pub signer: Option<String>,
}
