//! Solana access layer.
//!
//! Tools never talk to the chain directly: they go through [`SolanaAgent`].
//! Reads hit the JSON-RPC endpoint and public market data APIs; writes are
//! described as a [`ChainAction`] and handed to the agent-kit gateway, which
//! builds, signs and submits the transaction.

pub mod action;
pub mod client;
pub mod gateway;
pub mod market;
pub mod rpc;

pub use action::{ChainAction, NftCreator, TxReceipt};
pub use client::SolanaClient;
pub use gateway::AgentKitGateway;
pub use market::{MarketData, PriceQuote, TokenData};
pub use rpc::SolanaRpc;

use crate::errors::ServiceError;
use async_trait::async_trait;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Wrapped SOL mint, used as the default trade input.
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Wallet balance in UI units.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub amount: f64,
    /// `"SOL"` or the SPL mint address.
    pub token: String,
}

/// How a token is looked up for `get_token_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenQuery {
    Mint(String),
    Ticker(String),
}

/// Capability surface the tools are written against.
#[async_trait]
pub trait SolanaAgent: Send + Sync {
    /// Base58 address of the agent's wallet.
    fn wallet_address(&self) -> &str;

    /// SOL balance when `mint` is `None`, otherwise the SPL token balance.
    async fn balance(&self, mint: Option<&str>) -> Result<Balance, ServiceError>;

    /// Request devnet/testnet SOL. Returns the airdrop signature.
    async fn request_airdrop(&self, lamports: u64) -> Result<String, ServiceError>;

    /// Current network throughput in transactions per second.
    async fn tps(&self) -> Result<f64, ServiceError>;

    async fn token_data(&self, query: &TokenQuery) -> Result<TokenData, ServiceError>;

    /// Latest price for a Pyth price feed id.
    async fn price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError>;

    /// Build, sign and submit a write transaction.
    async fn submit(&self, action: ChainAction) -> Result<TxReceipt, ServiceError>;
}

/// Whether `s` is a base58 string decoding to a 32-byte public key.
pub fn is_valid_address(s: &str) -> bool {
    matches!(bs58::decode(s).into_vec(), Ok(bytes) if bytes.len() == 32)
}

/// Convert lamports to SOL for display.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a SOL amount to lamports, rounding down.
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).floor() as u64
}
