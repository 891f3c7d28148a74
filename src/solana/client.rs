//! Production [`SolanaAgent`]: RPC reads, gateway writes, public market data.
//!
//! Reads and writes share one identity: the address the gateway signs for.

use crate::config::AgentConfig;
use crate::errors::ServiceError;
use crate::identity::Wallet;
use crate::solana::{
    lamports_to_sol, AgentKitGateway, Balance, ChainAction, MarketData, PriceQuote, SolanaAgent,
    SolanaRpc, TokenData, TokenQuery, TxReceipt,
};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct SolanaClient {
    rpc: SolanaRpc,
    gateway: AgentKitGateway,
    market: MarketData,
}

impl SolanaClient {
    pub fn new(rpc: SolanaRpc, gateway: AgentKitGateway, market: MarketData) -> Self {
        Self {
            rpc,
            gateway,
            market,
        }
    }

    /// Build the client from config endpoints, acting as `wallet`.
    pub fn from_config(config: &AgentConfig, wallet: Wallet) -> Self {
        Self::new(
            SolanaRpc::new(&config.solana_rpc_url),
            AgentKitGateway::new(&config.agent_kit_url, &config.agent_kit_api_key, wallet),
            MarketData::default(),
        )
    }
}

#[async_trait]
impl SolanaAgent for SolanaClient {
    fn wallet_address(&self) -> &str {
        self.gateway.wallet_address()
    }

    async fn balance(&self, mint: Option<&str>) -> Result<Balance, ServiceError> {
        let owner = self.wallet_address();
        match mint {
            None => {
                let lamports = self.rpc.get_balance(owner).await?;
                Ok(Balance {
                    amount: lamports_to_sol(lamports),
                    token: "SOL".into(),
                })
            }
            Some(mint) => {
                let amount = self.rpc.get_token_balance(owner, mint).await?;
                Ok(Balance {
                    amount,
                    token: mint.to_string(),
                })
            }
        }
    }

    async fn request_airdrop(&self, lamports: u64) -> Result<String, ServiceError> {
        self.rpc.request_airdrop(self.wallet_address(), lamports).await
    }

    async fn tps(&self) -> Result<f64, ServiceError> {
        self.rpc.get_tps().await
    }

    async fn token_data(&self, query: &TokenQuery) -> Result<TokenData, ServiceError> {
        match query {
            TokenQuery::Mint(mint) => self.market.token_by_mint(mint).await,
            TokenQuery::Ticker(ticker) => self.market.token_by_ticker(ticker).await,
        }
    }

    async fn price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError> {
        self.market.pyth_price(feed_id).await
    }

    async fn submit(&self, action: ChainAction) -> Result<TxReceipt, ServiceError> {
        self.gateway.submit(&action).await
    }
}
