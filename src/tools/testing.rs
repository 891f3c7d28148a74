//! In-memory fakes for handler tests.

use crate::errors::ServiceError;
use crate::notify::Notifier;
use crate::openai::ImageGenerator;
use crate::solana::{
    Balance, ChainAction, PriceQuote, SolanaAgent, TokenData, TokenQuery, TxReceipt,
};
use crate::tools::ToolContext;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub(crate) const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
pub(crate) const MINT_A: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub(crate) const MINT_B: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

#[derive(Default)]
pub(crate) struct FakeSolana {
    pub submitted: Mutex<Vec<ChainAction>>,
    pub airdrops: Mutex<Vec<u64>>,
    pub fail_with: Option<ServiceError>,
}

impl FakeSolana {
    pub fn failing(err: ServiceError) -> Self {
        Self {
            fail_with: Some(err),
            ..Default::default()
        }
    }

    pub fn submitted(&self) -> Vec<ChainAction> {
        self.submitted.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), ServiceError> {
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SolanaAgent for FakeSolana {
    fn wallet_address(&self) -> &str {
        WALLET
    }

    async fn balance(&self, mint: Option<&str>) -> Result<Balance, ServiceError> {
        self.check()?;
        Ok(match mint {
            None => Balance { amount: 2.5, token: "SOL".into() },
            Some(m) => Balance { amount: 100.0, token: m.to_string() },
        })
    }

    async fn request_airdrop(&self, lamports: u64) -> Result<String, ServiceError> {
        self.check()?;
        self.airdrops.lock().unwrap().push(lamports);
        Ok("airdropsig".into())
    }

    async fn tps(&self) -> Result<f64, ServiceError> {
        self.check()?;
        Ok(2817.4)
    }

    async fn token_data(&self, query: &TokenQuery) -> Result<TokenData, ServiceError> {
        self.check()?;
        let (address, symbol) = match query {
            TokenQuery::Mint(m) => (m.clone(), "USDC".to_string()),
            TokenQuery::Ticker(t) => (MINT_A.to_string(), t.to_uppercase()),
        };
        Ok(TokenData {
            address,
            name: "USD Coin".into(),
            symbol,
            decimals: 6,
        })
    }

    async fn price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError> {
        self.check()?;
        Ok(PriceQuote {
            feed_id: feed_id.to_string(),
            price: 145.23,
            confidence: 0.05,
            publish_time: 1_700_000_000,
        })
    }

    async fn submit(&self, action: ChainAction) -> Result<TxReceipt, ServiceError> {
        self.check()?;
        self.submitted.lock().unwrap().push(action);
        Ok(TxReceipt {
            signature: "5igsig".into(),
            address: Some("NewAccount1111".into()),
            signer: Some(WALLET.into()),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeImages {
    pub prompts: Mutex<Vec<(String, String, u8)>>,
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, prompt: &str, size: &str, n: u8) -> Result<Vec<String>, ServiceError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), size.to_string(), n));
        Ok((0..n).map(|i| format!("https://img.example/{}.png", i)).collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeNotifier {
    pub sent: Mutex<Vec<(Option<String>, String)>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, chat_id: Option<&str>, message: &str) -> Result<(), ServiceError> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.map(str::to_string), message.to_string()));
        Ok(())
    }
}

pub(crate) fn context() -> ToolContext {
    ToolContext {
        solana: Arc::new(FakeSolana::default()),
        images: Arc::new(FakeImages::default()),
        notifier: Arc::new(FakeNotifier::default()),
    }
}
