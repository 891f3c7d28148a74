//! Market data: Pyth price feeds (Hermes), Jupiter token metadata and
//! DexScreener ticker search.

use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const PYTH_HERMES_API: &str = "https://hermes.pyth.network";
const JUPITER_TOKEN_API: &str = "https://tokens.jup.ag";
const DEXSCREENER_API: &str = "https://api.dexscreener.com";

/// A Pyth price, already scaled by its exponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub feed_id: String,
    pub price: f64,
    pub confidence: f64,
    pub publish_time: i64,
}

/// Token metadata as returned by `get_token_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenData {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone)]
pub struct MarketData {
    pyth_url: String,
    jupiter_url: String,
    dexscreener_url: String,
    http: reqwest::Client,
}

impl Default for MarketData {
    fn default() -> Self {
        Self::new(PYTH_HERMES_API, JUPITER_TOKEN_API, DEXSCREENER_API)
    }
}

impl MarketData {
    pub fn new(pyth_url: &str, jupiter_url: &str, dexscreener_url: &str) -> Self {
        Self {
            pyth_url: pyth_url.trim_end_matches('/').to_string(),
            jupiter_url: jupiter_url.trim_end_matches('/').to_string(),
            dexscreener_url: dexscreener_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, service: &'static str, url: &str) -> Result<Value, ServiceError> {
        debug!("{} GET {}", service, url);
        let resp = self
            .http
            .get(url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::from_response(service, status.as_u16(), &body));
        }
        Ok(resp.json().await?)
    }

    /// Latest price for a Pyth feed id (hex, with or without `0x`).
    pub async fn pyth_price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError> {
        let url = format!(
            "{}/v2/updates/price/latest?ids[]={}",
            self.pyth_url,
            feed_id.trim_start_matches("0x")
        );
        let body = self.get_json("pyth", &url).await?;
        parse_hermes_price(&body, feed_id)
    }

    /// Token metadata by mint address from the Jupiter token list.
    pub async fn token_by_mint(&self, mint: &str) -> Result<TokenData, ServiceError> {
        let url = format!("{}/token/{}", self.jupiter_url, mint);
        let body = self.get_json("jupiter", &url).await?;
        serde_json::from_value(body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    /// Resolve a ticker to a Solana mint via DexScreener, then load its metadata.
    pub async fn token_by_ticker(&self, ticker: &str) -> Result<TokenData, ServiceError> {
        let url = format!("{}/latest/dex/search?q={}", self.dexscreener_url, ticker);
        let body = self.get_json("dexscreener", &url).await?;
        let mint = find_solana_mint(&body, ticker)
            .ok_or_else(|| ServiceError::NotFound(format!("no Solana token for ticker {}", ticker)))?;
        self.token_by_mint(&mint).await
    }
}

/// Parse a Hermes `/v2/updates/price/latest` body.
fn parse_hermes_price(body: &Value, feed_id: &str) -> Result<PriceQuote, ServiceError> {
    let entry = body
        .get("parsed")
        .and_then(Value::as_array)
        .and_then(|feeds| feeds.first())
        .ok_or_else(|| ServiceError::NotFound(format!("price feed {}", feed_id)))?;

    let price = entry
        .get("price")
        .ok_or_else(|| ServiceError::InvalidResponse("missing price object".into()))?;

    let raw = |field: &str| -> Result<f64, ServiceError> {
        price
            .get(field)
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| ServiceError::InvalidResponse(format!("missing price.{}", field)))
    };
    let expo = price.get("expo").and_then(Value::as_i64).unwrap_or(0) as i32;
    let scale = 10f64.powi(expo);

    Ok(PriceQuote {
        feed_id: feed_id.to_string(),
        price: raw("price")? * scale,
        confidence: raw("conf")? * scale,
        publish_time: price.get("publish_time").and_then(Value::as_i64).unwrap_or(0),
    })
}

/// Pick the first Solana pair whose base token symbol matches `ticker`.
fn find_solana_mint(body: &Value, ticker: &str) -> Option<String> {
    body.get("pairs")?
        .as_array()?
        .iter()
        .filter(|pair| pair.get("chainId").and_then(Value::as_str) == Some("solana"))
        .find(|pair| {
            pair.pointer("/baseToken/symbol")
                .and_then(Value::as_str)
                .is_some_and(|s| s.eq_ignore_ascii_case(ticker))
        })
        .and_then(|pair| pair.pointer("/baseToken/address"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
