//! Minimal Solana JSON-RPC client for the read paths the tools need.

use crate::errors::ServiceError;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SolanaRpc {
    url: String,
    http: reqwest::Client,
}

impl SolanaRpc {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Make a JSON-RPC call and return its `result`.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ServiceError> {
        debug!("Solana RPC: {}", method);

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::from_response("solana rpc", status.as_u16(), &text));
        }

        let json: Value = resp.json().await?;
        extract_result(json)
    }

    /// SOL balance in lamports.
    pub async fn get_balance(&self, address: &str) -> Result<u64, ServiceError> {
        let result = self.call("getBalance", json!([address])).await?;
        result
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| ServiceError::InvalidResponse("getBalance: missing value".into()))
    }

    /// Sum of the owner's token accounts for `mint`, in UI units.
    pub async fn get_token_balance(&self, owner: &str, mint: &str) -> Result<f64, ServiceError> {
        let result = self
            .call(
                "getTokenAccountsByOwner",
                json!([owner, { "mint": mint }, { "encoding": "jsonParsed" }]),
            )
            .await?;
        parse_token_balance(&result)
    }

    /// Request an airdrop (devnet/testnet only). Returns the signature.
    pub async fn request_airdrop(&self, address: &str, lamports: u64) -> Result<String, ServiceError> {
        let result = self.call("requestAirdrop", json!([address, lamports])).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::InvalidResponse("requestAirdrop: expected signature".into()))
    }

    /// Transactions per second over the most recent performance sample.
    pub async fn get_tps(&self) -> Result<f64, ServiceError> {
        let result = self.call("getRecentPerformanceSamples", json!([1])).await?;
        parse_tps(&result)
    }
}

fn extract_result(json: Value) -> Result<Value, ServiceError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        if message.to_lowercase().contains("insufficient") {
            return Err(ServiceError::InsufficientFunds(message));
        }
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        return Err(ServiceError::Api {
            service: "solana rpc",
            // JSON-RPC codes are negative and may not fit a status; 0 marks "unknown".
            status: u16::try_from(code.unsigned_abs()).unwrap_or(0),
            message,
        });
    }

    json.get("result")
        .cloned()
        .ok_or_else(|| ServiceError::InvalidResponse("Solana RPC: missing 'result' field".into()))
}

fn parse_token_balance(result: &Value) -> Result<f64, ServiceError> {
    let accounts = result
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::InvalidResponse("getTokenAccountsByOwner: missing value".into()))?;

    if accounts.is_empty() {
        return Err(ServiceError::NotFound("no token account for this mint".into()));
    }

    let total = accounts
        .iter()
        .filter_map(|acct| acct.pointer("/account/data/parsed/info/tokenAmount/uiAmountString"))
        .filter_map(Value::as_str)
        .filter_map(|s| s.parse::<f64>().ok())
        .sum();
    Ok(total)
}

fn parse_tps(result: &Value) -> Result<f64, ServiceError> {
    let sample = result
        .as_array()
        .and_then(|samples| samples.first())
        .ok_or_else(|| ServiceError::InvalidResponse("no performance samples".into()))?;

    let transactions = sample
        .get("numTransactions")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let period = sample
        .get("samplePeriodSecs")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    if period == 0 {
        return Err(ServiceError::InvalidResponse("sample period is zero".into()));
    }
    Ok(transactions as f64 / period as f64)
}
