//! Client for the agent-kit gateway: the service that builds transactions with
//! the protocol SDKs (Metaplex, Jupiter, Raydium, Orca, Bonfida, Pump.fun, Lulo).
//!
//! Every request names the agent wallet and is signed with its key
//! (`X-Agent-Wallet`, `X-Agent-Signature` over the exact body). The gateway
//! must pay from that wallet; a receipt whose `signer` is any other address is
//! rejected.

use crate::errors::ServiceError;
use crate::identity::Wallet;
use crate::solana::{ChainAction, TxReceipt};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

pub const WALLET_HEADER: &str = "X-Agent-Wallet";
pub const SIGNATURE_HEADER: &str = "X-Agent-Signature";

#[derive(Debug, Clone)]
pub struct AgentKitGateway {
    base_url: String,
    api_key: String,
    wallet: Wallet,
    http: reqwest::Client,
}

/// Request body: the action plus the wallet that must sign it.
#[derive(Debug, Serialize)]
struct ActionRequest<'a> {
    wallet: &'a str,
    #[serde(flatten)]
    action: &'a ChainAction,
}

impl AgentKitGateway {
    pub fn new(base_url: &str, api_key: &str, wallet: Wallet) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            wallet,
            http: reqwest::Client::new(),
        }
    }

    /// Address every submitted transaction is paid from.
    pub fn wallet_address(&self) -> &str {
        &self.wallet.address
    }

    fn action_url(&self, action: &ChainAction) -> String {
        format!("{}/v1/actions/{}", self.base_url, action.name())
    }

    fn request_body(&self, action: &ChainAction) -> Result<Vec<u8>, ServiceError> {
        let request = ActionRequest {
            wallet: &self.wallet.address,
            action,
        };
        serde_json::to_vec(&request).map_err(|e| ServiceError::InvalidRequest(e.to_string()))
    }

    /// Submit a write action and wait for the gateway to return the signature.
    pub async fn submit(&self, action: &ChainAction) -> Result<TxReceipt, ServiceError> {
        debug!("Gateway submit: {} from {}", action.name(), self.wallet.address);

        let body = self.request_body(action)?;
        let signature = self.wallet.sign(&body);

        let mut req = self
            .http
            .post(self.action_url(action))
            .header(CONTENT_TYPE, "application/json")
            .header(WALLET_HEADER, &self.wallet.address)
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .timeout(Duration::from_secs(120));
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::from_response("gateway", status.as_u16(), &body));
        }

        let receipt: TxReceipt = resp.json().await?;
        check_signer(&receipt, &self.wallet.address)?;
        info!("{} submitted: {}", action.name(), receipt.signature);
        Ok(receipt)
    }
}

/// The receipt must name the agent wallet as the signer.
fn check_signer(receipt: &TxReceipt, wallet: &str) -> Result<(), ServiceError> {
    match receipt.signer.as_deref() {
        Some(signer) if signer == wallet => Ok(()),
        Some(signer) => {
            error!(
                "Gateway signed {} with {} instead of {}",
                receipt.signature, signer, wallet
            );
            Err(ServiceError::InvalidResponse(format!(
                "transaction {} was signed by {}, not the agent wallet {}",
                receipt.signature, signer, wallet
            )))
        }
        None => Err(ServiceError::InvalidResponse(format!(
            "gateway receipt for {} does not name its signer",
            receipt.signature
        ))),
    }
}
