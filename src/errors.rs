//! Errors raised by the external services tools forward to (Solana RPC, the
//! agent-kit gateway, market data APIs, image generation, Telegram).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Transport failure: connection refused, timeout, TLS, ...
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered with an error status or error body.
    #[error("{service} error ({status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The service is not configured (missing token, URL, ...).
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The outgoing request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl ServiceError {
    /// Classify an error body returned by a remote service.
    ///
    /// Insufficient-balance failures surface under many wordings across SDKs;
    /// they all contain "insufficient".
    pub fn from_response(service: &'static str, status: u16, body: &str) -> Self {
        let message = if body.is_empty() {
            "(empty body)".to_string()
        } else {
            body.to_string()
        };
        if body.to_lowercase().contains("insufficient") {
            Self::InsufficientFunds(message)
        } else if status == 404 {
            Self::NotFound(message)
        } else {
            Self::Api {
                service,
                status,
                message,
            }
        }
    }
}
