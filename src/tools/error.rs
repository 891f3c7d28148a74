use crate::errors::ServiceError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Coarse classification of a tool failure, reported back to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Arguments were malformed; nothing was sent anywhere.
    Validation,
    /// The SDK, RPC node or API call failed.
    Network,
    InsufficientFunds,
    /// Unknown tool, token, feed or account.
    NotFound,
    Other,
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Network => write!(f, "network"),
            Self::InsufficientFunds => write!(f, "insufficient_funds"),
            Self::NotFound => write!(f, "not_found"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    /// Model-facing text for a failed call.
    pub fn to_output(&self) -> String {
        format!("Error ({}): {}", self.kind, self.message)
    }
}

impl From<ServiceError> for ToolError {
    fn from(e: ServiceError) -> Self {
        let kind = match &e {
            ServiceError::Network(_) | ServiceError::Api { .. } | ServiceError::InvalidResponse(_) => {
                ToolErrorKind::Network
            }
            ServiceError::InsufficientFunds(_) => ToolErrorKind::InsufficientFunds,
            ServiceError::NotFound(_) => ToolErrorKind::NotFound,
            ServiceError::NotConfigured(_) | ServiceError::InvalidRequest(_) => ToolErrorKind::Other,
        };
        Self::new(kind, e.to_string())
    }
}
