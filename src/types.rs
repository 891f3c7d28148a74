//! Shared types used across the agent runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Conversation state machine
// ---------------------------------------------------------------------------

/// States a conversation moves through while handling one user turn.
///
/// `Created -> AwaitingModelResponse -> (ToolCallRequested -> ToolExecuted ->
/// AwaitingModelResponse)* -> Completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Thread exists, no run started yet.
    Created,
    /// A run is queued or in progress on the remote side.
    AwaitingModelResponse,
    /// The remote model asked for one or more tool calls.
    ToolCallRequested,
    /// Tool outputs were submitted back to the run.
    ToolExecuted,
    /// The run finished and the reply was read.
    Completed,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::AwaitingModelResponse => write!(f, "awaiting_model_response"),
            Self::ToolCallRequested => write!(f, "tool_call_requested"),
            Self::ToolExecuted => write!(f, "tool_executed"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Created
    }
}

// ---------------------------------------------------------------------------
// Remote run status
// ---------------------------------------------------------------------------

/// Status of a remote assistant run, as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Whether the run has stopped and will not change again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Completed | Self::Incomplete | Self::Expired
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::InProgress => write!(f, "in_progress"),
            Self::RequiresAction => write!(f, "requires_action"),
            Self::Cancelling => write!(f, "cancelling"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
            Self::Completed => write!(f, "completed"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Snapshot of a remote run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
    /// Tool calls the model is waiting on (only set in `RequiresAction`).
    #[serde(default)]
    pub required_tool_calls: Vec<ToolCall>,
    /// Provider error message for failed runs.
    #[serde(default)]
    pub last_error: Option<String>,
}

// ---------------------------------------------------------------------------
// Remote handles
// ---------------------------------------------------------------------------

/// A created remote assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantHandle {
    pub id: String,
    pub name: String,
    pub model: String,
}

/// Reference to a remote conversation thread. The content lives with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHandle {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Tool calls
// ---------------------------------------------------------------------------

/// A tool call request from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Result of executing a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub output: String,
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// A thread row recorded in the local database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: String,
    pub assistant_id: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// One executed tool call, as recorded in the audit table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub thread_id: Option<String>,
    pub tool_name: String,
    pub arguments: serde_json::Value,
    pub output: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tool categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Wallet,
    Nft,
    Token,
    Defi,
    Staking,
    Pool,
    Utility,
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wallet => write!(f, "wallet"),
            Self::Nft => write!(f, "nft"),
            Self::Token => write!(f, "token"),
            Self::Defi => write!(f, "defi"),
            Self::Staking => write!(f, "staking"),
            Self::Pool => write!(f, "pool"),
            Self::Utility => write!(f, "utility"),
        }
    }
}
