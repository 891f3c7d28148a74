//! Request handlers for the chat and tool routes.

use crate::chat::Conversation;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::types::{ThreadRecord, ToolCallRecord, ToolCategory};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, Uri};
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub thread_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub thread_id: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    pub parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolExecution {
    pub tool: String,
    pub success: bool,
    pub output: String,
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "solana-agent" }))
}

/// Open a new remote thread and record it.
pub async fn create_thread(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let thread = state
        .api
        .create_thread()
        .await
        .map_err(|e| ApiError::internal(e, state.development))?;

    let record = ThreadRecord {
        id: thread.id.clone(),
        assistant_id: Some(state.assistant_id.clone()),
        source: "http".into(),
        created_at: Utc::now(),
    };
    state
        .db
        .lock()
        .await
        .save_thread(&record)
        .map_err(|e| ApiError::internal(e, state.development))?;

    info!("Created thread {}", thread.id);
    Ok(Json(json!({ "threadId": thread.id })))
}

/// Send one user message on a thread and wait for the reply.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let thread_id = request.thread_id.trim();
    let message = request.message.trim();
    if thread_id.is_empty() {
        return Err(ApiError::BadRequest("threadId is required".into()));
    }
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }
    debug!("Message on thread {}: {} chars", thread_id, message.len());

    let mut conversation = Conversation::resume(
        state.api.clone(),
        state.registry.clone(),
        &state.assistant_id,
        thread_id,
    )
    .with_database(state.db.clone())
    .with_sleeper(state.sleeper.clone())
    .with_polling(state.poll);

    let response = conversation
        .send(message)
        .await
        .map_err(|e| ApiError::internal(e, state.development))?;

    Ok(Json(MessageResponse {
        thread_id: thread_id.to_string(),
        response,
    }))
}

pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolInfo>> {
    let tools = state
        .registry
        .iter()
        .map(|tool| ToolInfo {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            category: tool.category(),
            parameters: tool.parameters_schema(),
        })
        .collect();
    Json(tools)
}

/// Tool arguments from a request body. Only an empty body means "no arguments".
pub fn parse_tool_arguments(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(args @ Value::Object(_)) => Ok(args),
        Ok(_) => Err(ApiError::BadRequest(
            "tool arguments must be a JSON object".into(),
        )),
        Err(e) => Err(ApiError::BadRequest(format!("malformed JSON body: {}", e))),
    }
}

/// Run a tool directly. The body is the tool's argument object.
pub async fn execute_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Json<ToolExecution>, ApiError> {
    if !state.registry.contains(&name) {
        return Err(ApiError::not_found(
            format!("Tool '{}' not found", name),
            &method,
            &uri,
        ));
    }
    let args = parse_tool_arguments(&body)?;

    info!("Tool via HTTP: {}({})", name, args);
    let (success, output) = match state.registry.invoke(&name, &args).await {
        Ok(output) => (true, output),
        Err(e) => (false, e.to_output()),
    };

    let record = ToolCallRecord {
        id: ulid::Ulid::new().to_string(),
        thread_id: None,
        tool_name: name.clone(),
        arguments: args,
        output: output.clone(),
        success,
        created_at: Utc::now(),
    };
    if let Err(e) = state.db.lock().await.log_tool_call(&record) {
        error!("Failed to record tool call {}: {}", name, e);
    }

    Ok(Json(ToolExecution {
        tool: name,
        success,
        output,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_no_arguments() {
        assert_eq!(parse_tool_arguments(b"").unwrap(), json!({}));
        assert_eq!(parse_tool_arguments(b" \n").unwrap(), json!({}));
        assert_eq!(
            parse_tool_arguments(br#"{"amount": 2}"#).unwrap(),
            json!({"amount": 2})
        );
    }

    #[test]
    fn malformed_or_non_object_body_is_rejected() {
        assert!(matches!(
            parse_tool_arguments(br#"{"amount": 0.1,"#),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_tool_arguments(b"[1, 2]"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_tool_arguments(b"null"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
