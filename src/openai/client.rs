//! OpenAI Assistants API client (v2): assistants, threads, messages, runs.

use crate::assistant::AssistantConfig;
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Remote assistant provider operations used by bootstrap and chat orchestration.
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn create_assistant(&self, config: &AssistantConfig) -> Result<AssistantHandle>;

    async fn create_thread(&self) -> Result<ThreadHandle>;

    /// Append a user message to a thread.
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<()>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Submit every output for a `requires_action` run in one request.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolResult],
    ) -> Result<Run>;

    /// Text of the newest assistant message on the thread, if any.
    async fn latest_assistant_message(&self, thread_id: &str) -> Result<Option<String>>;
}

/// HTTP client for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) http: reqwest::Client,
}

// -- Request / response types -----------------------------------------------

#[derive(Debug, Deserialize)]
struct AssistantObject {
    id: String,
    #[serde(default)]
    name: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolOutputPayload<'a> {
    tool_call_id: &'a str,
    output: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitToolOutputsRequest<'a> {
    tool_outputs: Vec<ToolOutputPayload<'a>>,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    thread_id: String,
    status: RunStatus,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<ToolCallPayload>,
}

#[derive(Debug, Deserialize)]
struct ToolCallPayload {
    id: String,
    function: FunctionCallPayload,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPayload {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct RunError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

/// Blank means no arguments. Text that is not JSON is kept as a string, which
/// argument validation rejects before the tool runs.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

impl From<RunObject> for Run {
    fn from(run: RunObject) -> Self {
        let required_tool_calls = run
            .required_action
            .map(|a| {
                a.submit_tool_outputs
                    .tool_calls
                    .into_iter()
                    .map(|tc| ToolCall {
                        id: tc.id,
                        name: tc.function.name,
                        arguments: parse_arguments(&tc.function.arguments),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Run {
            id: run.id,
            thread_id: run.thread_id,
            status: run.status,
            required_tool_calls,
            last_error: run.last_error.map(|e| e.message),
        }
    }
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Send a request and decode the JSON body, failing on non-2xx statuses.
    async fn send_json<T: serde::de::DeserializeOwned>(
        req: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("OpenAI {} request failed", what))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("OpenAI {} failed ({}): {}", what, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse OpenAI {} response", what))
    }
}

#[async_trait]
impl AssistantsApi for OpenAiClient {
    async fn create_assistant(&self, config: &AssistantConfig) -> Result<AssistantHandle> {
        debug!("Creating assistant '{}' on {}", config.name, config.model);
        let body: AssistantObject =
            Self::send_json(self.post("assistants").json(config), "create_assistant").await?;
        Ok(AssistantHandle {
            id: body.id,
            name: body.name.unwrap_or_else(|| config.name.clone()),
            model: body.model,
        })
    }

    async fn create_thread(&self) -> Result<ThreadHandle> {
        let body: IdObject = Self::send_json(
            self.post("threads").json(&serde_json::json!({})),
            "create_thread",
        )
        .await?;
        Ok(ThreadHandle { id: body.id })
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<()> {
        let _: IdObject = Self::send_json(
            self.post(&format!("threads/{}/messages", thread_id))
                .json(&CreateMessageRequest { role: "user", content }),
            "add_message",
        )
        .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let run: RunObject = Self::send_json(
            self.post(&format!("threads/{}/runs", thread_id))
                .json(&CreateRunRequest { assistant_id }),
            "create_run",
        )
        .await?;
        Ok(run.into())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let run: RunObject = Self::send_json(
            self.get(&format!("threads/{}/runs/{}", thread_id, run_id)),
            "retrieve_run",
        )
        .await?;
        Ok(run.into())
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolResult],
    ) -> Result<Run> {
        let request = SubmitToolOutputsRequest {
            tool_outputs: outputs
                .iter()
                .map(|o| ToolOutputPayload {
                    tool_call_id: &o.tool_call_id,
                    output: &o.output,
                })
                .collect(),
        };
        let run: RunObject = Self::send_json(
            self.post(&format!(
                "threads/{}/runs/{}/submit_tool_outputs",
                thread_id, run_id
            ))
            .json(&request),
            "submit_tool_outputs",
        )
        .await?;
        Ok(run.into())
    }

    async fn latest_assistant_message(&self, thread_id: &str) -> Result<Option<String>> {
        let list: MessageList = Self::send_json(
            self.get(&format!("threads/{}/messages", thread_id))
                .query(&[("order", "desc"), ("limit", "1")]),
            "list_messages",
        )
        .await?;
        Ok(newest_assistant_text(list))
    }
}

fn newest_assistant_text(list: MessageList) -> Option<String> {
    let message = list.data.into_iter().find(|m| m.role == "assistant")?;
    let text: Vec<String> = message
        .content
        .into_iter()
        .filter(|part| part.kind == "text")
        .filter_map(|part| part.text.map(|t| t.value))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text.join("\n"))
    }
}
