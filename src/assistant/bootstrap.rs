//! Remote assistant creation: option merging, tool validation and retried creation.

use crate::agent::build_system_prompt;
use crate::assistant::retry::{RetryMachine, RetryState, Sleeper};
use crate::config::AgentConfig;
use crate::openai::AssistantsApi;
use crate::tools::{ToolDefinition, ToolRegistry};
use crate::types::AssistantHandle;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_ASSISTANT_NAME: &str = "SolanaAI";
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid tool definition at index {index}: {reason}")]
    InvalidTool { index: usize, reason: String },

    #[error("Invalid assistant options: {0}")]
    InvalidOptions(String),

    #[error("Failed to create assistant after {attempts} attempts. Last error: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

/// Models the assistant may be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistantModel {
    #[default]
    Gpt4Preview,
    Gpt4,
    Gpt35Turbo,
}

impl AssistantModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4Preview => "gpt-4-1106-preview",
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo => "gpt-3.5-turbo-1106",
        }
    }
}

impl fmt::Display for AssistantModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistantModel {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gpt-4-1106-preview" => Ok(Self::Gpt4Preview),
            "gpt-4" => Ok(Self::Gpt4),
            "gpt-3.5-turbo-1106" => Ok(Self::Gpt35Turbo),
            other => Err(BootstrapError::InvalidOptions(format!(
                "unsupported model '{}'",
                other
            ))),
        }
    }
}

impl Serialize for AssistantModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Caller overrides; unset fields fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct AssistantOptions {
    pub model: Option<AssistantModel>,
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub max_retries: Option<u32>,
}

/// Options after merging, every field set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub model: AssistantModel,
    pub name: String,
    pub instructions: String,
    pub max_retries: u32,
}

impl AssistantOptions {
    /// Overrides taken from the agent config.
    pub fn from_config(config: &AgentConfig) -> Result<Self, BootstrapError> {
        Ok(Self {
            model: Some(config.model.parse()?),
            name: Some(config.assistant_name.clone()),
            instructions: None,
            max_retries: Some(config.max_retries),
        })
    }

    /// Merge over the defaults, field by field.
    pub fn resolve(self) -> ResolvedOptions {
        ResolvedOptions {
            model: self.model.unwrap_or_default(),
            name: self
                .name
                .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string()),
            instructions: self.instructions.unwrap_or_else(build_system_prompt),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }
}

/// Request body for assistant creation.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantConfig {
    pub model: AssistantModel,
    pub name: String,
    pub instructions: String,
    pub tools: Vec<Value>,
}

/// Validate function-tool definitions in their wire form and return them unchanged.
///
/// Each entry must be `{"type": "function", "function": {name, description, parameters}}`
/// where `parameters` has `type: "object"`, a `properties` map and, if present, a
/// `required` list of declared property names.
pub fn validate_tools(tools: &[Value]) -> Result<Vec<Value>, BootstrapError> {
    for (index, tool) in tools.iter().enumerate() {
        check_tool(tool).map_err(|reason| BootstrapError::InvalidTool { index, reason })?;
    }
    Ok(tools.to_vec())
}

fn check_tool(tool: &Value) -> Result<(), String> {
    if tool.get("type").and_then(Value::as_str) != Some("function") {
        return Err("must be of type \"function\"".into());
    }
    let function = tool
        .get("function")
        .filter(|f| f.is_object())
        .ok_or("missing function definition")?;

    let name = function
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or("function name must be a non-empty string")?;
    if !function.get("description").is_some_and(Value::is_string) {
        return Err(format!("'{}': description must be a string", name));
    }

    let params = function
        .get("parameters")
        .filter(|p| p.is_object())
        .ok_or_else(|| format!("'{}': parameters must be an object", name))?;
    if params.get("type").and_then(Value::as_str) != Some("object") {
        return Err(format!("'{}': parameters.type must be \"object\"", name));
    }
    let properties = params
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| format!("'{}': parameters.properties must be an object", name))?;

    if let Some(required) = params.get("required") {
        let list = required
            .as_array()
            .ok_or_else(|| format!("'{}': parameters.required must be a list", name))?;
        for field in list {
            let field = field
                .as_str()
                .ok_or_else(|| format!("'{}': required entries must be strings", name))?;
            if !properties.contains_key(field) {
                return Err(format!(
                    "'{}': required field '{}' is not a declared property",
                    name, field
                ));
            }
        }
    }
    Ok(())
}

/// Build the creation request from resolved options and the registry.
pub fn assistant_config(
    options: &ResolvedOptions,
    registry: &ToolRegistry,
) -> Result<AssistantConfig, BootstrapError> {
    let raw: Vec<Value> = registry
        .definitions()
        .iter()
        .map(ToolDefinition::to_function_json)
        .collect();
    Ok(AssistantConfig {
        model: options.model,
        name: options.name.clone(),
        instructions: options.instructions.clone(),
        tools: validate_tools(&raw)?,
    })
}

/// Create the remote assistant, retrying with capped exponential backoff.
pub async fn create_assistant(
    client: &dyn AssistantsApi,
    registry: &ToolRegistry,
    options: AssistantOptions,
    sleeper: &dyn Sleeper,
) -> Result<AssistantHandle, BootstrapError> {
    let options = options.resolve();
    if options.max_retries == 0 {
        return Err(BootstrapError::InvalidOptions(
            "max_retries must be at least 1".into(),
        ));
    }
    let config = assistant_config(&options, registry)?;
    create_with_config(client, &config, options.max_retries, sleeper).await
}

/// Retry loop over an already validated request.
pub async fn create_with_config(
    client: &dyn AssistantsApi,
    config: &AssistantConfig,
    max_retries: u32,
    sleeper: &dyn Sleeper,
) -> Result<AssistantHandle, BootstrapError> {
    info!("Initializing AI assistant with {} tools", config.tools.len());

    let mut machine = RetryMachine::new(max_retries);
    loop {
        match machine.state() {
            RetryState::Attempting(attempt) => match client.create_assistant(config).await {
                Ok(handle) => {
                    machine.record_success();
                    info!("Assistant created successfully (ID: {})", handle.id);
                    return Ok(handle);
                }
                Err(e) => {
                    error!("Attempt {}/{} failed: {}", attempt, max_retries, e);
                    machine.record_failure(e.to_string());
                }
            },
            RetryState::Waiting { delay, .. } => {
                sleeper.sleep(delay).await;
                machine.resume();
            }
            RetryState::Succeeded | RetryState::Exhausted => break,
        }
    }

    Err(BootstrapError::Exhausted {
        attempts: max_retries,
        last_error: machine.last_error().unwrap_or("unknown error").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::retry::testing::RecordingSleeper;
    use crate::tools::{build_registry, testing};
    use crate::types::{Run, ThreadHandle, ToolResult};
    use anyhow::{anyhow, bail};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` creation calls, then succeeds.
    struct FlakyApi {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyApi {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AssistantsApi for FlakyApi {
        async fn create_assistant(&self, config: &AssistantConfig) -> anyhow::Result<AssistantHandle> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                return Err(anyhow!("simulated failure #{}", n));
            }
            Ok(AssistantHandle {
                id: "asst_123".into(),
                name: config.name.clone(),
                model: config.model.to_string(),
            })
        }
        async fn create_thread(&self) -> anyhow::Result<ThreadHandle> {
            bail!("unused")
        }
        async fn add_message(&self, _: &str, _: &str) -> anyhow::Result<()> {
            bail!("unused")
        }
        async fn create_run(&self, _: &str, _: &str) -> anyhow::Result<Run> {
            bail!("unused")
        }
        async fn retrieve_run(&self, _: &str, _: &str) -> anyhow::Result<Run> {
            bail!("unused")
        }
        async fn submit_tool_outputs(&self, _: &str, _: &str, _: &[ToolResult]) -> anyhow::Result<Run> {
            bail!("unused")
        }
        async fn latest_assistant_message(&self, _: &str) -> anyhow::Result<Option<String>> {
            bail!("unused")
        }
    }

    fn registry() -> ToolRegistry {
        build_registry(&testing::context()).unwrap()
    }

    fn options(max_retries: u32) -> AssistantOptions {
        AssistantOptions {
            max_retries: Some(max_retries),
            instructions: Some("be helpful".into()),
            ..Default::default()
        }
    }

    #[test]
    fn options_merge_over_defaults() {
        let resolved = AssistantOptions {
            name: Some("Custom".into()),
            ..Default::default()
        }
        .resolve();
        assert_eq!(resolved.name, "Custom");
        assert_eq!(resolved.model, AssistantModel::Gpt4Preview);
        assert_eq!(resolved.max_retries, 3);
        assert!(resolved.instructions.starts_with("Welcome"));
    }

    #[test]
    fn model_parsing() {
        assert_eq!("gpt-4".parse::<AssistantModel>().unwrap(), AssistantModel::Gpt4);
        assert!("gpt-5-turbo".parse::<AssistantModel>().is_err());
        assert_eq!(json!(AssistantModel::Gpt35Turbo), json!("gpt-3.5-turbo-1106"));
    }

    #[tokio::test]
    async fn succeeds_when_failures_below_limit() {
        // N < M: succeeds on attempt N + 1.
        for (n, m) in [(0u32, 3u32), (1, 3), (2, 3), (4, 5)] {
            let api = FlakyApi::new(n);
            let sleeper = RecordingSleeper::default();
            let handle = create_assistant(&api, &registry(), options(m), &sleeper)
                .await
                .unwrap();
            assert_eq!(handle.id, "asst_123");
            assert_eq!(api.calls(), n + 1);
            assert_eq!(sleeper.delays_ms().len() as u32, n);
        }
    }

    #[tokio::test]
    async fn delays_follow_capped_backoff() {
        let api = FlakyApi::new(5);
        let sleeper = RecordingSleeper::default();
        create_assistant(&api, &registry(), options(6), &sleeper)
            .await
            .unwrap();
        assert_eq!(sleeper.delays_ms(), vec![1000, 2000, 4000, 8000, 8000]);
    }

    #[tokio::test]
    async fn exhaustion_reports_last_error() {
        let api = FlakyApi::new(3);
        let sleeper = RecordingSleeper::default();
        let err = create_assistant(&api, &registry(), options(3), &sleeper)
            .await
            .unwrap_err();
        assert_eq!(api.calls(), 3);
        assert_eq!(sleeper.delays_ms(), vec![1000, 2000]);
        assert_eq!(
            err.to_string(),
            "Failed to create assistant after 3 attempts. Last error: simulated failure #3"
        );
    }

    #[tokio::test]
    async fn zero_retries_is_rejected_without_network() {
        let api = FlakyApi::new(0);
        let err = create_assistant(&api, &registry(), options(0), &RecordingSleeper::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidOptions(_)));
        assert_eq!(api.calls(), 0);
    }

    struct MalformedTool;

    #[async_trait]
    impl crate::tools::Tool for MalformedTool {
        fn name(&self) -> &str {
            "malformed"
        }
        fn description(&self) -> &str {
            "required is not a list"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"a": {"type": "string"}}, "required": "a"})
        }
        fn category(&self) -> crate::types::ToolCategory {
            crate::types::ToolCategory::Utility
        }
        async fn execute(&self, _args: &Value) -> Result<String, crate::tools::ToolError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn invalid_tool_aborts_before_any_attempt() {
        let api = FlakyApi::new(0);
        let registry = ToolRegistry::new(vec![std::sync::Arc::new(MalformedTool)]).unwrap();
        let err = create_assistant(&api, &registry, options(3), &RecordingSleeper::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidTool { index: 0, .. }));
        assert_eq!(api.calls(), 0);
    }

    fn function_tool(parameters: Value) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": "get_balance",
                "description": "Get balance",
                "parameters": parameters
            }
        })
    }

    #[test]
    fn rejects_missing_function_type() {
        let mut tool = function_tool(json!({"type": "object", "properties": {}}));
        tool.as_object_mut().unwrap().remove("type");
        let err = validate_tools(&[tool]).unwrap_err();
        assert!(err.to_string().contains("type \"function\""));
    }

    #[test]
    fn rejects_non_object_parameters() {
        let tool = function_tool(json!({"type": "array", "properties": {}}));
        let err = validate_tools(&[tool]).unwrap_err();
        assert!(err.to_string().contains("parameters.type"));
    }

    #[test]
    fn rejects_required_that_is_not_a_list() {
        let tool = function_tool(json!({
            "type": "object",
            "properties": {"to": {"type": "string"}},
            "required": "to"
        }));
        let err = validate_tools(&[tool]).unwrap_err();
        assert!(err.to_string().contains("must be a list"));
    }

    #[test]
    fn rejects_required_field_not_declared() {
        let tool = function_tool(json!({
            "type": "object",
            "properties": {},
            "required": ["to"]
        }));
        assert!(validate_tools(&[tool]).is_err());
    }

    #[test]
    fn reports_index_of_bad_tool() {
        let good = function_tool(json!({"type": "object", "properties": {}}));
        let bad = json!({"type": "function"});
        match validate_tools(&[good, bad]).unwrap_err() {
            BootstrapError::InvalidTool { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn request_serializes_model_as_string() {
        let config = assistant_config(&options(3).resolve(), &registry()).unwrap();
        let body = serde_json::to_value(&config).unwrap();
        assert_eq!(body["model"], "gpt-4-1106-preview");
        assert_eq!(body["name"], "SolanaAI");
        assert_eq!(body["tools"].as_array().unwrap().len(), 22);
        assert_eq!(body["tools"][0]["function"]["name"], "get_balance");
    }
}
