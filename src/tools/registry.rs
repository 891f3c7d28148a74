//! Name-keyed tool registry, built once at startup and shared read-only.

use crate::tools::schema::validate_args;
use crate::tools::{Tool, ToolDefinition, ToolError};
use crate::types::{ToolCall, ToolResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
}

/// Registered tools in registration order, with a lookup index by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build the registry. Two tools with the same name are rejected.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            if index.insert(tool.name().to_string(), i).is_some() {
                return Err(RegistryError::DuplicateName(tool.name().to_string()));
            }
        }
        Ok(Self { tools, index })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Look up, validate and run a tool by name.
    pub async fn invoke(&self, name: &str, args: &Value) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::not_found(format!("Tool '{}' is not available", name)))?;
        validate_args(&tool.parameters_schema(), args)?;
        tool.execute(args).await
    }

    /// Run a model-requested tool call. Failures become an unsuccessful result,
    /// never an error, so the conversation keeps going.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        info!("Tool: {}({})", call.name, call.arguments);

        match self.invoke(&call.name, &call.arguments).await {
            Ok(output) => ToolResult {
                tool_call_id: call.id.clone(),
                output,
                success: true,
            },
            Err(e) => {
                warn!("Tool {} failed: {}", call.name, e);
                ToolResult {
                    tool_call_id: call.id.clone(),
                    output: e.to_output(),
                    success: false,
                }
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .finish()
    }
}
