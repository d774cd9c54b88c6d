// Tool trait, registry and schema helpers

use crate::protocol::{CallToolResult, ToolSchema};
use kuaidi100_sdk::Kuaidi100Error;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Why a tool call did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Upstream(#[from] Kuaidi100Error),
}

/// Deserialize tool arguments, applying the declared defaults.
pub fn parse_arguments<T: DeserializeOwned>(
    tool: &'static str,
    arguments: serde_json::Value,
) -> Result<T, ToolError> {
    // A call without arguments is treated as an empty object so that
    // all-optional tools still deserialize.
    let arguments = if arguments.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments { tool, source })
}

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError>;
}

/// Tool registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    // registration order, for a stable tools/list
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. A tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, in registration order
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up a tool and run it.
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(arguments).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_string_with_default(description: &str, default: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description,
        "default": default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct EchoTool {
        name: &'static str,
    }

    #[derive(Debug, Deserialize)]
    struct EchoArgs {
        text: String,
        #[serde(default)]
        suffix: String,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.name.to_string(),
                title: None,
                description: "Echo the text back".to_string(),
                input_schema: json_schema_object(
                    serde_json::json!({
                        "text": json_schema_string("Text to echo"),
                        "suffix": json_schema_string_with_default("Appended text", "")
                    }),
                    vec!["text"],
                ),
            }
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult, ToolError> {
            let args: EchoArgs = parse_arguments("echo", arguments)?;
            Ok(CallToolResult::text(format!("{}{}", args.text, args.suffix)))
        }
    }

    #[tokio::test]
    async fn test_register_and_call() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" }));

        assert!(registry.contains("echo"));
        assert_eq!(registry.len(), 1);

        let result = registry
            .call("echo", serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(result, CallToolResult::text("hi"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.call("missing", serde_json::json!({})).await.unwrap_err();

        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "missing"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" }));

        let err = registry.call("echo", serde_json::Value::Null).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { tool: "echo", .. }));
        assert!(err.to_string().contains("text"));
    }

    #[tokio::test]
    async fn test_wrong_argument_type() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" }));

        let err = registry
            .call("echo", serde_json::json!({"text": 42}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_list_schemas_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { name: "zeta" }));
        registry.register(Arc::new(EchoTool { name: "alpha" }));
        registry.register(Arc::new(EchoTool { name: "zeta" }));

        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_schema_helpers() {
        let schema = json_schema_object(
            serde_json::json!({"weight": json_schema_string_with_default("kg", "1")}),
            vec![],
        );

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["weight"]["default"], "1");
        assert_eq!(schema["required"], serde_json::json!([]));
    }
}
