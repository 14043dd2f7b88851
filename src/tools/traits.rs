//! Tool trait definition.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A callable capability the model can invoke by name.
///
/// Names live in the [`ToolRegistry`](super::ToolRegistry), so the same
/// binding can be registered under whatever name a session needs.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters(&self) -> serde_json::Value;

    /// Execute the tool with the serialized arguments sent by the model.
    ///
    /// `args` is untrusted model output and may be malformed.
    async fn execute(&self, args: &str) -> Result<String, ToolError>;
}
