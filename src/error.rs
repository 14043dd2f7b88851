//! Error types for tool execution, provider exchanges and the generation loop.

use thiserror::Error;

/// Failure of a single tool binding.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The argument payload does not parse into the tool's parameter shape.
    #[error("invalid tool arguments: {0}")]
    Decode(#[source] serde_json::Error),

    /// The tool's own logic failed.
    #[error("tool execution failed: {0:#}")]
    Execution(#[source] anyhow::Error),

    /// The tool's result could not be serialized.
    #[error("failed to serialize tool result: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failure of a provider exchange.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse inference response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("inference response contained no choices")]
    EmptyResponse,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Rejected tool registration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool name must not be empty")]
    EmptyName,

    #[error("tool '{0}' is already registered")]
    Duplicate(String),
}

/// Failure of a whole generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("chat completion error: {0}")]
    Provider(#[from] ProviderError),

    #[error("tool {name} not found")]
    ToolNotFound { name: String },

    #[error("tool {name} failed: {source}")]
    Tool {
        name: String,
        #[source]
        source: ToolError,
    },

    #[error("exceeded completion call roundtrip limit {limit}")]
    RoundtripLimitExceeded { limit: u32 },

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerateError {
    /// Name of the tool that caused the failure, if any.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::ToolNotFound { name } | Self::Tool { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether the failure was a tool argument payload that did not parse.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Tool {
                source: ToolError::Decode(_),
                ..
            }
        )
    }

    /// Whether the failure came from a tool's own logic.
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            Self::Tool {
                source: ToolError::Execution(_),
                ..
            }
        )
    }
}
