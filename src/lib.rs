//! Toolgen — tool-calling text generation for chat-completion models.
//!
//! A [`Generator`] sends a system and user prompt to a model together with
//! the declarations of every tool in a [`ToolRegistry`], runs the tools the
//! model asks for, feeds their results back and repeats until the model
//! answers in plain text or the round-trip ceiling is hit.

pub mod agent;
pub mod config;
pub mod error;
pub mod provider;
pub mod tools;
pub mod types;

pub use agent::{generate, Generator, GeneratorOptions, ToolErrorPolicy};
pub use error::{GenerateError, ProviderError, RegistryError, ToolError};
pub use provider::{ChatProvider, ChatRequest, OpenAiClient};
pub use tools::{FnTool, Tool, ToolDefinition, ToolRegistry};
pub use types::{ChatMessage, ChatRole, Generation, InferenceResponse, ToolCall};
