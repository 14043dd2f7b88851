//! Typed tool bindings.
//!
//! [`FnTool`] turns a closure over a typed parameter struct into a [`Tool`]:
//! the struct's schema is advertised to the model, incoming arguments are
//! parsed into it, and the closure's result is serialized back to JSON.

use super::schema::derive_schema;
use super::traits::Tool;
use crate::error::ToolError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::{ready, Future, Ready};
use std::marker::PhantomData;
use tracing::debug;

/// A tool backed by an async closure taking the parameter shape `P`.
pub struct FnTool<P, F> {
    description: String,
    execute: F,
    _params: PhantomData<fn(P)>,
}

impl<P, F, Fut, R> FnTool<P, F>
where
    F: Fn(P) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    R: Serialize + 'static,
{
    /// Bind `execute` under the given description.
    pub fn new(description: impl Into<String>, execute: F) -> Self {
        Self {
            description: description.into(),
            execute,
            _params: PhantomData,
        }
    }
}

/// Bind a synchronous closure as a tool.
///
/// The closure runs inline on the generation task, so it should not block
/// for long.
pub fn blocking<P, R, G>(
    description: impl Into<String>,
    execute: G,
) -> FnTool<P, impl Fn(P) -> Ready<anyhow::Result<R>> + Send + Sync>
where
    G: Fn(P) -> anyhow::Result<R> + Send + Sync,
    R: Serialize + 'static,
{
    FnTool {
        description: description.into(),
        execute: move |params: P| ready(execute(params)),
        _params: PhantomData,
    }
}

impl<P, F> fmt::Debug for FnTool<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("description", &self.description)
            .field("params", &std::any::type_name::<P>())
            .finish()
    }
}

#[async_trait]
impl<P, F, Fut, R> Tool for FnTool<P, F>
where
    P: DeserializeOwned + JsonSchema + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    R: Serialize + 'static,
{
    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> serde_json::Value {
        derive_schema::<P>()
    }

    async fn execute(&self, args: &str) -> Result<String, ToolError> {
        let params: P = serde_json::from_str(args).map_err(ToolError::Decode)?;
        let output = (self.execute)(params)
            .await
            .map_err(ToolError::Execution)?;
        let encoded = serde_json::to_string(&output).map_err(ToolError::Encode)?;
        debug!("Tool produced {} bytes", encoded.len());
        Ok(encoded)
    }
}
