//! Name-keyed tool registry.

use super::traits::{Tool, ToolDefinition};
use crate::error::RegistryError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Tools available to one or more generation calls, keyed by name.
///
/// Read-only while a generation runs; cloning shares the bindings.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("registered", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `tool` under `name`.
    ///
    /// Fails on an empty name or a name that is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        tool: impl Tool + 'static,
    ) -> Result<(), RegistryError> {
        self.register_shared(name, Arc::new(tool))
    }

    /// Register an already shared binding.
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        tool: Arc<dyn Tool>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_tool(
        mut self,
        name: impl Into<String>,
        tool: impl Tool + 'static,
    ) -> Result<Self, RegistryError> {
        self.register(name, tool)?;
        Ok(self)
    }

    /// Build a registry from `(name, binding)` pairs.
    pub fn try_from_iter<I, S>(iter: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, Arc<dyn Tool>)>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (name, tool) in iter {
            registry.register_shared(name, tool)?;
        }
        Ok(registry)
    }

    /// Look up a tool by name. The returned handle stays valid after the
    /// registry is dropped.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the declarations sent to the model, sorted by name so that
    /// requests are stable across calls.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .iter()
            .map(|(name, tool)| ToolDefinition {
                name: name.clone(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}
