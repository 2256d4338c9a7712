//! Destination identifiers: a literal name or an indirect reference.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, Result};

/// `{ name }`, `{ ssm }` or `{ stack: { name, output } }` as written in a
/// fixture file. When several are present the first non-empty one in that
/// order wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ssm: Option<String>,
    #[serde(default)]
    pub stack: Option<StackOutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StackOutputConfig {
    pub name: String,
    pub output: String,
}

/// The normalized form of a [`ResourceConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    Name(String),
    Parameter(String),
    StackOutput { stack: String, output: String },
}

impl ResourceConfig {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn reference(&self) -> Result<ResourceRef> {
        if let Some(name) = self.name.as_ref().filter(|s| !s.is_empty()) {
            return Ok(ResourceRef::Name(name.clone()));
        }
        if let Some(param) = self.ssm.as_ref().filter(|s| !s.is_empty()) {
            return Ok(ResourceRef::Parameter(param.clone()));
        }
        match &self.stack {
            Some(stack) => Ok(ResourceRef::StackOutput {
                stack: stack.name.clone(),
                output: stack.output.clone(),
            }),
            None => Err(FixtureError::Validation(
                "resource must define one of: name, ssm, stack".to_string(),
            )),
        }
    }
}

/// Looks up indirect resource references.
///
/// Real implementations talk to a parameter store or a deployment stack;
/// those live outside this crate.
pub trait ResourceResolver {
    fn parameter(&self, name: &str) -> Result<Option<String>>;

    fn stack_outputs(&self, stack: &str) -> Result<HashMap<String, String>>;

    fn resolve(&self, config: &ResourceConfig) -> Result<String> {
        match config.reference()? {
            ResourceRef::Name(name) => Ok(name),
            ResourceRef::Parameter(name) => self
                .parameter(&name)?
                .ok_or(FixtureError::Unresolved {
                    kind: "parameter",
                    name,
                }),
            ResourceRef::StackOutput { stack, output } => {
                let outputs = self.stack_outputs(&stack)?;
                match outputs.get(&output) {
                    Some(value) if !value.is_empty() => Ok(value.clone()),
                    _ => Err(FixtureError::MissingStackOutput { stack, output }),
                }
            }
        }
    }
}

/// In-memory resolver with fixed parameters and stack outputs.
///
/// The default instance knows nothing, so only literal names resolve.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    parameters: HashMap<String, String>,
    stacks: HashMap<String, HashMap<String, String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_stack_output(mut self, stack: &str, output: &str, value: &str) -> Self {
        self.stacks
            .entry(stack.to_string())
            .or_default()
            .insert(output.to_string(), value.to_string());
        self
    }
}

impl ResourceResolver for StaticResolver {
    fn parameter(&self, name: &str) -> Result<Option<String>> {
        Ok(self.parameters.get(name).cloned())
    }

    fn stack_outputs(&self, stack: &str) -> Result<HashMap<String, String>> {
        self.stacks.get(stack).cloned().ok_or_else(|| FixtureError::Unresolved {
            kind: "stack",
            name: stack.to_string(),
        })
    }
}
