use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A capability advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// Name the model calls it by
    pub name: String,
    /// What the tool does, written for the model
    pub description: String,
    /// A JSON schema for the parameters the tool accepts
    pub input_schema: Value,
}

impl Tool {
    /// Describe a tool by name, purpose, and parameter schema
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// One concrete invocation the model asked for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Which tool to run
    pub name: String,
    /// The arguments for the execution
    pub arguments: Value,
}

impl ToolCall {
    /// Name the tool to run and the arguments to run it with
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
