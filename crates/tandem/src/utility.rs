use async_trait::async_trait;
use chrono::Utc;
use indoc::indoc;
use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::systems::System;

/// A small system of side-effect-free tools, handy for demos and tests
pub struct UtilitySystem {
    tools: Vec<Tool>,
    instructions: String,
}

impl Default for UtilitySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl UtilitySystem {
    pub fn new() -> Self {
        let word_count_tool = Tool::new(
            "word_count",
            "Count the words in a piece of text",
            json!({
                "type": "object",
                "required": ["text"],
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The text whose words should be counted"
                    }
                }
            }),
        );

        let calculate_tool = Tool::new(
            "calculate",
            "Perform a basic arithmetic operation on two numbers",
            json!({
                "type": "object",
                "required": ["operation", "x", "y"],
                "properties": {
                    "operation": {
                        "enum": ["add", "subtract", "multiply", "divide"],
                        "description": "The operation to perform"
                    },
                    "x": {
                        "type": "number",
                        "description": "The first operand"
                    },
                    "y": {
                        "type": "number",
                        "description": "The second operand"
                    }
                }
            }),
        );

        let current_time_tool = Tool::new(
            "current_time",
            "Get the current date and time in UTC",
            json!({
                "type": "object",
                "required": [],
                "properties": {}
            }),
        );

        let instructions = indoc! {r#"
            The utility system provides small deterministic helpers. Use word_count
            rather than counting words yourself, calculate for arithmetic, and
            current_time whenever the current date or time matters to the answer.
        "#}
        .to_string();

        Self {
            tools: vec![word_count_tool, calculate_tool, current_time_tool],
            instructions,
        }
    }

    fn require_str<'a>(args: &'a Value, key: &str) -> AgentResult<&'a str> {
        args.get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::InvalidParameters(format!("Missing '{}' parameter", key)))
    }

    fn require_f64(args: &Value, key: &str) -> AgentResult<f64> {
        args.get(key)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| AgentError::InvalidParameters(format!("Missing '{}' parameter", key)))
    }

    fn word_count(&self, args: &Value) -> AgentResult<Vec<Content>> {
        let text = Self::require_str(args, "text")?;
        let count = text.split_whitespace().count();
        Ok(vec![Content::text(count.to_string())])
    }

    fn calculate(&self, args: &Value) -> AgentResult<Vec<Content>> {
        let operation = Self::require_str(args, "operation")?;
        let x = Self::require_f64(args, "x")?;
        let y = Self::require_f64(args, "y")?;

        let result = match operation {
            "add" => x + y,
            "subtract" => x - y,
            "multiply" => x * y,
            "divide" => {
                if y == 0.0 {
                    return Err(AgentError::ExecutionError("Division by zero".to_string()));
                }
                x / y
            }
            other => {
                return Err(AgentError::InvalidParameters(format!(
                    "Unknown operation '{}'",
                    other
                )))
            }
        };

        Ok(vec![Content::text(result.to_string())])
    }

    fn current_time(&self) -> AgentResult<Vec<Content>> {
        Ok(vec![Content::text(Utc::now().to_rfc3339())])
    }
}

#[async_trait]
impl System for UtilitySystem {
    fn name(&self) -> &str {
        "utility"
    }

    fn description(&self) -> &str {
        "Side-effect-free helpers for text, arithmetic, and time"
    }

    fn instructions(&self) -> &str {
        &self.instructions
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "word_count" => self.word_count(&tool_call.arguments),
            "calculate" => self.calculate(&tool_call.arguments),
            "current_time" => self.current_time(),
            _ => Err(AgentError::ToolNotFound(tool_call.name)),
        }
    }
}
