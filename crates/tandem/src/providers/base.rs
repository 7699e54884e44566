use anyhow::Result;
use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// A JSON schema the model's reply must conform to
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    /// Derive the schema from a deserializable type
    pub fn new<T: JsonSchema>(name: impl Into<String>) -> Self {
        let schema = serde_json::to_value(schema_for!(T)).unwrap();
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// A model backend the agent can speak through
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message in the exchange
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)>;

    /// Generate the next message, constrained to the given output schema
    async fn complete_structured(
        &self,
        system: &str,
        messages: &[Message],
        output: &OutputSchema,
    ) -> Result<(Message, Usage)>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_round_trips_through_json() -> Result<()> {
        let usage = Usage::new(Some(10), Some(20), Some(30));

        // Field names are part of the wire shape
        let value = serde_json::to_value(&usage)?;
        assert_eq!(
            value,
            json!({"input_tokens": 10, "output_tokens": 20, "total_tokens": 30})
        );

        let back: Usage = serde_json::from_value(value)?;
        assert_eq!(back.total_tokens, Some(30));
        Ok(())
    }

    #[test]
    fn test_usage_defaults_to_unknown_counts() {
        let usage = Usage::default();
        assert_eq!(usage.input_tokens, None);
        assert_eq!(usage.output_tokens, None);
        assert_eq!(usage.total_tokens, None);
    }

    #[test]
    fn test_output_schema_from_type() {
        #[derive(JsonSchema)]
        struct Verdict {
            #[allow(dead_code)]
            passed: bool,
            #[allow(dead_code)]
            reason: String,
        }

        let output = OutputSchema::new::<Verdict>("verdict");
        assert_eq!(output.name, "verdict");
        assert_eq!(output.schema["properties"]["passed"]["type"], "boolean");
        assert_eq!(output.schema["properties"]["reason"]["type"], "string");
    }
}
