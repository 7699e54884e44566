use async_trait::async_trait;

use crate::errors::AgentResult;
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

/// A collection of tools the agent can drive on the model's behalf
#[async_trait]
pub trait System: Send + Sync {
    /// Name used to prefix this system's tools
    fn name(&self) -> &str;

    /// Short description surfaced to the model
    fn description(&self) -> &str;

    /// Usage guidance folded into the system prompt
    fn instructions(&self) -> &str;

    /// The tools this system exposes
    fn tools(&self) -> &[Tool];

    /// Execute one of this system's tools
    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>>;
}
