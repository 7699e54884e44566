use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::content::{Content, TextContent};
use super::role::Role;
use super::tool::ToolCall;
use crate::errors::AgentResult;

/// A tool call the model asked for, or the error from parsing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: AgentResult<ToolCall>,
}

/// What execution produced for the request with the same id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub tool_result: AgentResult<Vec<Content>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One item inside a message, either plain text or a tool exchange
pub enum MessageContent {
    Text(TextContent),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn tool_request(id: impl Into<String>, tool_call: AgentResult<ToolCall>) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call,
        })
    }

    pub fn tool_response(id: impl Into<String>, tool_result: AgentResult<Vec<Content>>) -> Self {
        MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            tool_result,
        })
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        match self {
            MessageContent::ToolRequest(tool_request) => Some(tool_request),
            _ => None,
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        match self {
            MessageContent::ToolResponse(tool_response) => Some(tool_response),
            _ => None,
        }
    }

    pub fn as_tool_response_text(&self) -> Option<String> {
        let tool_response = self.as_tool_response()?;
        let contents = tool_response.tool_result.as_ref().ok()?;

        let texts: Vec<&str> = contents
            .iter()
            .filter_map(|content| content.as_text())
            .collect();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }

    /// The inner text when this item is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

impl From<Content> for MessageContent {
    fn from(content: Content) -> Self {
        let Content::Text(text) = content;
        MessageContent::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single turn in the conversation, from either side of it
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    fn new(role: Role) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Start an empty user message stamped with the current time
    pub fn user() -> Self {
        Self::new(Role::User)
    }

    /// Start an empty assistant message stamped with the current time
    pub fn assistant() -> Self {
        Self::new(Role::Assistant)
    }

    /// Append one content item, builder style
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Append a text item
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Append a tool request under the given call id
    pub fn with_tool_request(
        self,
        id: impl Into<String>,
        tool_call: AgentResult<ToolCall>,
    ) -> Self {
        self.with_content(MessageContent::tool_request(id, tool_call))
    }

    /// Append a tool response matching a prior request id
    pub fn with_tool_response(
        self,
        id: impl Into<String>,
        result: AgentResult<Vec<Content>>,
    ) -> Self {
        self.with_content(MessageContent::tool_response(id, result))
    }

    /// Concatenate all text content in the message
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| content.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the message carries any tool requests
    pub fn has_tool_request(&self) -> bool {
        self.content
            .iter()
            .any(|content| content.as_tool_request().is_some())
    }
}
