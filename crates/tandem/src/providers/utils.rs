use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use super::base::Usage;
use crate::errors::AgentError;
use crate::models::message::{Message, MessageContent};
use crate::models::tool::{Tool, ToolCall};

/// A tool-role entry answering the call with the given id
fn tool_output(id: &str, content: impl Serialize) -> Value {
    json!({
        "role": "tool",
        "content": content,
        "tool_call_id": id
    })
}

/// Convert messages into the OpenAI chat format, expanding tool results into
/// their own tool-role entries
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut spec = Vec::new();

    for message in messages {
        let mut text_parts: Vec<&str> = Vec::new();
        let mut tool_calls = Vec::new();
        let mut tool_entries = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        text_parts.push(&text.text);
                    }
                }
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => tool_calls.push(json!({
                        "id": request.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&tool_call.name),
                            "arguments": tool_call.arguments.to_string(),
                        }
                    })),
                    Err(e) => {
                        tool_entries.push(tool_output(&request.id, format!("Error: {}", e)));
                    }
                },
                MessageContent::ToolResponse(response) => match &response.tool_result {
                    Ok(contents) => tool_entries.push(tool_output(&response.id, contents)),
                    Err(e) => {
                        // Failed tool results still go back as tool output, so the model sees the error text
                        tool_entries.push(tool_output(
                            &response.id,
                            format!("The tool call failed with the following error:\n{}", e),
                        ));
                    }
                },
            }
        }

        let mut entry = json!({ "role": message.role });
        if !text_parts.is_empty() {
            entry["content"] = json!(text_parts.join("\n"));
        }
        if !tool_calls.is_empty() {
            entry["tool_calls"] = json!(tool_calls);
        }

        // Messages reduced to nothing, such as a lone failed request, are dropped
        if entry.get("content").is_some() || entry.get("tool_calls").is_some() {
            spec.push(entry);
        }
        spec.extend(tool_entries);
    }

    spec
}

/// Convert tool definitions into OpenAI function specifications
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut specs = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        specs.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(specs)
}

/// Parse an OpenAI chat completion into a Message
pub fn openai_response_to_message(response: Value) -> Result<Message> {
    let reply = response["choices"][0]["message"].clone();

    let mut content = Vec::new();
    if let Some(text) = reply.get("content").and_then(|text| text.as_str()) {
        content.push(MessageContent::text(text));
    }

    for tool_call in reply
        .get("tool_calls")
        .and_then(|calls| calls.as_array())
        .into_iter()
        .flatten()
    {
        content.push(parse_tool_call(tool_call));
    }

    Ok(content
        .into_iter()
        .fold(Message::assistant(), Message::with_content))
}

/// One entry of the response's tool_calls array becomes a tool request,
/// carrying the error inline when the name or arguments don't parse
fn parse_tool_call(raw: &Value) -> MessageContent {
    let id = raw["id"].as_str().unwrap_or_default().to_string();
    let name = raw["function"]["name"].as_str().unwrap_or_default();
    let arguments = raw["function"]["arguments"].as_str().unwrap_or_default();

    if !is_valid_function_name(name) {
        let error = AgentError::ToolNotFound(format!(
            "Function name '{}' contains invalid characters, expected to match [a-zA-Z0-9_-]+",
            name
        ));
        return MessageContent::tool_request(id, Err(error));
    }

    match serde_json::from_str::<Value>(arguments) {
        Ok(params) => MessageContent::tool_request(id, Ok(ToolCall::new(name, params))),
        Err(e) => {
            let error = AgentError::InvalidParameters(format!(
                "Could not parse arguments for tool call {}: {}",
                id, e
            ));
            MessageContent::tool_request(id, Err(error))
        }
    }
}

/// Token counts from a chat completion's usage block.
///
/// Servers that omit the total still get one, summed from the parts when
/// both are present.
pub fn get_usage(response: &Value) -> Result<Usage> {
    let Some(usage) = response.get("usage") else {
        return Err(anyhow!("Response carried no usage data"));
    };

    let count = |field: &str| usage.get(field).and_then(|v| v.as_i64()).map(|v| v as i32);

    let input_tokens = count("prompt_tokens");
    let output_tokens = count("completion_tokens");
    let total_tokens = count("total_tokens").or_else(|| match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Ok(Usage::new(input_tokens, output_tokens, total_tokens))
}

/// Replace anything outside [a-zA-Z0-9_-] so the name passes OpenAI validation
fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded: {0}")]
pub struct ContextLengthExceededError(String);

/// Error codes OpenAI reports when the conversation no longer fits the model
const CONTEXT_LENGTH_CODES: [&str; 2] = ["context_length_exceeded", "string_above_max_length"];

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if !CONTEXT_LENGTH_CODES.contains(&code) {
        return None;
    }

    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error")
        .to_string();
    Some(ContextLengthExceededError(message))
}
