use anyhow::{anyhow, Result};
use futures::stream::BoxStream;
use serde_json::json;
use std::collections::HashMap;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::{Tool, ToolCall};
use crate::prompt_template::load_prompt_file;
use crate::providers::base::Provider;
use crate::systems::System;

/// Tool rounds allowed in a single reply before the loop is cut off
const DEFAULT_MAX_TOOL_TURNS: usize = 25;

/// Joins a system's name to one of its tool names in the flattened
/// tool list shown to the model
const TOOL_PREFIX_SEPARATOR: &str = "__";

/// Pairs a model provider with the systems whose tools the model may call
pub struct Agent {
    systems: Vec<Box<dyn System>>,
    provider: Box<dyn Provider>,
    max_tool_turns: usize,
}

impl Agent {
    /// Build an agent backed by the given provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            systems: Vec::new(),
            provider,
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
        }
    }

    /// Register a system whose tools the agent may call
    pub fn add_system(&mut self, system: Box<dyn System>) {
        self.systems.push(system);
    }

    /// Cap the number of tool rounds in a single reply
    pub fn set_max_tool_turns(&mut self, limit: usize) {
        self.max_tool_turns = limit;
    }

    /// Every tool of every system, renamed to "{system}__{tool}" so the
    /// model can address any of them without collisions between systems
    fn get_prefixed_tools(&self) -> Vec<Tool> {
        self.systems
            .iter()
            .flat_map(|system| {
                system.tools().iter().map(|tool| {
                    Tool::new(
                        format!("{}{}{}", system.name(), TOOL_PREFIX_SEPARATOR, tool.name),
                        &tool.description,
                        tool.input_schema.clone(),
                    )
                })
            })
            .collect()
    }

    /// Split a prefixed name back into the owning system and the local
    /// tool name. Names without a separator resolve to nothing.
    fn resolve_tool<'a>(&'a self, prefixed_name: &'a str) -> Option<(&'a dyn System, &'a str)> {
        let (system_name, tool_name) = prefixed_name.split_once(TOOL_PREFIX_SEPARATOR)?;
        self.systems
            .iter()
            .find(|system| system.name() == system_name)
            .map(|system| (system.as_ref(), tool_name))
    }

    /// Forward one call to the system that owns it, stripped of its prefix
    async fn dispatch_tool_call(
        &self,
        tool_call: AgentResult<ToolCall>,
    ) -> AgentResult<Vec<Content>> {
        let call = tool_call?;
        let (system, tool_name) = self
            .resolve_tool(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tracing::debug!(system = system.name(), tool = tool_name, "dispatching tool call");
        system.call(ToolCall::new(tool_name, call.arguments)).await
    }

    /// Run a round of tool requests concurrently, collecting every output
    /// into one user message keyed by the ids the model chose
    async fn run_tool_round(&self, requests: &[&ToolRequest]) -> Message {
        let futures: Vec<_> = requests
            .iter()
            .map(|request| self.dispatch_tool_call(request.tool_call.clone()))
            .collect();
        let outputs = futures::future::join_all(futures).await;

        let mut message = Message::user();
        for (request, output) in requests.iter().zip(outputs) {
            message = message.with_tool_response(request.id.clone(), output);
        }
        message
    }

    fn get_system_prompt(&self) -> AgentResult<String> {
        let systems: Vec<_> = self
            .systems
            .iter()
            .map(|system| {
                json!({
                    "name": system.name(),
                    "description": system.description(),
                    "instructions": system.instructions(),
                })
            })
            .collect();

        let context = HashMap::from([("systems", systems)]);
        load_prompt_file("system.md", &context).map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Stream the agent's reply to the given conversation.
    /// Assistant turns and the tool outputs that answer them arrive as separate messages.
    pub async fn reply(&self, messages: &[Message]) -> Result<BoxStream<'_, Result<Message>>> {
        let mut messages = messages.to_vec();
        let tools = self.get_prefixed_tools();
        let system_prompt = self.get_system_prompt()?;

        Ok(Box::pin(async_stream::try_stream! {
            let mut tool_turns = 0;
            loop {
                let (response, _) = self
                    .provider
                    .complete(&system_prompt, &messages, &tools)
                    .await?;

                yield response.clone();

                // This ensures the above message is delivered before the
                // potentially long-running tool calls start processing
                tokio::task::yield_now().await;

                // The presence of tool requests decides whether the loop continues
                let requests: Vec<&ToolRequest> = response.content
                    .iter()
                    .filter_map(|content| content.as_tool_request())
                    .collect();

                if requests.is_empty() {
                    // A reply without tool requests is final
                    break;
                }

                tool_turns += 1;
                if tool_turns > self.max_tool_turns {
                    Err(anyhow!(
                        "Aborting reply after {} tool rounds without a final answer",
                        self.max_tool_turns
                    ))?;
                }

                let tool_message = self.run_tool_round(&requests).await;
                yield tool_message.clone();

                messages.push(response);
                messages.push(tool_message);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageContent;
    use crate::providers::mock::MockProvider;
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use serde_json::json;

    // Mock system exposing a single uppercasing tool
    struct MockSystem {
        name: String,
        tools: Vec<Tool>,
    }

    impl MockSystem {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                tools: vec![Tool::new(
                    "shout",
                    "Uppercase the input text",
                    json!({
                        "type": "object",
                        "properties": {"text": {"type": "string"}},
                        "required": ["text"]
                    }),
                )],
            }
        }
    }

    #[async_trait]
    impl System for MockSystem {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "A mock system used in agent tests"
        }

        fn instructions(&self) -> &str {
            "Call shout to uppercase text"
        }

        fn tools(&self) -> &[Tool] {
            &self.tools
        }

        async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
            match tool_call.name.as_str() {
                "shout" => Ok(vec![Content::text(
                    tool_call.arguments["text"]
                        .as_str()
                        .unwrap_or("")
                        .to_uppercase(),
                )]),
                _ => Err(AgentError::ToolNotFound(tool_call.name)),
            }
        }
    }

    /// An agent over the scripted responses with one "test" system attached
    fn shouting_agent(script: Vec<Message>) -> Agent {
        let mut agent = Agent::new(Box::new(MockProvider::new(script)));
        agent.add_system(Box::new(MockSystem::new("test")));
        agent
    }

    /// Drain the reply stream for a single user prompt
    async fn collect_reply(agent: &Agent, prompt: &str) -> Result<Vec<Message>> {
        let conversation = vec![Message::user().with_text(prompt)];
        let mut stream = agent.reply(&conversation).await?;
        let mut messages = Vec::new();
        while let Some(message) = stream.try_next().await? {
            messages.push(message);
        }
        Ok(messages)
    }

    #[test]
    fn test_tools_are_prefixed_per_system() {
        let mut agent = Agent::new(Box::new(MockProvider::new(vec![])));
        agent.add_system(Box::new(MockSystem::new("first")));
        agent.add_system(Box::new(MockSystem::new("second")));

        let names: Vec<_> = agent
            .get_prefixed_tools()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(names, vec!["first__shout", "second__shout"]);
    }

    #[test]
    fn test_resolve_tool_splits_on_the_first_separator() {
        let mut agent = Agent::new(Box::new(MockProvider::new(vec![])));
        agent.add_system(Box::new(MockSystem::new("test")));

        let (system, tool) = agent.resolve_tool("test__shout").unwrap();
        assert_eq!(system.name(), "test");
        assert_eq!(tool, "shout");

        assert!(agent.resolve_tool("shout").is_none());
        assert!(agent.resolve_tool("other__shout").is_none());
    }

    #[test]
    fn test_dispatch_reports_unknown_tools() {
        let agent = shouting_agent(vec![]);

        let err = tokio_test::block_on(
            agent.dispatch_tool_call(Ok(ToolCall::new("missing", json!({})))),
        )
        .unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_simple_response() -> Result<()> {
        let response = Message::assistant().with_text("Good morning to you too!");
        let agent = Agent::new(Box::new(MockProvider::new(vec![response.clone()])));

        let messages = collect_reply(&agent, "Good morning").await?;

        assert_eq!(messages, vec![response]);
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_call() -> Result<()> {
        let agent = shouting_agent(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new("test__shout", json!({"text": "make this loud"}))),
            ),
            Message::assistant().with_text("It says: MAKE THIS LOUD"),
        ]);

        let messages = collect_reply(&agent, "Please shout for me").await?;

        // One round: the request, its response, then the closing text
        assert_eq!(messages.len(), 3);
        assert!(messages[0].has_tool_request());
        assert_eq!(
            messages[1].content[0].as_tool_response_text(),
            Some("MAKE THIS LOUD".to_string())
        );
        assert_eq!(
            messages[2].content[0],
            MessageContent::text("It says: MAKE THIS LOUD")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_tool() -> Result<()> {
        let agent = shouting_agent(vec![
            Message::assistant().with_tool_request("1", Ok(ToolCall::new("not_a_tool", json!({})))),
            Message::assistant().with_text("That tool does not exist"),
        ]);

        let messages = collect_reply(&agent, "Try a tool that is not there").await?;

        // The unknown tool still gets a response message, carrying the error
        assert_eq!(messages.len(), 3);
        assert!(messages[0].has_tool_request());
        assert!(messages[1].content[0]
            .as_tool_response()
            .unwrap()
            .tool_result
            .is_err());
        assert_eq!(
            messages[2].content[0],
            MessageContent::text("That tool does not exist")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_tool_calls() -> Result<()> {
        let agent = shouting_agent(vec![
            Message::assistant()
                .with_tool_request("1", Ok(ToolCall::new("test__shout", json!({"text": "abc"}))))
                .with_tool_request("2", Ok(ToolCall::new("test__shout", json!({"text": "xyz"})))),
            Message::assistant().with_text("Both done"),
        ]);

        let messages = collect_reply(&agent, "Shout twice").await?;

        // Both requests land in one round, answered by a single response message
        assert_eq!(messages.len(), 3);
        assert!(messages[0].has_tool_request());

        // Every request is answered by exactly one response, in order
        let response_ids: Vec<_> = messages[1]
            .content
            .iter()
            .filter_map(|c| c.as_tool_response())
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(response_ids, vec!["1", "2"]);
        assert_eq!(messages[2].content[0], MessageContent::text("Both done"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rounds_extend_the_conversation() -> Result<()> {
        let provider = MockProvider::new(vec![
            Message::assistant()
                .with_tool_request("1", Ok(ToolCall::new("test__shout", json!({"text": "hi"})))),
            Message::assistant().with_text("HI it is"),
        ]);
        let call_log = provider.call_log_handle();
        let mut agent = Agent::new(Box::new(provider));
        agent.add_system(Box::new(MockSystem::new("test")));

        collect_reply(&agent, "Shout hi").await?;

        let calls = call_log.lock().unwrap();
        assert_eq!(calls.len(), 2);

        // The registered system shows up in the rendered system prompt
        assert!(calls[0].system.contains("## test"));

        // The second completion sees the request and its tool output appended
        assert_eq!(calls[0].messages.len(), 1);
        assert_eq!(calls[1].messages.len(), 3);
        assert!(calls[1].messages[1].has_tool_request());
        assert_eq!(
            calls[1].messages[2].content[0].as_tool_response_text(),
            Some("HI".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_turn_limit() -> Result<()> {
        // A provider that always asks for another tool call never terminates
        // on its own, so the turn cap has to cut the reply off
        let looping: Vec<Message> = (0..4)
            .map(|i| {
                Message::assistant().with_tool_request(
                    i.to_string(),
                    Ok(ToolCall::new("test__shout", json!({"text": "again"}))),
                )
            })
            .collect();
        let mut agent = shouting_agent(looping);
        agent.set_max_tool_turns(2);

        let initial_messages = vec![Message::user().with_text("Loop forever")];
        let mut stream = agent.reply(&initial_messages).await?;

        let mut yielded = 0;
        let mut saw_error = false;
        loop {
            match stream.try_next().await {
                Ok(Some(_)) => yielded += 1,
                Ok(None) => break,
                Err(e) => {
                    saw_error = true;
                    assert!(e.to_string().contains("tool rounds"));
                    break;
                }
            }
        }

        // Two full rounds of request + response, then the request that trips the cap
        assert_eq!(yielded, 5);
        assert!(saw_error);
        Ok(())
    }
}
