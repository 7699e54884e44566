use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{OutputSchema, Provider, Usage};
use super::configs::OllamaProviderConfig;
use super::utils::{
    get_usage, messages_to_openai_spec, openai_response_to_message, tools_to_openai_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3.2";

/// Chat completions against a local Ollama server
pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // Cold model loads can take minutes
            .build()?;

        Ok(Self { client, config })
    }

    /// The request body shared by plain and structured completions
    fn base_payload(&self, system: &str, messages: &[Message]) -> Value {
        let mut messages_array = vec![json!({
            "role": "system",
            "content": system
        })];
        messages_array.extend(messages_to_openai_spec(messages));

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array
        });

        let body = payload.as_object_mut().unwrap();
        if let Some(temp) = self.config.temperature {
            body.insert("temperature".into(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            body.insert("max_tokens".into(), json!(tokens));
        }

        payload
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        // Ollama serves an OpenAI compatible chat endpoint
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        tracing::debug!(model = %self.config.model, "posting chat completion");

        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response.json().await?);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(anyhow!("Server error: {}", status));
        }
        Err(anyhow!("Request failed with {}\nPayload: {}", status, payload))
    }

    fn parse_response(response: Value) -> Result<(Message, Usage)> {
        let message = openai_response_to_message(response.clone())?;
        let usage = get_usage(&response)?;

        Ok((message, usage))
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut payload = self.base_payload(system, messages);

        if !tools.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".into(), json!(tools_to_openai_spec(tools)?));
        }

        let response = self.post(payload).await?;
        Self::parse_response(response)
    }

    async fn complete_structured(
        &self,
        system: &str,
        messages: &[Message],
        output: &OutputSchema,
    ) -> Result<(Message, Usage)> {
        let mut payload = self.base_payload(system, messages);

        payload.as_object_mut().unwrap().insert(
            "response_format".into(),
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": output.name,
                    "strict": true,
                    "schema": output.schema
                }
            }),
        );

        let response = self.post(payload).await?;
        Self::parse_response(response)
    }
}
