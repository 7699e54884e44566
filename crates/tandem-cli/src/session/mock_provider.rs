use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use tandem::models::message::Message;
use tandem::models::tool::Tool;
use tandem::providers::base::{OutputSchema, Provider, Usage};

// Trimmed copy of the scripted provider inside tandem, whose own version is not
// reachable from this crate's tests. What the session tests really want is a mock
// agent, but that needs an agent trait first.
// TODO: introduce an agent trait, mock the agent in session tests, and drop this file.

/// Provider that replays a scripted sequence of responses
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
}

impl MockProvider {
    /// Script the responses to replay, in order
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
        }
    }

    fn next_response(&self) -> (Message, Usage) {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // An exhausted script answers with an empty assistant message
            (Message::assistant().with_text(""), Usage::default())
        } else {
            (responses.remove(0), Usage::default())
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        Ok(self.next_response())
    }

    async fn complete_structured(
        &self,
        _system: &str,
        _messages: &[Message],
        _output: &OutputSchema,
    ) -> Result<(Message, Usage)> {
        Ok(self.next_response())
    }
}
