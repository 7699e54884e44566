use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{OutputSchema, Provider, Usage};

/// One recorded provider invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<Message>,
}

/// Provider that replays a scripted sequence of responses and records every call
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Script the responses to replay, in order
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All invocations recorded so far, in order
    pub fn call_log(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// A handle onto the call log that survives moving the provider into an agent
    pub fn call_log_handle(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        Arc::clone(&self.calls)
    }

    fn next_response(&self, system: &str, messages: &[Message]) -> (Message, Usage) {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            messages: messages.to_vec(),
        });

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
        system: &str,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        Ok(self.next_response(system, messages))
    }

    async fn complete_structured(
        &self,
        system: &str,
        messages: &[Message],
        _output: &OutputSchema,
    ) -> Result<(Message, Usage)> {
        Ok(self.next_response(system, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;

    #[test]
    fn test_responses_replay_in_order_and_calls_are_recorded() {
        let provider = MockProvider::new(vec![
            Message::assistant().with_text("first"),
            Message::assistant().with_text("second"),
        ]);
        let conversation = vec![Message::user().with_text("hello")];

        let (one, _) = tokio_test::block_on(provider.complete("sys", &conversation, &[])).unwrap();
        let (two, _) = tokio_test::block_on(provider.complete("sys", &conversation, &[])).unwrap();
        assert_eq!(one.text(), "first");
        assert_eq!(two.text(), "second");

        // An exhausted script keeps answering with empty assistant turns
        let (spent, _) =
            tokio_test::block_on(provider.complete("sys", &conversation, &[])).unwrap();
        assert_eq!(spent.role, Role::Assistant);
        assert_eq!(spent.text(), "");

        let calls = provider.call_log();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].system, "sys");
        assert_eq!(calls[0].messages, conversation);
    }
}
