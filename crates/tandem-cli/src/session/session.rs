use anyhow::Result;
use futures::StreamExt;

use crate::prompt::{InputType, Prompt};
use crate::reviewer::TerminalApprover;
use tandem::agent::Agent;
use tandem::approval::{ApprovalOptions, Supervised};
use tandem::models::message::Message;
use tandem::models::role::Role;
use tandem::utility::UtilitySystem;

pub struct Session {
    agent: Box<Agent>,
    prompt: Box<dyn Prompt>,
    approval: Option<ApprovalOptions>,
}

impl Session {
    pub fn new(
        agent: Box<Agent>,
        prompt: Box<dyn Prompt>,
        approval: Option<ApprovalOptions>,
    ) -> Self {
        Session {
            agent,
            prompt,
            approval,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.setup_session();

        let mut messages = Vec::new();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        messages.push(Message::user().with_text(content));
                    }
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }

            self.prompt.show_busy();
            self.agent_process_messages(&mut messages).await;
            self.prompt.hide_busy();
        }
        self.close_session();
        Ok(())
    }

    async fn agent_process_messages(&mut self, messages: &mut Vec<Message>) {
        let mut stream = match self.agent.reply(messages).await {
            Ok(stream) => stream,
            Err(e) => {
                eprintln!("Could not start the reply stream: {}", e);
                return;
            }
        };
        loop {
            tokio::select! {
                response = stream.next() => {
                    match response {
                        Some(Ok(message)) => {
                            messages.push(message.clone());
                            self.prompt.render(Box::new(message.clone()));
                        }
                        Some(Err(e)) => {
                            // TODO: route errors through the prompt renderer instead of stderr
                            eprintln!("Error: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    drop(stream);
                    // Rewind to before the interrupted request: discard assistant
                    // turns until the most recent user message is popped too.
                    while let Some(message) = messages.pop() {
                        if message.role == Role::User {
                            break;
                        }
                    }

                    self.prompt.render(raw_message(
                        " Interrupted. Rewinding to before your last message...\n",
                    ));
                    break;
                }
            }
        }
    }

    fn setup_session(&mut self) {
        let system = UtilitySystem::new();
        match self.approval {
            Some(options) => {
                let reviewer = TerminalApprover::new(options);
                self.agent.add_system(Box::new(
                    Supervised::new(system, Box::new(reviewer)).with_options(options),
                ));
                self.prompt.render(raw_message(
                    "Connected the utility system. Tool calls will pause for review.\n",
                ));
            }
            None => {
                self.agent.add_system(Box::new(system));
                self.prompt
                    .render(raw_message("Connected the utility system.\n"));
            }
        }

        self.prompt.ready();
    }

    fn close_session(&mut self) {
        self.prompt.close();
    }
}

fn raw_message(content: &str) -> Box<Message> {
    Box::new(Message::assistant().with_text(content))
}
