//! Drive the tool loop end to end against the utility system.
//!
//! Requires OPENAI_API_KEY (OPENAI_HOST and OPENAI_MODEL are optional).
//! Run with: `cargo run --example tool_loop`

use anyhow::Result;
use futures::StreamExt;
use std::env;
use tandem::agent::Agent;
use tandem::models::message::{Message, MessageContent};
use tandem::providers::configs::{OpenAiProviderConfig, ProviderConfig};
use tandem::providers::factory::get_provider;
use tandem::providers::openai::{OPEN_AI_HOST, OPEN_AI_MODEL};
use tandem::utility::UtilitySystem;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = ProviderConfig::OpenAi(OpenAiProviderConfig {
        host: env::var("OPENAI_HOST").unwrap_or_else(|_| OPEN_AI_HOST.to_string()),
        api_key: env::var("OPENAI_API_KEY")?,
        model: env::var("OPENAI_MODEL").unwrap_or_else(|_| OPEN_AI_MODEL.to_string()),
        temperature: None,
        max_tokens: None,
    });

    let mut agent = Agent::new(get_provider(config)?);
    agent.add_system(Box::new(UtilitySystem::new()));

    let messages = vec![Message::user().with_text(
        "How many words are in the sentence 'the quick brown fox jumps over the lazy dog', \
         and what is that count multiplied by 7?",
    )];

    let mut stream = agent.reply(&messages).await?;
    while let Some(message) = stream.next().await {
        for content in &message?.content {
            match content {
                MessageContent::Text(text) => println!("{}", text.text),
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(call) => println!("-> {} {}", call.name, call.arguments),
                    Err(e) => println!("-> bad tool call: {}", e),
                },
                MessageContent::ToolResponse(response) => match &response.tool_result {
                    Ok(contents) => {
                        for content in contents {
                            if let Some(text) = content.as_text() {
                                println!("<- {}", text);
                            }
                        }
                    }
                    Err(e) => println!("<- {}", e),
                },
            }
        }
    }
    Ok(())
}
