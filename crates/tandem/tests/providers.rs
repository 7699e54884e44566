use anyhow::Result;
use dotenv::dotenv;
use tandem::models::message::Message;
use tandem::models::tool::Tool;
use tandem::panel::Evaluation;
use tandem::providers::base::{OutputSchema, Provider};
use tandem::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig};
use tandem::providers::factory::get_provider;
use tandem::providers::ollama::OLLAMA_MODEL;

/// Runs the same behavioral checks against whichever provider it is given
struct LiveSuite {
    provider: Box<dyn Provider + Send + Sync>,
}

impl LiveSuite {
    fn connect(config: ProviderConfig) -> Result<Self> {
        let provider = get_provider(config)?;
        Ok(LiveSuite { provider })
    }

    async fn check_basic_reply(&self) -> Result<()> {
        let message = Message::user().with_text("Say hello in one short sentence.");

        let (reply, _) = self
            .provider
            .complete("You are a concise assistant.", &[message], &[])
            .await?;

        assert!(!reply.text().is_empty(), "Expected a text reply");
        assert!(
            !reply.has_tool_request(),
            "Expected no tool requests when no tools are on offer"
        );

        Ok(())
    }

    async fn check_tool_usage(&self) -> Result<()> {
        let word_count = Tool::new(
            "word_count",
            "Count the words in a piece of text",
            serde_json::json!({
                "type": "object",
                "required": ["text"],
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The text whose words should be counted"
                    }
                }
            }),
        );

        let message = Message::user().with_text("How many words are in 'the quick brown fox'?");

        let (reply, _) = self
            .provider
            .complete(
                "You are a careful assistant. Use a tool whenever one applies.",
                &[message],
                &[word_count],
            )
            .await?;

        assert!(
            reply.has_tool_request(),
            "Expected a tool request in the reply"
        );

        Ok(())
    }

    async fn check_structured_output(&self) -> Result<()> {
        let output = OutputSchema::new::<Evaluation>("evaluation");
        let message =
            Message::user().with_text("The beach was lovely and everyone had a great time.");

        let (reply, _) = self
            .provider
            .complete_structured(
                "Evaluate whether the text is appropriate for a general audience.",
                &[message],
                &output,
            )
            .await?;

        let evaluation: Evaluation = serde_json::from_str(&reply.text())?;
        assert!(
            evaluation.is_appropriate,
            "Expected an appropriate verdict: {}",
            evaluation.explanation
        );

        Ok(())
    }

    /// Walk the full suite in order
    async fn run(&self) -> Result<()> {
        println!("Checking the basic reply path...");
        self.check_basic_reply().await?;
        println!("Checking tool usage...");
        self.check_tool_usage().await?;
        println!("Checking structured output...");
        self.check_structured_output().await?;
        Ok(())
    }
}

fn load_env() {
    // Picks up OPENAI_API_KEY and friends from a local .env during development
    dotenv().ok();
}

#[tokio::test]
async fn test_openai_provider() -> Result<()> {
    load_env();

    // Live API test, needs credentials in the environment
    if std::env::var("OPENAI_API_KEY").is_err() || std::env::var("OPENAI_MODEL").is_err() {
        println!("Skipping OpenAI tests, no credentials in the environment");
        return Ok(());
    }

    let config = ProviderConfig::OpenAi(OpenAiProviderConfig {
        host: "https://api.openai.com".to_string(),
        api_key: std::env::var("OPENAI_API_KEY")?,
        model: std::env::var("OPENAI_MODEL")?,
        temperature: None,
        max_tokens: None,
    });

    LiveSuite::connect(config)?.run().await
}

// Runs against a locally reachable Ollama server
#[tokio::test]
async fn test_ollama_provider() -> Result<()> {
    load_env();

    // Skip unless a server is explicitly configured
    if std::env::var("OLLAMA_HOST").is_err() {
        println!("Skipping Ollama tests, no server configured");
        return Ok(());
    }

    let config = ProviderConfig::Ollama(OllamaProviderConfig {
        host: std::env::var("OLLAMA_HOST")?,
        model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| OLLAMA_MODEL.to_string()),
        temperature: None,
        max_tokens: None,
    });

    LiveSuite::connect(config)?.run().await
}
