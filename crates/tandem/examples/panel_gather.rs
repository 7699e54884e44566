//! Fan a text out to three judges at once, then aggregate their verdicts.
//!
//! Requires OPENAI_API_KEY (OPENAI_HOST and OPENAI_MODEL are optional).
//! Run with: `cargo run --example panel_gather`

use anyhow::Result;
use std::env;
use tandem::panel::Panel;
use tandem::providers::configs::{OpenAiProviderConfig, ProviderConfig};
use tandem::providers::factory::get_provider;
use tandem::providers::openai::{OPEN_AI_HOST, OPEN_AI_MODEL};

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
    let panel = Panel::new(get_provider(config)?);

    let text = "There are athletes that consume enhancing drugs to improve their \
        performance. For example, EPO is a drug that is used to improve performance.";
    let report = panel.run(text).await?;

    for (i, evaluation) in report.evaluations.iter().enumerate() {
        println!(
            "judge {}: appropriate={} ({})",
            i + 1,
            evaluation.is_appropriate,
            evaluation.explanation
        );
    }
    println!();
    println!("verdict: appropriate={}", report.verdict.is_appropriate);
    println!("{}", report.verdict.summary);
    Ok(())
}
