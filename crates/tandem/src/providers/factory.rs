use super::{
    base::Provider, configs::ProviderConfig, ollama::OllamaProvider, openai::OpenAiProvider,
};
use anyhow::Result;
use strum_macros::EnumIter;

#[derive(EnumIter, Debug, Clone, Copy, PartialEq)]
pub enum ProviderType {
    OpenAi,
    Ollama,
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    let provider: Box<dyn Provider + Send + Sync> = match config {
        ProviderConfig::OpenAi(config) => Box::new(OpenAiProvider::new(config)?),
        ProviderConfig::Ollama(config) => Box::new(OllamaProvider::new(config)?),
    };
    Ok(provider)
}
