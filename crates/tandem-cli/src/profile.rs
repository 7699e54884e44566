use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::inputs::env_or_prompt;
use tandem::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig};
use tandem::providers::factory::ProviderType;
use tandem::providers::ollama::{OLLAMA_HOST, OLLAMA_MODEL};
use tandem::providers::openai::{OPEN_AI_HOST, OPEN_AI_MODEL};

/// Saved provider and model choice, keyed by profile name on disk
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Profile {
    pub provider: String,
    pub model: String,
}

/// On-disk layout of profiles.json
#[derive(Serialize, Deserialize)]
struct ProfileStore {
    profiles: HashMap<String, Profile>,
}

pub const PROVIDER_OPEN_AI: &str = "openai";
pub const PROVIDER_OLLAMA: &str = "ollama";
pub const PROFILE_DEFAULT_NAME: &str = "default";

pub fn select_provider_lists() -> Vec<(&'static str, String, &'static str)> {
    ProviderType::iter()
        .map(|provider| match provider {
            ProviderType::OpenAi => (PROVIDER_OPEN_AI, PROVIDER_OPEN_AI.to_string(), "GPT models"),
            ProviderType::Ollama => (
                PROVIDER_OLLAMA,
                PROVIDER_OLLAMA.to_string(),
                "Local models served by Ollama",
            ),
        })
        .collect()
}

pub fn recommended_model(provider_name: &str) -> &'static str {
    match provider_name {
        PROVIDER_OLLAMA => OLLAMA_MODEL,
        _ => OPEN_AI_MODEL,
    }
}

pub fn profile_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not find the home directory"))?;
    let config_dir = home_dir.join(".config").join("tandem");
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }
    Ok(config_dir.join("profiles.json"))
}

fn load_profiles_from(path: &Path) -> Result<HashMap<String, Profile>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let store: ProfileStore = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(store.profiles)
}

fn save_profile_to(path: &Path, name: &str, profile: Profile) -> Result<()> {
    let mut profiles = load_profiles_from(path)?;
    profiles.insert(name.to_string(), profile);
    let content = serde_json::to_string_pretty(&ProfileStore { profiles })?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_profiles() -> Result<HashMap<String, Profile>> {
    load_profiles_from(&profile_path()?)
}

pub fn save_profile(name: &str, profile: Profile) -> Result<()> {
    save_profile_to(&profile_path()?, name, profile)
}

pub fn find_existing_profile(name: &str) -> Option<Profile> {
    load_profiles().ok()?.get(name).cloned()
}

/// The named profile, or openai defaults so commands work before `tandem configure` has run
pub fn load_profile_or_default(name: Option<String>) -> Profile {
    let name = name.unwrap_or_else(|| PROFILE_DEFAULT_NAME.to_string());
    find_existing_profile(&name).unwrap_or_else(|| Profile {
        provider: PROVIDER_OPEN_AI.to_string(),
        model: OPEN_AI_MODEL.to_string(),
    })
}

pub fn set_provider_config(provider_name: &str, model: String) -> Result<ProviderConfig> {
    match provider_name.to_lowercase().as_str() {
        PROVIDER_OPEN_AI => {
            let api_key = env_or_prompt("OPENAI_API_KEY", "Enter your OpenAI API key:", true);
            Ok(ProviderConfig::OpenAi(OpenAiProviderConfig {
                host: std::env::var("OPENAI_HOST").unwrap_or_else(|_| String::from(OPEN_AI_HOST)),
                api_key,
                model,
                temperature: None,
                max_tokens: None,
            }))
        }
        PROVIDER_OLLAMA => Ok(ProviderConfig::Ollama(OllamaProviderConfig {
            host: std::env::var("OLLAMA_HOST").unwrap_or_else(|_| String::from(OLLAMA_HOST)),
            model,
            temperature: None,
            max_tokens: None,
        })),
        _ => Err(anyhow!("Unknown provider: {}", provider_name)),
    }
}
