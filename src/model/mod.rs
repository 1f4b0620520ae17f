//! Language model seam
//!
//! Personas only need prompt in, text out. Providers:
//! - `openai`: chat completions over HTTPS
//! - `echo`: offline stand-in that acknowledges the last user line

use eyre::{Context, Result};
use std::fs;
use std::sync::Arc;

use crate::config::{Config, ModelConfig, ModelProvider};

pub mod echo;
pub mod openai;

pub use echo::EchoModel;
pub use openai::OpenAiModel;

/// A text completion service
pub trait LanguageModel: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Complete `prompt`. Errors cover transport and provider failures alike.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Build the configured model
pub fn from_config(config: &ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    let model: Arc<dyn LanguageModel> = match config.provider {
        ModelProvider::OpenAi => {
            let api_key = get_api_key(openai::API_KEY_VAR)?;
            Arc::new(OpenAiModel::new(config, api_key))
        }
        ModelProvider::Echo => Arc::new(EchoModel),
    };
    log::info!("Using model provider {}", model.name());
    Ok(model)
}

fn get_api_key(env_var: &str) -> Result<String> {
    if let Ok(key) = std::env::var(env_var)
        && !key.trim().is_empty()
    {
        return Ok(key);
    }

    // Fall back to <warroom dir>/.env
    let env_file = Config::warroom_dir().join(".env");
    if env_file.exists() {
        let content = fs::read_to_string(&env_file).context("Failed to read .env file")?;
        if let Some(value) = find_env_value(&content, env_var) {
            return Ok(value);
        }
    }

    eyre::bail!(
        "Missing API key: {} not found in environment or {}",
        env_var,
        env_file.display()
    )
}

fn find_env_value(content: &str, env_var: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.is_empty())
        .filter_map(|line| line.split_once('='))
        .find(|(key, _)| key.trim() == env_var)
        .map(|(_, value)| value.trim().trim_matches('"').trim_matches('\'').to_string())
}
