use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main warroom configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub model: ModelConfig,
    pub console: ConsoleConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Which completion service answers for the personas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI chat completions (needs OPENAI_API_KEY)
    #[default]
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAi,
    /// Offline stand-in, no network
    Echo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    /// Model name sent to the provider
    pub name: String,
    pub endpoint: String,
    pub temperature: f32,
    /// Request timeout; `None` waits forever
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Pause after each printed reply
    pub pacing_ms: u64,
    /// Pause after the incident report
    pub intro_pacing_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Knowledge base JSON; the built-in one is used when unset
    pub knowledge_base: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::OpenAi,
            name: "gpt-4".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            temperature: 0.7,
            timeout_secs: Some(120),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 1000,
            intro_pacing_ms: 1500,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check WARROOM_CONFIG env var
        if let Ok(env_path) = std::env::var("WARROOM_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from WARROOM_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try WARROOM_DIR/warroom.yaml, then ~/.config/warroom/warroom.yaml
        let search_dirs = Self::search_dirs(
            std::env::var_os("WARROOM_DIR").map(PathBuf::from),
            dirs::config_dir(),
        );
        for dir in search_dirs {
            let dir_config = dir.join("warroom.yaml");
            if dir_config.exists() {
                match Self::load_from_file(&dir_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", dir_config.display(), e);
                    }
                }
            }
        }

        // Try ./warroom.yaml (for development)
        let local_config = PathBuf::from("warroom.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Directories searched for `warroom.yaml`, most specific first
    fn search_dirs(warroom_dir: Option<PathBuf>, config_dir: Option<PathBuf>) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = warroom_dir.into_iter().collect();
        if let Some(user_dir) = config_dir.map(|d| d.join("warroom"))
            && !found.contains(&user_dir)
        {
            found.push(user_dir);
        }
        found
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the warroom directory (config file, .env)
    pub fn warroom_dir() -> PathBuf {
        std::env::var("WARROOM_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("warroom"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
