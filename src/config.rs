use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default OpenAI API origin.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
/// Default OpenAI chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// Default Gemini API origin.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
/// Default location of the persisted preferences file.
pub const DEFAULT_PREFERENCES_PATH: &str = ".docsum/preferences.json";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarizer.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Origin of the OpenAI API (scheme + host, no path).
    pub openai_base_url: String,
    /// Chat model requested from OpenAI.
    pub openai_model: String,
    /// Origin of the Gemini API (scheme + host, no path).
    pub gemini_base_url: String,
    /// Gemini model used in the `generateContent` path.
    pub gemini_model: String,
    /// JSON file holding the persisted preferences.
    pub preferences_path: PathBuf,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Directory that receives downloaded summaries in CLI mode.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
            server_port: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();
        Ok(Self {
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            preferences_path: get("DOCSUM_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_path),
            server_port: get("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            output_dir: get("DOCSUM_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        openai_base_url = %config.openai_base_url,
        openai_model = %config.openai_model,
        gemini_base_url = %config.gemini_base_url,
        gemini_model = %config.gemini_model,
        preferences_path = %config.preferences_path.display(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
