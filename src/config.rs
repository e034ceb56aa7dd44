use std::fmt;
use std::path::PathBuf;

use crate::recognize::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is missing or blank.
    MissingVar(&'static str),
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => {
                write!(f, "required environment variable {name} is not set")
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Recognition service settings.
pub struct SttConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Spoken language the service is told to expect.
    pub language: String,
}

pub struct Config {
    pub bot_token: String,
    pub stt: SttConfig,
    /// Directory for log files. Defaults to the current directory.
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            var(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let bot_token = required("BOT_API_TOKEN")?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = bot_token.split(':').collect();
        if token_parts.len() != 2
            || token_parts[0].parse::<u64>().is_err()
            || token_parts[1].is_empty()
        {
            return Err(ConfigError::Validation(
                "BOT_API_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        Ok(Self {
            bot_token,
            stt: SttConfig {
                api_url: var("STT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                api_key: required("GROQ_API_KEY")?,
                model: var("STT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                language: var("SPEECH_LANGUAGE").unwrap_or_else(|| "ru".to_string()),
            },
            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}
