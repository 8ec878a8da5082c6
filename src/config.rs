//! Settings for wiring a history and driver together.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::api::CompletionOptions;
use crate::completion::DriverConfig;
use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings stored in a TOML file.
///
/// ```toml
/// model = "gpt-3.5-turbo"
/// max_tokens = 4096
/// max_function_hops = 8
///
/// [completion]
/// temperature = 0.2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Model id, also used to pick the tokenizer
    pub model: String,
    /// Token budget of the conversation history
    pub max_tokens: usize,
    pub base_url: String,
    pub max_function_hops: Option<usize>,
    pub completion: CompletionOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 4096,
            base_url: "https://api.openai.com".to_string(),
            max_function_hops: DriverConfig::default().max_function_hops,
            completion: CompletionOptions::default(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            max_function_hops: self.max_function_hops,
        }
    }

    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv(API_KEY_ENV))
    }
}

/// Load environment variables from .env files.
/// First loads from ~/.env (home directory), then from ./.env (project directory).
/// Project directory values take precedence over home directory values.
pub fn load_env_file() {
    if let Some(home) = dirs::home_dir() {
        dotenv::from_path(home.join(".env")).ok();
    }

    dotenv::dotenv().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FunctionCallMode;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.completion.max_tokens, 1024);
        assert_eq!(settings.driver_config(), DriverConfig::default());
    }

    #[test]
    fn partial_completion_table_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            model = "gpt-4o"
            max_function_hops = 3

            [completion]
            temperature = 0.2
            function_call = "none"
            "#,
        )
        .unwrap();

        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.max_tokens, 4096);
        assert_eq!(settings.driver_config().max_function_hops, Some(3));
        assert_eq!(settings.completion.temperature, 0.2);
        assert_eq!(settings.completion.top_p, 1.0);
        assert_eq!(settings.completion.function_call, Some(FunctionCallMode::None));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(
            Settings::from_toml("max_tokens = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            Settings::load("/nonexistent/funcall/settings.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
