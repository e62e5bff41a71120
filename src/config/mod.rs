//! Configuration for Trellis.
//!
//! One small TOML file, `config.toml` in the data directory:
//!
//! ```toml
//! api-key = "..."
//! model = "gemini-3-pro-preview"
//! ```
//!
//! Precedence for the API key: `GEMINI_API_KEY` env var > config file.
//! A missing or unreadable config file resolves to defaults; it is never
//! an error to run without one (only AI commands need the key).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ai::gemini::DEFAULT_MODEL;

/// Environment variable holding the suggestion-service API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Config file name within the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// User configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Suggestion-service API key (env var takes precedence)
    pub api_key: Option<String>,

    /// Model name for suggestion requests
    pub model: Option<String>,
}

impl Config {
    /// Load the config file from the data directory.
    ///
    /// Absent file → defaults; unreadable or malformed file → defaults
    /// with a stderr warning.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Warning: failed to read {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: failed to parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Resolve the API key: env var first, then config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key_from(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Resolve the model name, falling back to the default.
    pub fn resolve_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }
}
