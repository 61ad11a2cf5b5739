//! Configuration loader for the credential tooling. Settings come from an
//! optional JSON file named by `AGENT_CREDENTIALS_CONFIG`; without one the
//! built-in defaults apply.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::crypto::formats::DEFAULT_ITERATIONS;

/// Environment variable holding the path to the JSON config file.
pub const CONFIG_ENV_VAR: &str = "AGENT_CREDENTIALS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("iterations must be at least 1")]
    InvalidIterations,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CredentialConfig {
    /// PBKDF2 iteration count for newly minted credentials.
    pub iterations: u32,
    /// Default `env_logger` filter; `RUST_LOG` still wins when set.
    pub log_level: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            log_level: "info".to_string(),
        }
    }
}

impl CredentialConfig {
    /// Loads the file named by [`CONFIG_ENV_VAR`], or returns defaults when the
    /// variable is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => load_config(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        Ok(self)
    }
}

/// Reads and validates a JSON config file. Missing keys take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<CredentialConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let config: CredentialConfig = serde_json::from_str(&raw_json)
        .map_err(|e| ConfigError::Parse(format!("{e}")))?;
    config.validate()
}
