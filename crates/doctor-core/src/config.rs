use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::client::DEFAULT_ENDPOINT;

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "DOCTOR_AI_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            store_path: None,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Endpoint to submit to: the command-line value, then `DOCTOR_AI_ENDPOINT`,
    /// then the config file, then the default.
    pub fn resolved_endpoint(&self, cli: Option<String>) -> String {
        choose_endpoint(cli, std::env::var(ENDPOINT_ENV).ok(), self.endpoint.clone())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("doctor-ai"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

/// First non-empty source wins.
pub fn choose_endpoint(
    cli: Option<String>,
    env: Option<String>,
    file: Option<String>,
) -> String {
    [cli, env, file]
        .into_iter()
        .flatten()
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
