use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::DEFAULT_BASE_URL;

/// Returns the path to the optional config file (`config.toml`).
///
/// 1. `TASKWEB_CONFIG` environment variable.
/// 2. `~/.config/taskweb/config.toml` (on Linux).
/// 3. `./config.toml` (fallback).
pub fn config_path() -> PathBuf {
    std::env::var("TASKWEB_CONFIG").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("taskweb");
        p.push("config.toml");
        p
    })
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the task server.
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config { api_url: DEFAULT_BASE_URL.to_string() }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Applies the command-line/environment value, which wins over the file.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn flag_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = \"http://tasks.internal:9000\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://tasks.internal:9000");

        let config = config.with_api_url(Some("http://127.0.0.1:1".into()));
        assert_eq!(config.api_url, "http://127.0.0.1:1");
    }
}
