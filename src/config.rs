// src/config.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{LabelerError, Result};
use crate::views::KeyMap;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/v1";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Application configuration: where the classification service lives, where
/// the labeling UI listens, and which keys label a message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the classification service; endpoint paths are joined onto it.
    pub api_base: String,
    pub bind_address: String,
    pub port: u16,
    pub keys: KeyMap,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            keys: KeyMap::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file (if any) and environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match config_file_path(&lookup) {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        if let Some(api_base) = lookup("LABELER_API_BASE") {
            config.api_base = api_base;
        }
        if let Some(bind) = lookup("LABELER_BIND_ADDRESS") {
            config.bind_address = bind;
        }
        if let Some(port) = lookup("LABELER_PORT") {
            config.port = port.trim().parse().map_err(|_| {
                LabelerError::Config(format!("LABELER_PORT is not a valid port: '{}'", port))
            })?;
        }
        if let Some(key) = lookup("LABELER_YES_KEY") {
            config.keys.yes = single_char("LABELER_YES_KEY", &key)?;
        }
        if let Some(key) = lookup("LABELER_NO_KEY") {
            config.keys.no = single_char("LABELER_NO_KEY", &key)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(LabelerError::Config(format!(
                "api_base must be an http:// or https:// URL, got '{}'",
                self.api_base
            )));
        }
        if !self.keys.yes.is_ascii_alphabetic() || !self.keys.no.is_ascii_alphabetic() {
            return Err(LabelerError::Config(format!(
                "label keys must be letters, got '{}' and '{}'",
                self.keys.yes, self.keys.no
            )));
        }
        if self.keys.yes.eq_ignore_ascii_case(&self.keys.no) {
            return Err(LabelerError::Config(format!(
                "yes and no keys must differ, both are '{}'",
                self.keys.yes
            )));
        }
        Ok(())
    }
}

/// `LABELER_CONFIG` wins; otherwise the per-user config file is used when present.
fn config_file_path<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("LABELER_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("labeler").join("config.toml"))
        .filter(|path| path.is_file())
}

fn single_char(name: &str, value: &str) -> Result<char> {
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(LabelerError::Config(format!(
            "{} must be a single character, got '{}'",
            name, value
        ))),
    }
}
