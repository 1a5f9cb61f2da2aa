// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelerError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LabelerError {
    /// HTTP status of the failed call, when the failure came from the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            LabelerError::ApiError { status, .. } => Some(*status),
            LabelerError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LabelerError>;
