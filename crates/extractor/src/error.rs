use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OcrError>;

/// Invalid normalization configuration. Fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate key '{key}' in {section}")]
    DuplicateKey { section: &'static str, key: String },

    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Replacement '{template}' is malformed: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Replacement for '{pattern}' references unknown group '{group}'")]
    UnknownGroup { pattern: String, group: String },
}

/// The model response could not be turned into an extraction result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No valid JSON found in model response: {snippet}")]
    NoJson { snippet: String },

    #[error("Model response has an unexpected shape: {reason}")]
    MalformedPayload { reason: String },

    #[error("Entry {index} in 'numbers' is malformed: {reason}")]
    MalformedItem { index: usize, reason: String },
}

/// Failures of the remote model call.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response format from model API: {0}")]
    Format(String),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Image payload is empty")]
    EmptyImage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shortens a model response for inclusion in error context.
pub(crate) fn snippet(text: &str) -> String {
    const MAX_CHARS: usize = 120;

    let mut chars = text.chars();
    let head: String = chars.by_ref().take(MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
