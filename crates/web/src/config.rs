use anyhow::{Context, Result};
use extractor::extractors::openrouter_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openrouter_api_key: String,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub rules_path: PathBuf,
    pub prompts_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "5000")
                .parse()
                .context("PORT must be a number")?,
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY")
                .context("Cannot load OPENROUTER_API_KEY env variable")?,
            openrouter_model: env_or("OPENROUTER_MODEL", DEFAULT_MODEL),
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", DEFAULT_BASE_URL),
            rules_path: env_or("OCR_CONFIG", "config.json").into(),
            prompts_dir: env_or("OCR_PROMPTS_DIR", "prompts").into(),
            static_dir: env_or("STATIC_DIR", "static").into(),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
