use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_SPOTIFY_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub anthropic_url: String,
    pub spotify_url: String,
    pub spotify_access_token: Option<String>,
    pub spotify_user_id: Option<String>,
    pub http_timeout: Duration,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    Config::from_lookup(|key| std::env::var(key).ok())
}

impl Config {
    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key =
            non_empty("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY is not set")?;

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            anthropic_api_key,
            anthropic_model: non_empty("ANTHROPIC_MODEL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            anthropic_url: non_empty("ANTHROPIC_API_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_URL.to_string()),
            spotify_url: non_empty("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_URL.to_string()),
            spotify_access_token: non_empty("SPOTIFY_ACCESS_TOKEN"),
            spotify_user_id: non_empty("SPOTIFY_USER_ID"),
            http_timeout: Duration::from_secs(http_timeout),
        })
    }
}
