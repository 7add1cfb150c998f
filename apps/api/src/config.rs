use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

/// Application configuration loaded from environment variables.
///
/// The Gemini API key is optional at startup: a missing key is
/// reported as a configuration error on the first gateway call instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Idle time after which a coaching session is discarded.
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            llm_timeout_secs: 120,
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl_secs: 30 * 60,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY").or_else(|| optional_env("API_KEY")),
            gemini_base_url: optional_env("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            max_upload_bytes: parse_env::<usize>("MAX_UPLOAD_MB", defaults.max_upload_bytes >> 20)?
                .saturating_mul(1024 * 1024),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.session_ttl_secs, 1800);
    }

    #[test]
    fn test_parse_env_falls_back_and_rejects_garbage() {
        // Unique keys so parallel tests never race on the same variable.
        assert_eq!(parse_env("CAREERPATH_TEST_UNSET_PORT", 9000u16).unwrap(), 9000);

        std::env::set_var("CAREERPATH_TEST_BAD_PORT", "eighty");
        assert!(parse_env("CAREERPATH_TEST_BAD_PORT", 8080u16).is_err());

        std::env::set_var("CAREERPATH_TEST_GOOD_PORT", " 3000 ");
        assert_eq!(parse_env("CAREERPATH_TEST_GOOD_PORT", 8080u16).unwrap(), 3000);
    }
}
