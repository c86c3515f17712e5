use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Client configuration loaded from environment variables (and `.env` if present).
/// Every setting has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub reveal_step: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: std::env::var("PATHFINDER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout: Duration::from_secs(parse_env("PATHFINDER_TIMEOUT_SECS", 120)?),
            reveal_step: Duration::from_millis(parse_env("PATHFINDER_REVEAL_STEP_MS", 150)?),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        assert_eq!(parse_env::<u64>("PATHFINDER_TEST_UNSET_VALUE", 7).unwrap(), 7);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("PATHFINDER_TEST_BAD_VALUE", "soon");
        let err = parse_env::<u64>("PATHFINDER_TEST_BAD_VALUE", 7).unwrap_err();
        assert!(err.to_string().contains("PATHFINDER_TEST_BAD_VALUE must be a number"));
    }

    #[test]
    fn test_parse_env_reads_value() {
        std::env::set_var("PATHFINDER_TEST_GOOD_VALUE", " 45 ");
        assert_eq!(parse_env::<u64>("PATHFINDER_TEST_GOOD_VALUE", 7).unwrap(), 45);
    }
}
