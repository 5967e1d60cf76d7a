use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Ten years; longer lifetimes overflow timestamp arithmetic.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Root of the blob store; blog bodies live under `blog/`.
    pub resources_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub db_max_connections: u32,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            resources_dir: std::env::var("RESOURCES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("Resources")),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            token_ttl_hours: token_ttl(parse_env("TOKEN_TTL_HOURS", 720)?)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn token_ttl(hours: i64) -> Result<i64> {
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        bail!("TOKEN_TTL_HOURS must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let port: u16 = parse_env("WEBSITE_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_require_env_reports_missing_key() {
        let err = require_env("WEBSITE_TEST_UNSET_DATABASE_URL").unwrap_err();
        assert!(err.to_string().contains("WEBSITE_TEST_UNSET_DATABASE_URL"));
    }

    #[test]
    fn test_token_ttl_range() {
        assert_eq!(token_ttl(720).unwrap(), 720);
        assert!(token_ttl(0).is_err());
        assert!(token_ttl(-1).is_err());
        assert!(token_ttl(i64::MAX).is_err());
    }
}
