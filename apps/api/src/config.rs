use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing. Secrets have no built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    /// Upper bound for acquiring a pooled connection and for SQLite lock waits.
    pub db_timeout: Duration,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub llm_timeout: Duration,
    /// Root of the statically served directory. Rendered PDFs go to `<public_dir>/pdfs`.
    pub public_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            db_timeout: Duration::from_secs(parse_env("DB_TIMEOUT_SECS", 5)?),
            jwt_secret: require_env("JWT_SECRET")?,
            token_ttl_hours: parse_env("TOKEN_TTL_HOURS", 24)?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
            public_dir: std::env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Directory holding the rendered resume artifacts.
    pub fn pdf_dir(&self) -> PathBuf {
        self.public_dir.join("pdfs")
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
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
