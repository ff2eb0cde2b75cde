use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use hush_ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = var("HUSH_JWT_SECRET", "");
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("HUSH_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("HUSH_HOST", "0.0.0.0");
        let port: u16 = var("HUSH_PORT", "3000")
            .parse()
            .context("HUSH_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            addr,
            db_path: var("HUSH_DB_PATH", "hush.db").into(),
            jwt_secret,
            gemini_api_key: var("GEMINI_API_KEY", ""),
            gemini_model: var("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: var("GEMINI_BASE_URL", DEFAULT_BASE_URL),
        })
    }
}
