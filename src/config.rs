//! Application configuration loaded from environment variables.
//!
//! The JWT signing secret is read once at startup, either from a protected
//! file path (`JWT_SECRET_FILE`) or directly from the environment for local
//! development, and is immutable for the process lifetime. Rotating the
//! secret invalidates every previously issued token.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// SQLite database URL
    pub database_url: String,
    /// JWT signing secret (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
    /// Refresh token lifetime in minutes
    pub refresh_token_minutes: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The signing secret comes from the file named by `JWT_SECRET_FILE`
    /// when set (production: a mounted secret volume), otherwise from the
    /// `JWT_SIGNING_KEY` env var (local development).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = match env::var("JWT_SECRET_FILE") {
            Ok(path) => read_secret_file(&path)?,
            Err(_) => env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        };

        if jwt_signing_key.len() < 32 {
            return Err(ConfigError::WeakSecret(jwt_signing_key.len()));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:lendhub.db?mode=rwc".to_string()),
            jwt_signing_key,
            access_token_minutes: env_minutes("ACCESS_TOKEN_MINUTES", 15),
            refresh_token_minutes: env_minutes("REFRESH_TOKEN_MINUTES", 7 * 24 * 60),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            access_token_minutes: 15,
            refresh_token_minutes: 7 * 24 * 60,
        }
    }
}

/// Read the signing secret from a file, trimming the trailing newline most
/// secret stores append.
fn read_secret_file(path: &str) -> Result<Vec<u8>, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::SecretFile(path.to_string(), e.to_string()))?;
    Ok(contents.trim_end().as_bytes().to_vec())
}

fn env_minutes(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|m| *m > 0)
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Failed to read secret file {0}: {1}")]
    SecretFile(String, String),

    #[error("JWT signing key too short ({0} bytes, need at least 32)")]
    WeakSecret(usize),
}
