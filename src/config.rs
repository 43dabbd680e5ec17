use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Upper bound for `SESSION_TTL_MINUTES`: ten years.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Only `SESSION_SECRET` is required.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_minutes = lookup("SESSION_TTL_MINUTES")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60 * 24 * 14);
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!(
                "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {ttl_minutes}"
            );
        }

        let session = SessionConfig {
            secret: lookup("SESSION_SECRET")
                .filter(|s| !s.is_empty())
                .context("SESSION_SECRET must be set")?,
            ttl_minutes,
            secure_cookie: lookup("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("instance/app.db")),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(20 * 1024 * 1024),
            session,
        })
    }
}
