use std::{env, str::FromStr, time::Duration};

use crate::errors::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://produtos_str.db";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before calling this.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parse_or(&lookup, "PORT", 3001)?;
        let timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 5u64)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_owned())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();
        if cors_origins.is_empty() {
            return Err(AppError::Config("CORS_ORIGINS must name at least one origin".to_owned()));
        }

        Ok(Self {
            database_url,
            host,
            port,
            cors_origins,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            log::error!("Invalid value for {}: {}", key, e);
            AppError::Config(format!("{}={:?}: {}", key, raw, e))
        }),
    }
}
