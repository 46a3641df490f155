use std::env;

use anyhow::{bail, Context};
use chrono::Duration;
use tracing::warn;

use crate::auth::{generate_token, AuthSettings};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_MAIL_FROM: &str = "no-reply@farmacia-alejo.local";
const DEFAULT_MAX_AGE_SECS: i64 = 3600;
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub secret_key: String,
    pub bind_addr: String,
    pub public_base_url: String,
    pub mail_from: String,
    pub session_max_age_secs: i64,
    pub reset_max_age_secs: i64,
    pub db_pool_size: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => bail!("DATABASE_URL not set"),
        };

        let secret_key = lookup("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set, generating one; sessions will not survive a restart");
            generate_token()
        });

        let config = Self {
            database_url,
            secret_key,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            public_base_url: lookup("PUBLIC_BASE_URL").unwrap_or_else(|| {
                warn!("PUBLIC_BASE_URL not set, using default");
                DEFAULT_PUBLIC_BASE_URL.to_string()
            }),
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            session_max_age_secs: parse_or(&lookup, "SESSION_MAX_AGE_SECS", DEFAULT_MAX_AGE_SECS)?,
            reset_max_age_secs: parse_or(&lookup, "RESET_MAX_AGE_SECS", DEFAULT_MAX_AGE_SECS)?,
            db_pool_size: parse_or(&lookup, "DB_POOL_SIZE", DEFAULT_POOL_SIZE)?,
        };

        if config.session_max_age_secs <= 0 || config.reset_max_age_secs <= 0 {
            bail!("token max ages must be positive");
        }
        if config.db_pool_size == 0 {
            bail!("DB_POOL_SIZE must be positive");
        }

        Ok(config)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            session_max_age: Duration::seconds(self.session_max_age_secs),
            reset_max_age: Duration::seconds(self.reset_max_age_secs),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number", key)),
        None => Ok(default),
    }
}
