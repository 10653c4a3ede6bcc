use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub log_dir: String,

    // Rate limiting
    pub rate_punch_per_min: u32,
    pub rate_biometric_per_min: u32,
    pub rate_protected_per_min: u32,

    // Punch processing
    pub duplicate_punch_window_minutes: i64,
    pub default_timezone: String,
    pub company_settings_cache_ttl_secs: u64,

    pub api_prefix: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parsed_or("RUN_MIGRATIONS", false)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_punch_per_min: parsed_or("RATE_PUNCH_PER_MIN", 60)?,
            rate_biometric_per_min: parsed_or("RATE_BIOMETRIC_PER_MIN", 600)?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            duplicate_punch_window_minutes: parsed_or("DUPLICATE_PUNCH_WINDOW_MINUTES", 1)?,
            default_timezone: env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            company_settings_cache_ttl_secs: parsed_or("COMPANY_SETTINGS_CACHE_TTL_SECS", 300)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        })
    }
}
