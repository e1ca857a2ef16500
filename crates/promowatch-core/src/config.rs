use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::app_config::{AppConfig, DatabaseSettings, ScraperSettings, ServerSettings};
use crate::ConfigError;

/// Browser-like default so the competitor site serves its regular markup.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// `DATABASE_URL` may be absent; see [`DatabaseSettings::url`].
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database = DatabaseSettings {
        url: lookup("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
        max_connections: parse_u32("PROMOWATCH_DB_MAX_CONNECTIONS", "10")?,
        min_connections: parse_u32("PROMOWATCH_DB_MIN_CONNECTIONS", "1")?,
        acquire_timeout: Duration::from_secs(parse_u64("PROMOWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?),
    };

    let request_timeout_secs = parse_u64("PROMOWATCH_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PROMOWATCH_SCRAPER_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let scraper = ScraperSettings {
        request_timeout_secs,
        user_agent: or_default("PROMOWATCH_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT),
        inter_request_delay: Duration::from_millis(parse_u64(
            "PROMOWATCH_SCRAPER_INTER_REQUEST_DELAY_MS",
            "1500",
        )?),
        max_retries: parse_u32("PROMOWATCH_SCRAPER_MAX_RETRIES", "1")?,
        retry_backoff_base_secs: parse_u64("PROMOWATCH_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?,
    };

    let scrape_cron = or_default("PROMOWATCH_SCRAPE_CRON", "0 0 6 * * *");
    if scrape_cron.split_whitespace().count() != 6 {
        return Err(invalid(
            "PROMOWATCH_SCRAPE_CRON",
            format!("expected 6 cron fields (sec min hour dom mon dow), got \"{scrape_cron}\""),
        ));
    }
    let server = ServerSettings {
        bind_addr: parse_addr("PROMOWATCH_BIND_ADDR", "0.0.0.0:3000")?,
        scrape_cron,
    };

    Ok(AppConfig {
        log_level: or_default("PROMOWATCH_LOG_LEVEL", "info"),
        competitor_path: PathBuf::from(or_default(
            "PROMOWATCH_COMPETITOR_PATH",
            "./config/competitor.yaml",
        )),
        database,
        scraper,
        server,
        min_candidates: parse_usize("PROMOWATCH_MIN_CANDIDATES", "5")?,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
