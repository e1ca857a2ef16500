//! Process configuration, grouped by the component that consumes it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub competitor_path: PathBuf,
    pub database: DatabaseSettings,
    pub scraper: ScraperSettings,
    pub server: ServerSettings,
    /// Live extraction yielding fewer candidates than this falls back to demo data.
    pub min_candidates: usize,
}

#[derive(Clone)]
pub struct DatabaseSettings {
    /// Unset is allowed until something actually connects.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    /// The connection URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn url(&self) -> Result<&str, ConfigError> {
        self.url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &self.url.as_ref().map(|_| "[redacted]"))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    /// Upper bound for a single page fetch, not for the whole run.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Pause between sequential page requests to the competitor site.
    pub inter_request_delay: Duration,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// Six-field cron expression (with seconds) for the periodic scrape.
    pub scrape_cron: String,
}
