pub mod app_config;
pub mod campaigns;
pub mod competitor;
pub mod config;
pub mod store;

pub use app_config::{AppConfig, DatabaseSettings, ScraperSettings, ServerSettings};
pub use campaigns::{
    CampaignCategory, CampaignPage, CampaignQuery, CampaignRecord, CampaignUpdate,
    CandidateRecord, NewCampaign, NewScrapeLog, RunSummary, ScrapeStatus, DEFAULT_QUERY_LIMIT,
    MAX_QUERY_LIMIT,
};
pub use competitor::{load_competitor, parse_competitor, CompetitorConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use store::{CampaignStore, StoreError, StoreSession};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read competitor config at {path}: {source}")]
    CompetitorFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse competitor config: {0}")]
    CompetitorFileParse(#[from] serde_yaml::Error),

    #[error("competitor config validation failed: {0}")]
    Validation(String),
}
