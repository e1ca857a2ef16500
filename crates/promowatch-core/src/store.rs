//! Storage seam used by the reconciliation engine.
//!
//! A run opens one [`StoreSession`], performs every lookup and write for the
//! current candidates plus deactivation through it, then commits. Dropping a
//! session without committing discards its writes. The scrape log is written
//! outside the session so a failed run can still be recorded.

use async_trait::async_trait;
use thiserror::Error;

use crate::campaigns::{CampaignRecord, CampaignUpdate, NewCampaign, NewScrapeLog};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("campaign store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("campaign {0} not found")]
    NotFound(i64),
}

impl StoreError {
    /// Wraps any backend error as [`StoreError::Unavailable`].
    pub fn unavailable<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        StoreError::Unavailable(error.into())
    }
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    type Session: StoreSession;

    /// Opens an atomic unit of work.
    async fn begin(&self) -> Result<Self::Session, StoreError>;

    /// Appends one scrape-log entry. Committed independently of any session.
    async fn append_log(&self, entry: &NewScrapeLog) -> Result<(), StoreError>;
}

#[async_trait]
pub trait StoreSession: Send {
    /// Stored campaigns of `competitor` whose key matches `name` and
    /// `source_url` (see [`CampaignRecord::matches_key`]).
    async fn find_matches(
        &mut self,
        competitor: &str,
        name: &str,
        source_url: &str,
    ) -> Result<Vec<CampaignRecord>, StoreError>;

    /// Inserts a campaign and returns its id.
    async fn insert(&mut self, campaign: &NewCampaign) -> Result<i64, StoreError>;

    async fn update(&mut self, id: i64, update: &CampaignUpdate) -> Result<(), StoreError>;

    async fn list_active_by_competitor(
        &mut self,
        competitor: &str,
    ) -> Result<Vec<CampaignRecord>, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}
