//! Postgres implementation of the campaign store.
//!
//! Each session wraps one transaction; dropping a session without calling
//! `commit` rolls it back.

use async_trait::async_trait;
use promowatch_core::{
    CampaignRecord, CampaignStore, CampaignUpdate, NewCampaign, NewScrapeLog, StoreError,
    StoreSession,
};
use sqlx::{PgPool, Postgres, Transaction};

use crate::campaigns::{
    find_campaign_matches, insert_campaign, list_active_campaigns, update_campaign,
};
use crate::scrape_logs::insert_scrape_log;
use crate::DbError;

#[derive(Clone)]
pub struct PgCampaignStore {
    pool: PgPool,
}

impl PgCampaignStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub struct PgStoreSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CampaignStore for PgCampaignStore {
    type Session = PgStoreSession;

    async fn begin(&self) -> Result<PgStoreSession, StoreError> {
        let tx = self.pool.begin().await.map_err(StoreError::unavailable)?;
        Ok(PgStoreSession { tx })
    }

    async fn append_log(&self, entry: &NewScrapeLog) -> Result<(), StoreError> {
        insert_scrape_log(&self.pool, entry)
            .await
            .map_err(StoreError::unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl StoreSession for PgStoreSession {
    async fn find_matches(
        &mut self,
        competitor: &str,
        name: &str,
        source_url: &str,
    ) -> Result<Vec<CampaignRecord>, StoreError> {
        let rows = find_campaign_matches(&mut self.tx, competitor, name, source_url)
            .await
            .map_err(StoreError::unavailable)?;
        Ok(rows.into_iter().map(CampaignRecord::from).collect())
    }

    async fn insert(&mut self, campaign: &NewCampaign) -> Result<i64, StoreError> {
        insert_campaign(&mut self.tx, campaign)
            .await
            .map_err(StoreError::unavailable)
    }

    async fn update(&mut self, id: i64, update: &CampaignUpdate) -> Result<(), StoreError> {
        update_campaign(&mut self.tx, id, update)
            .await
            .map_err(|e| match e {
                DbError::NotFound => StoreError::NotFound(id),
                other => StoreError::unavailable(other),
            })
    }

    async fn list_active_by_competitor(
        &mut self,
        competitor: &str,
    ) -> Result<Vec<CampaignRecord>, StoreError> {
        let rows = list_active_campaigns(&mut self.tx, competitor)
            .await
            .map_err(StoreError::unavailable)?;
        Ok(rows.into_iter().map(CampaignRecord::from).collect())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(StoreError::unavailable)
    }
}
