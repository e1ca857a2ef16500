//! In-process campaign store.
//!
//! Backs dry runs and tests. A session works on a private copy of the
//! campaigns and publishes it on commit, so an uncommitted session leaves the
//! store untouched just like a rolled-back transaction.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use promowatch_core::{
    CampaignPage, CampaignQuery, CampaignRecord, CampaignStore, CampaignUpdate, NewCampaign,
    NewScrapeLog, StoreError, StoreSession,
};

#[derive(Debug, Default)]
struct MemoryState {
    campaigns: Vec<CampaignRecord>,
    logs: Vec<NewScrapeLog>,
    next_id: i64,
    fail_inserts_after: Option<usize>,
    fail_log_appends: bool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

pub struct MemoryStoreSession {
    state: Arc<Mutex<MemoryState>>,
    campaigns: Vec<CampaignRecord>,
    next_id: i64,
    inserts: usize,
    fail_inserts_after: Option<usize>,
}

fn lock(state: &Mutex<MemoryState>) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
    state
        .lock()
        .map_err(|_| StoreError::unavailable("memory store lock poisoned"))
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` as-is, assigning a fresh id. Returns the id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store lock is poisoned.
    pub fn seed(&self, mut record: CampaignRecord) -> Result<i64, StoreError> {
        let mut state = lock(&self.state)?;
        state.next_id += 1;
        record.id = state.next_id;
        state.campaigns.push(record);
        Ok(state.next_id)
    }

    /// Snapshot of committed campaigns in insertion order.
    #[must_use]
    pub fn campaigns(&self) -> Vec<CampaignRecord> {
        lock(&self.state)
            .map(|s| s.campaigns.clone())
            .unwrap_or_default()
    }

    /// Snapshot of appended scrape-log entries in append order.
    #[must_use]
    pub fn logs(&self) -> Vec<NewScrapeLog> {
        lock(&self.state).map(|s| s.logs.clone()).unwrap_or_default()
    }

    /// Applies `query` to committed campaigns, most recently seen first.
    #[must_use]
    pub fn query(&self, query: &CampaignQuery) -> CampaignPage {
        let mut matching: Vec<_> = self
            .campaigns()
            .into_iter()
            .filter(|c| query.matches(c))
            .collect();
        matching.sort_by(|a, b| {
            b.last_seen_at
                .cmp(&a.last_seen_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(limit).collect();
        CampaignPage { items, total }
    }

    /// Makes every session insert fail once `n` inserts have succeeded.
    pub fn fail_inserts_after(&self, n: usize) {
        if let Ok(mut state) = lock(&self.state) {
            state.fail_inserts_after = Some(n);
        }
    }

    /// Makes `append_log` fail while `fail` is set.
    pub fn fail_log_appends(&self, fail: bool) {
        if let Ok(mut state) = lock(&self.state) {
            state.fail_log_appends = fail;
        }
    }
}

#[async_trait]
impl CampaignStore for MemoryStore {
    type Session = MemoryStoreSession;

    async fn begin(&self) -> Result<MemoryStoreSession, StoreError> {
        let state = lock(&self.state)?;
        Ok(MemoryStoreSession {
            state: Arc::clone(&self.state),
            campaigns: state.campaigns.clone(),
            next_id: state.next_id,
            inserts: 0,
            fail_inserts_after: state.fail_inserts_after,
        })
    }

    async fn append_log(&self, entry: &NewScrapeLog) -> Result<(), StoreError> {
        let mut state = lock(&self.state)?;
        if state.fail_log_appends {
            return Err(StoreError::unavailable("scrape log table unavailable"));
        }
        state.logs.push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl StoreSession for MemoryStoreSession {
    async fn find_matches(
        &mut self,
        competitor: &str,
        name: &str,
        source_url: &str,
    ) -> Result<Vec<CampaignRecord>, StoreError> {
        let mut matches: Vec<_> = self
            .campaigns
            .iter()
            .filter(|c| c.competitor_name == competitor && c.matches_key(name, source_url))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            (b.source_url == source_url)
                .cmp(&(a.source_url == source_url))
                .then_with(|| b.is_active.cmp(&a.is_active))
                .then_with(|| b.last_seen_at.cmp(&a.last_seen_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matches)
    }

    async fn insert(&mut self, campaign: &NewCampaign) -> Result<i64, StoreError> {
        if self.fail_inserts_after.is_some_and(|n| self.inserts >= n) {
            return Err(StoreError::unavailable("campaign store went away"));
        }
        self.inserts += 1;
        self.next_id += 1;
        self.campaigns.push(CampaignRecord {
            id: self.next_id,
            competitor_name: campaign.competitor_name.clone(),
            name: campaign.name.clone(),
            info: campaign.info.clone(),
            source_url: campaign.source_url.clone(),
            category: campaign.category,
            first_seen_at: campaign.seen_at,
            last_seen_at: campaign.seen_at,
            is_active: true,
        });
        Ok(self.next_id)
    }

    async fn update(&mut self, id: i64, update: &CampaignUpdate) -> Result<(), StoreError> {
        let record = self
            .campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if let Some(seen) = update.last_seen_at {
            record.last_seen_at = seen;
        }
        if let Some(active) = update.is_active {
            record.is_active = active;
        }
        if let Some(info) = &update.info {
            record.info.clone_from(info);
        }
        if let Some(category) = update.category {
            record.category = category;
        }
        Ok(())
    }

    async fn list_active_by_competitor(
        &mut self,
        competitor: &str,
    ) -> Result<Vec<CampaignRecord>, StoreError> {
        Ok(self
            .campaigns
            .iter()
            .filter(|c| c.is_active && c.competitor_name == competitor)
            .cloned()
            .collect())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut state = lock(&self.state)?;
        state.campaigns = self.campaigns;
        state.next_id = self.next_id;
        Ok(())
    }
}
