//! Reconciliation engine.
//!
//! One run acquires candidates, classifies them, matches them against the
//! stored campaigns of the competitor, inserts or refreshes each, deactivates
//! previously active campaigns that were not seen, and appends one scrape-log
//! entry. Matching and deactivation happen inside a single store session.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use promowatch_core::{
    AppConfig, CampaignStore, CampaignUpdate, CandidateRecord, CompetitorConfig, NewCampaign,
    NewScrapeLog, RunSummary, ScrapeStatus, StoreError, StoreSession,
};
use promowatch_scraper::classify;

use crate::acquire::{scrape_pages, Acquisition};
use crate::error::PipelineError;
use crate::guard::RunGuard;
use crate::source::PageSource;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub competitor: CompetitorConfig,
    /// Live runs with fewer candidates fall back to demo data.
    pub min_candidates: usize,
    pub inter_request_delay: Duration,
}

impl EngineSettings {
    #[must_use]
    pub fn from_app_config(competitor: CompetitorConfig, config: &AppConfig) -> Self {
        Self {
            competitor,
            min_candidates: config.min_candidates,
            inter_request_delay: config.scraper.inter_request_delay,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ReconcileCounts {
    new_campaigns: usize,
    updated_campaigns: usize,
    deactivated_campaigns: usize,
}

pub struct ReconcileEngine<S, C> {
    source: S,
    store: C,
    settings: EngineSettings,
    guard: RunGuard,
}

impl<S, C> ReconcileEngine<S, C>
where
    S: PageSource,
    C: CampaignStore,
{
    #[must_use]
    pub fn new(source: S, store: C, settings: EngineSettings) -> Self {
        Self {
            source,
            store,
            settings,
            guard: RunGuard::new(),
        }
    }

    /// Guard every run of this engine must hold.
    #[must_use]
    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// `true` while a run holds the engine's guard.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Runs one reconciliation stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::run_at`].
    pub async fn run(&self, use_demo: bool) -> Result<RunSummary, PipelineError> {
        self.run_at(use_demo, Utc::now()).await
    }

    /// Runs one reconciliation stamped with `run_at`.
    ///
    /// Per-page, store and log failures are reported in the returned summary.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Configuration`] if no target pages are configured
    ///   and `use_demo` is false. Nothing is written.
    /// - [`PipelineError::AlreadyRunning`] if another run holds the guard.
    pub async fn run_at(
        &self,
        use_demo: bool,
        run_at: DateTime<Utc>,
    ) -> Result<RunSummary, PipelineError> {
        let competitor = &self.settings.competitor;
        if !use_demo && competitor.pages.is_empty() {
            return Err(PipelineError::Configuration(format!(
                "no target pages configured for competitor \"{}\" and demo mode not requested",
                competitor.name
            )));
        }

        let Some(_permit) = self.guard.try_acquire() else {
            return Err(PipelineError::AlreadyRunning);
        };

        tracing::info!(competitor = %competitor.name, use_demo, "reconciliation run starting");

        let acquisition = self.acquire(use_demo).await;
        if acquisition.used_demo_data && !use_demo {
            tracing::warn!(
                competitor = %competitor.name,
                error = acquisition.error_message.as_deref().unwrap_or_default(),
                "falling back to demo campaigns"
            );
        }

        let campaigns_found = acquisition.candidates.len();
        let mut summary = RunSummary {
            run_at,
            status: acquisition.status,
            campaigns_found,
            new_campaigns: 0,
            updated_campaigns: 0,
            deactivated_campaigns: 0,
            used_demo_data: acquisition.used_demo_data,
            error_message: acquisition.error_message,
        };

        match self.reconcile(&acquisition.candidates, run_at).await {
            Ok(counts) => {
                summary.new_campaigns = counts.new_campaigns;
                summary.updated_campaigns = counts.updated_campaigns;
                summary.deactivated_campaigns = counts.deactivated_campaigns;
            }
            Err(e) => {
                tracing::error!(competitor = %competitor.name, error = %e, "reconciliation failed; rolled back");
                summary.status = ScrapeStatus::Failed;
                summary.error_message = Some(format!("store error during reconciliation: {e}"));
            }
        }

        if let Err(e) = self.store.append_log(&self.log_entry(&summary)).await {
            tracing::error!(competitor = %competitor.name, error = %e, "failed to append scrape log");
            summary.status = ScrapeStatus::Failed;
            summary.error_message = Some(match summary.error_message.take() {
                Some(previous) => format!("{previous}; failed to append scrape log: {e}"),
                None => format!("failed to append scrape log: {e}"),
            });
        }

        tracing::info!(
            competitor = %competitor.name,
            status = %summary.status,
            campaigns_found = summary.campaigns_found,
            new_campaigns = summary.new_campaigns,
            updated_campaigns = summary.updated_campaigns,
            deactivated_campaigns = summary.deactivated_campaigns,
            used_demo_data = summary.used_demo_data,
            "reconciliation run finished"
        );

        Ok(summary)
    }

    async fn acquire(&self, use_demo: bool) -> Acquisition {
        if use_demo {
            return Acquisition::demo();
        }
        let (candidates, failures) = scrape_pages(
            &self.source,
            &self.settings.competitor.pages,
            self.settings.inter_request_delay,
        )
        .await;
        Acquisition::from_live(candidates, failures, self.settings.min_candidates)
    }

    /// Matching and deactivation in one session. The session is committed
    /// only if every step succeeds; on error it is dropped and rolled back.
    async fn reconcile(
        &self,
        candidates: &[CandidateRecord],
        run_at: DateTime<Utc>,
    ) -> Result<ReconcileCounts, StoreError> {
        let competitor = self.settings.competitor.name.as_str();
        let mut session = self.store.begin().await?;
        let previously_active = session.list_active_by_competitor(competitor).await?;

        let mut counts = ReconcileCounts::default();
        let mut matched: HashSet<i64> = HashSet::new();

        for candidate in candidates {
            let category = classify(&candidate.classification_text());
            let info = candidate.info.clone().unwrap_or_default();
            let matches = session
                .find_matches(competitor, &candidate.name, &candidate.source_url)
                .await?;

            if let Some(existing) = matches.iter().find(|m| !matched.contains(&m.id)) {
                let mut update = CampaignUpdate::rematch(run_at.max(existing.last_seen_at));
                if existing.info != info {
                    update.info = Some(info);
                }
                if existing.category != category {
                    update.category = Some(category);
                }
                session.update(existing.id, &update).await?;
                matched.insert(existing.id);
                counts.updated_campaigns += 1;
            } else {
                let id = session
                    .insert(&NewCampaign {
                        competitor_name: competitor.to_owned(),
                        name: candidate.name.clone(),
                        info,
                        source_url: candidate.source_url.clone(),
                        category,
                        seen_at: run_at,
                    })
                    .await?;
                matched.insert(id);
                counts.new_campaigns += 1;
            }
        }

        for stale in previously_active
            .iter()
            .filter(|c| !matched.contains(&c.id))
        {
            session
                .update(stale.id, &CampaignUpdate::deactivate())
                .await?;
            counts.deactivated_campaigns += 1;
        }

        session.commit().await?;
        Ok(counts)
    }

    fn log_entry(&self, summary: &RunSummary) -> NewScrapeLog {
        let competitor = &self.settings.competitor;
        let source_url = competitor
            .homepage
            .clone()
            .or_else(|| competitor.pages.first().cloned())
            .unwrap_or_default();
        NewScrapeLog {
            run_at: summary.run_at,
            competitor_name: competitor.name.clone(),
            source_url,
            status: summary.status,
            campaigns_found: i32::try_from(summary.campaigns_found).unwrap_or(i32::MAX),
            new_campaigns: i32::try_from(summary.new_campaigns).unwrap_or(i32::MAX),
            error_message: summary.error_message.clone(),
        }
    }
}
