//! Periodic scrape trigger.
//!
//! Registers one cron job that runs the reconciliation engine in live mode.
//! The job shares the engine (and therefore its run guard) with the API, so a
//! tick that lands while a run is in progress is skipped.

use std::sync::Arc;

use promowatch_pipeline::PipelineError;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::Engine;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    engine: Arc<Engine>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_scrape_job(&scheduler, engine, cron).await?;
    scheduler.start().await?;
    tracing::info!(cron, "scheduler: started");
    Ok(scheduler)
}

async fn register_scrape_job(
    scheduler: &JobScheduler,
    engine: Arc<Engine>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let engine = Arc::clone(&engine);
        Box::pin(async move {
            run_scheduled_scrape(&engine).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn run_scheduled_scrape(engine: &Engine) {
    tracing::info!("scheduler: starting scheduled scrape");
    match engine.run(false).await {
        Ok(summary) => tracing::info!(
            status = %summary.status,
            campaigns_found = summary.campaigns_found,
            new_campaigns = summary.new_campaigns,
            "scheduler: scheduled scrape complete"
        ),
        Err(PipelineError::AlreadyRunning) => {
            tracing::warn!("scheduler: scrape already in progress; skipping tick");
        }
        Err(e) => tracing::error!(error = %e, "scheduler: scheduled scrape could not start"),
    }
}
