mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use promowatch_db::PgCampaignStore;
use promowatch_pipeline::{EngineSettings, ReconcileEngine};
use promowatch_scraper::PageClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = promowatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let competitor = promowatch_core::load_competitor(&config.competitor_path)
        .with_context(|| format!("loading {}", config.competitor_path.display()))?;

    let pool = promowatch_db::connect(&config.database).await?;
    let applied = promowatch_db::migrate(&pool).await?;
    tracing::info!(applied = applied.len(), "migrations up to date");

    let engine = Arc::new(ReconcileEngine::new(
        PageClient::from_app_config(&config)?,
        PgCampaignStore::new(pool.clone()),
        EngineSettings::from_app_config(competitor, &config),
    ));

    let _scheduler = scheduler::build_scheduler(Arc::clone(&engine), &config.server.scrape_cron).await?;

    let app = build_app(AppState { pool, engine });

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
    tracing::info!(addr = %config.server.bind_addr, "promowatch-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
