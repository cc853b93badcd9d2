mod api;
mod middleware;

use std::sync::Arc;

use nichescan_core::{load_taxonomy, Taxonomy};
use nichescan_db::ConfiguredCache;
use nichescan_enrich::{ConfiguredEnricher, Enricher};
use nichescan_pipeline::{Pipeline, PipelineTimeouts};
use nichescan_serp::SerpClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = nichescan_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let taxonomy = match config.taxonomy_path.as_deref() {
        Some(path) => load_taxonomy(path)?,
        None => Taxonomy::default(),
    };
    let serp = SerpClient::from_config(&config)?;
    let cache = ConfiguredCache::connect(&config).await?;
    let enricher = ConfiguredEnricher::from_config(&config)?;
    if !enricher.is_enabled() {
        tracing::info!("NICHESCAN_LLM_API_KEY not set; enrichment disabled");
    }

    let pipeline = Pipeline::new(serp, cache, enricher, taxonomy)
        .with_timeouts(PipelineTimeouts::from_app_config(&config));
    let app = build_app(
        AppState {
            pipeline: Arc::new(pipeline),
        },
        default_rate_limit_state(),
    );

    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
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
