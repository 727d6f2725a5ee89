use std::{sync::Arc, time::Duration};

use reelpick_api::{
    config::Config,
    db::{create_redis_client, Cache},
    routes::{create_router, AppState, RequestLimits},
    services::{
        providers::{OmdbEnrichmentSource, OpenAiSuggestionSource},
        Enricher, RecommendationOrchestrator,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelpick_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?).await;
            (cache, Some(handle))
        }
        None => (Cache::disabled(), None),
    };
    tracing::info!(enabled = cache.is_enabled(), "Enrichment cache configured");

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let suggestions = OpenAiSuggestionSource::new(
        http_client.clone(),
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
    );
    let enrichment = OmdbEnrichmentSource::new(
        http_client,
        cache,
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    );

    let orchestrator =
        RecommendationOrchestrator::new(Arc::new(suggestions), Enricher::new(Arc::new(enrichment)))
            .with_max_attempts(config.max_attempts);

    let app = create_router(AppState::new(orchestrator, RequestLimits::from(&config)));

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, model = %config.openai_model, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
