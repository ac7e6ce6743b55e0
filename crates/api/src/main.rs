//! Storefront API server
//!
//! Reads configuration from environment variables (see [`Config::from_env`])
//! and serves the channel-aware GraphQL endpoint. Set `LOG_FORMAT=json` for
//! JSON log lines.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use storefront_api::{
    cache::{InMemoryResponseStore, RedisResponseStore, ResponseStore},
    pipeline,
    routes::create_router,
    AppState, Config,
};
use storefront_shared::{create_pool, run_migrations, PgChannelDirectory};
use tracing_subscriber::EnvFilter;

/// Interval between sweeps of expired in-memory cache entries
const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("storefront_api=info,tower_http=info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let response_store: Arc<dyn ResponseStore> = match &config.redis_url {
        Some(redis_url) => {
            let store = RedisResponseStore::connect(redis_url)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Using Redis GraphQL response cache");
            Arc::new(store)
        }
        None => {
            let store = Arc::new(InMemoryResponseStore::with_max_bytes(
                config.cache.max_memory_bytes,
            ));
            spawn_cache_cleanup(store.clone());
            tracing::info!("Using in-memory GraphQL response cache");
            store
        }
    };

    let pipeline = pipeline::compose(&config);
    tracing::info!(
        middleware = ?pipeline.middleware,
        query_namespaces = ?pipeline.query_namespaces,
        "GraphQL pipeline composed"
    );

    let bind_address = config.bind_address.clone();
    let state = AppState::new(
        config,
        Arc::new(PgChannelDirectory::new(pool)),
        response_store,
    );
    let app = create_router(state, &pipeline);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!(address = %bind_address, "Storefront API listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn spawn_cache_cleanup(store: Arc<InMemoryResponseStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            store.cleanup();
            let stats = store.stats();
            tracing::debug!(
                total = stats.total_entries,
                expired = stats.expired_entries,
                "Response cache cleanup"
            );
        }
    });
}
