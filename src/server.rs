//! HTTP server initialization and runtime setup.
//!
//! Wires the database pool, cache, background workers, and the code supply
//! pipeline together, then runs the Axum server until shutdown.

use crate::application::services::{AuthService, LinkService, StatsService};
use crate::codegen::{CodePipeline, CodeStore};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgLinkRepository, PgTokenRepository, PgUserRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes, in order:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (or NullCache fallback)
/// - Background click worker
/// - Code supply pipeline (started only after the store is reachable)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if the database connection, migration run, server bind,
/// or server runtime fails.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let token_repository = Arc::new(PgTokenRepository::new(pool.clone()));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker_links: Arc<dyn LinkRepository> = link_repository.clone();
    tokio::spawn(run_click_worker(click_rx, worker_links));
    tracing::info!("Click worker started");

    // The migrations just ran against the store, so it is reachable; the
    // pipeline may begin probing immediately.
    let code_store: Arc<dyn CodeStore> = link_repository.clone();
    let code_supply = CodePipeline::new(code_store, config.pipeline_config());
    code_supply.start();

    let link_service = Arc::new(LinkService::new(
        link_repository.clone(),
        cache.clone(),
        code_supply.clone(),
        config.base_url.clone(),
    ));
    let auth_service = Arc::new(AuthService::new(
        user_repository,
        token_repository,
        config.auth_signing_secret.clone(),
        config.token_ttl_hours,
    ));
    let stats_service = Arc::new(StatsService::new(link_repository));

    let state = AppState {
        link_service,
        auth_service,
        stats_service,
        cache,
        click_sender: click_tx,
        code_supply: code_supply.clone(),
    };

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    code_supply.stop();
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves when the process receives a shutdown signal.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }

    tracing::info!("Shutdown signal received");
}
