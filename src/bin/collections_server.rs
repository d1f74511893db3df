//! Collections Server Binary
//!
//! Serves the collections HTTP API. Uses PostgreSQL when `database.url` (or
//! `DATABASE_URL`) is set, otherwise an in-memory store seeded with demo data.

use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use collections_core::config::CollectionsConfig;
use collections_core::constants::system::LIKED_COLLECTION_NAME;
use collections_core::logging::init_structured_logging;
use collections_core::store::{Association, InMemoryStore, MembershipStore, PgStore};
use collections_core::web::{create_app, AppState};

const DEMO_COMPANY_COUNT: i64 = 10_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CollectionsConfig::load().context("failed to load configuration")?;
    init_structured_logging();

    info!(
        version = collections_core::system::COLLECTIONS_CORE_VERSION,
        "Starting collections server"
    );

    let state = if config.database.url.is_some() {
        let store = PgStore::connect(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        if config.database.run_migrations {
            store.run_migrations().await.context("migrations failed")?;
        }
        AppState::new(config.clone(), Arc::new(store))
    } else {
        warn!("No database configured; using an in-memory store with demo data");
        let store = Arc::new(InMemoryStore::new());
        seed_demo_data(&store).await?;
        AppState::new(config.clone(), store)
    };
    let state = Arc::new(state);

    let shutdown = CancellationToken::new();
    let sweeper = Arc::clone(&state.registry).spawn_retention_sweeper(
        config.retention.job_retention(),
        config.retention.sweep_interval(),
        shutdown.clone(),
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_address))?;
    info!(bind_address = %config.server.bind_address, "Collections API listening");

    let app = create_app(Arc::clone(&state));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown signal received");
    state.pool.shutdown();
    shutdown.cancel();
    if let Err(err) = sweeper.await {
        warn!(error = %err, "Retention sweeper ended abnormally");
    }
    info!("Collections server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for ctrl-c");
    }
}

/// One large source list and an empty liked list
async fn seed_demo_data(store: &InMemoryStore) -> anyhow::Result<()> {
    store.seed_companies(DEMO_COMPANY_COUNT);
    let my_list = store.create_collection("My List");
    store.create_collection(LIKED_COLLECTION_NAME);

    let batch: Vec<Association> = (1..=DEMO_COMPANY_COUNT)
        .map(|id| Association::new(id, my_list.id))
        .collect();
    store.add_associations(&batch).await?;

    info!(companies = DEMO_COMPANY_COUNT, "Seeded in-memory demo data");
    Ok(())
}
