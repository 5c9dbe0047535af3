use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomsync::{
    config::StorageBackend, build_router, AppState, Config, InMemoryKvStore, KvStore,
    PostgresKvStore,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting room coordination server");

    let store: Option<Arc<dyn KvStore>> = match config.storage_backend {
        StorageBackend::Memory => Some(Arc::new(InMemoryKvStore::new())),
        StorageBackend::Postgres => {
            let database_url = config.database_url.as_deref().unwrap_or_default();
            let store = PostgresKvStore::connect(database_url).await?;
            store.ensure_schema().await?;
            Some(Arc::new(store))
        }
        StorageBackend::Disabled => {
            warn!("No storage backend configured; room actions will fail");
            None
        }
    };

    let app_state = AppState::new(store, config.operation_limits());
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    info!(address = %config.server_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
