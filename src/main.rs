use placement_backend::{
    config::{Config, StoreBackend},
    database::Database,
    routes::build_router,
    store::{MemoryCandidateStore, MemorySeed, PgCandidateStore},
    telemetry, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(&config)?;

    let (app_state, database) = match config.store_backend {
        StoreBackend::Postgres => {
            let database = Database::connect(&config).await?;
            database.migrate().await?;
            let store = Arc::new(PgCandidateStore::new(database.pool()));
            (AppState::from_store(store), Some(database))
        }
        StoreBackend::Memory => {
            warn!("using in-memory candidate store; data is lost on shutdown");
            let store = Arc::new(MemoryCandidateStore::new());
            match &config.memory_seed_path {
                Some(path) => store.seed(MemorySeed::load(path).await?).await?,
                None => warn!("MEMORY_SEED_PATH not set; no centers or filières available"),
            }
            (AppState::from_store(store), None)
        }
    };

    let app = build_router(app_state, config.max_body_bytes);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.shutdown().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
