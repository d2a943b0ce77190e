use std::sync::Arc;

use todos::middleware::Cors;
use todos::todo::{self, MemoryStore, PostgresStore, SharedStore};
use todos::{Config, Server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), todos::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let store = open_store(&config)?;
    info!(store = store.kind(), "store ready");

    let app = todo::app(store, Cors::new(config.cors_origin));
    Server::bind(config.addr).serve(app).await
}

/// Postgres when `DATABASE_URL` is set, otherwise the seeded volatile store.
///
/// The first connection attempt runs in the background. An unreachable
/// database is logged, not fatal: the server still starts and requests fail
/// at the store until the database answers.
fn open_store(config: &Config) -> Result<SharedStore, todos::Error> {
    let Some(url) = &config.database_url else {
        return Ok(Arc::new(MemoryStore::seeded()));
    };

    let store: SharedStore = Arc::new(PostgresStore::connect_lazy(url)?);
    let probe = Arc::clone(&store);
    tokio::spawn(async move {
        match probe.ping().await {
            Ok(()) => info!("database connected"),
            Err(e) => warn!(error = %e, "database unreachable at startup"),
        }
    });
    Ok(store)
}
