pub mod api;
pub mod checkins;
pub mod config;
pub mod db;
pub mod models;
pub mod scoring;

use tracing_subscriber::EnvFilter;

use crate::api::AppContext;
use crate::config::{ConfigError, ServerConfig};
use crate::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot open database: {0}")]
    Database(#[from] DatabaseError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration, migrate the database and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    let settings = ServerConfig::from_env()?;
    let addr = settings.socket_addr()?;
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Migrate up front so a broken database fails startup, not the first request.
    db::sqlite::open_database(&settings.database_path)?;
    tracing::info!(path = %settings.database_path.display(), "Database ready");

    let ctx = AppContext::new(settings.database_path.clone(), settings.engine.clone());
    let server = api::start_server(ctx, addr).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received, draining requests");
    server.stop().await;
    Ok(())
}
