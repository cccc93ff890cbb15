//! Shared state for the HTTP layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::EngineConfig;
use crate::db::sqlite::open_database;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes. Each request opens its own connection,
/// so concurrent writers are serialized by SQLite rather than by a mutex.
#[derive(Clone)]
pub struct AppContext {
    pub db_path: Arc<PathBuf>,
    pub config: Arc<EngineConfig>,
}

impl AppContext {
    pub fn new(db_path: PathBuf, config: EngineConfig) -> Self {
        Self {
            db_path: Arc::new(db_path),
            config: Arc::new(config),
        }
    }

    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.db_path).map_err(ApiError::from)
    }

    /// Run synchronous engine work on the blocking pool with a fresh connection.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &EngineConfig) -> Result<T, ApiError> + Send + 'static,
    {
        let ctx = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = ctx.open_db()?;
            work(&conn, ctx.config.as_ref())
        })
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
    }
}

/// Parse a path segment as a UUID.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {what} ID format")))
}
