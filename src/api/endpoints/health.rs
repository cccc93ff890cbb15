//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::AppContext;
use crate::db::sqlite::get_current_version;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub schema_version: i64,
}

/// `GET /api/health`: confirms the database opens and reports its schema version.
pub async fn check(State(ctx): State<AppContext>) -> Result<Json<HealthResponse>, ApiError> {
    let schema_version = ctx.run(|conn, _| Ok(get_current_version(conn))).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        schema_version,
    }))
}
