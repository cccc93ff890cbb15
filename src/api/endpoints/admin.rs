//! Aggregate audit endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::AppContext;
use crate::checkins;
use crate::db::repository::AggregateConsistencyReport;

/// `GET /api/admin/consistency`
pub async fn consistency(State(ctx): State<AppContext>) -> Result<Json<AggregateConsistencyReport>, ApiError> {
    let report = ctx
        .run(|conn, _| Ok(checkins::check_consistency(conn)?))
        .await?;
    Ok(Json(report))
}

#[derive(Serialize)]
pub struct RepairResponse {
    pub repaired: usize,
}

/// `POST /api/admin/consistency/repair`
pub async fn repair(State(ctx): State<AppContext>) -> Result<Json<RepairResponse>, ApiError> {
    let repaired = ctx
        .run(|conn, _| Ok(checkins::repair_aggregates(conn)?))
        .await?;
    Ok(Json(RepairResponse { repaired }))
}
