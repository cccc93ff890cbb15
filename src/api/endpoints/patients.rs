//! Patient endpoints:
//! - `POST /api/patients`: register a patient
//! - `DELETE /api/patients/:id`: delete a patient and their history
//! - `GET /api/patients/:id/checkins`: check-in history, oldest first

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, AppContext};
use crate::checkins;
use crate::models::{Patient, WellnessCheck};

#[derive(Deserialize)]
pub struct RegisterPatientRequest {
    pub pseudonym: String,
}

pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = ctx
        .run(move |conn, _| Ok(checkins::register_patient(conn, &req.pseudonym)?))
        .await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[derive(Serialize)]
pub struct DeletePatientResponse {
    pub aggregates_refreshed: usize,
}

pub async fn delete(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<DeletePatientResponse>, ApiError> {
    let patient_id = parse_id(&id, "patient")?;
    let aggregates_refreshed = ctx
        .run(move |conn, _| Ok(checkins::delete_patient(conn, &patient_id)?))
        .await?;
    Ok(Json(DeletePatientResponse { aggregates_refreshed }))
}

pub async fn history(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WellnessCheck>>, ApiError> {
    let patient_id = parse_id(&id, "patient")?;
    let list = ctx
        .run(move |conn, _| Ok(checkins::list_checkins(conn, &patient_id)?))
        .await?;
    Ok(Json(list))
}
