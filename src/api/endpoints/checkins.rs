//! Check-in endpoints:
//! - `POST /api/checkins`: submit or revise a check-in
//! - `GET /api/checkins/:id/attributions`: per-product breakdown
//! - `GET /api/checkins/:id/feedback`: comparison with the previous check-in

use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, AppContext};
use crate::checkins::{self, CheckinOutcome, CheckinSubmission};
use crate::models::AttributionView;
use crate::scoring::CheckinFeedback;

pub async fn submit(
    State(ctx): State<AppContext>,
    Json(submission): Json<CheckinSubmission>,
) -> Result<Json<CheckinOutcome>, ApiError> {
    let outcome = ctx
        .run(move |conn, config| Ok(checkins::submit_checkin(conn, config, &submission)?))
        .await?;
    Ok(Json(outcome))
}

pub async fn attributions(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttributionView>>, ApiError> {
    let checkin_id = parse_id(&id, "check-in")?;
    let views = ctx
        .run(move |conn, _| Ok(checkins::get_attributions(conn, &checkin_id)?))
        .await?;
    Ok(Json(views))
}

pub async fn feedback(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<CheckinFeedback>, ApiError> {
    let checkin_id = parse_id(&id, "check-in")?;
    let feedback = ctx
        .run(move |conn, config| Ok(checkins::checkin_feedback(conn, config, &checkin_id)?))
        .await?;
    Ok(Json(feedback))
}
