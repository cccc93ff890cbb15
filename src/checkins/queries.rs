//! Read-side operations. None of these write, so they run on a plain connection.

use rusqlite::Connection;
use uuid::Uuid;

use super::error::CheckinError;
use crate::config::EngineConfig;
use crate::db::repository::{
    check_aggregate_consistency, fetch_attribution_views, get_aggregate, get_checkin,
    get_checkins_for_patient, get_patient, get_previous_checkin, now, overall_pct_values_for_product,
    product_exists, sum_patient_product_pct, top_ranked_products, AggregateConsistencyReport,
};
use crate::models::{AttributionView, ProductAggregateScore, QolStats, RankedProduct, WellnessCheck};
use crate::scoring::{build_feedback, summarize_qol, CheckinFeedback};

/// Upper bound for leaderboard requests.
pub const MAX_TOP_PRODUCTS: u32 = 100;

fn require_product(conn: &Connection, product_id: &Uuid) -> Result<(), CheckinError> {
    if product_exists(conn, product_id)? {
        Ok(())
    } else {
        Err(CheckinError::not_found("Product", product_id))
    }
}

fn require_patient(conn: &Connection, patient_id: &Uuid) -> Result<(), CheckinError> {
    match get_patient(conn, patient_id)? {
        Some(_) => Ok(()),
        None => Err(CheckinError::not_found("Patient", patient_id)),
    }
}

/// Attribution breakdown of one check-in, largest allocation first.
///
/// A check-in without attributions (a baseline, or one with no products)
/// yields an empty list.
pub fn get_attributions(conn: &Connection, checkin_id: &Uuid) -> Result<Vec<AttributionView>, CheckinError> {
    if get_checkin(conn, checkin_id)?.is_none() {
        return Err(CheckinError::not_found("WellnessCheck", checkin_id));
    }
    Ok(fetch_attribution_views(conn, checkin_id)?)
}

/// Cached aggregate for a product.
///
/// A product nobody has credited yet reports zero votes and no statistics.
pub fn get_product_aggregate(
    conn: &Connection,
    product_id: &Uuid,
) -> Result<ProductAggregateScore, CheckinError> {
    require_product(conn, product_id)?;
    Ok(get_aggregate(conn, product_id)?.unwrap_or_else(|| ProductAggregateScore::empty(*product_id, now())))
}

pub fn list_checkins(conn: &Connection, patient_id: &Uuid) -> Result<Vec<WellnessCheck>, CheckinError> {
    require_patient(conn, patient_id)?;
    Ok(get_checkins_for_patient(conn, patient_id)?)
}

/// Compare a check-in with the one before it.
pub fn checkin_feedback(
    conn: &Connection,
    config: &EngineConfig,
    checkin_id: &Uuid,
) -> Result<CheckinFeedback, CheckinError> {
    let checkin = get_checkin(conn, checkin_id)?
        .ok_or_else(|| CheckinError::not_found("WellnessCheck", checkin_id))?;
    let previous = get_previous_checkin(conn, &checkin)?;

    Ok(build_feedback(
        &checkin.sliders,
        previous.as_ref().map(|p| &p.sliders),
        checkin.pct_change_qol,
        config.feedback_highlight_threshold,
    ))
}

/// Live statistics over every attribution of a product.
pub fn product_qol_stats(conn: &Connection, product_id: &Uuid) -> Result<QolStats, CheckinError> {
    require_product(conn, product_id)?;
    let values = overall_pct_values_for_product(conn, product_id)?;
    Ok(summarize_qol(*product_id, &values))
}

/// Products ranked by average QoL contribution. `limit` is capped at
/// [`MAX_TOP_PRODUCTS`].
pub fn top_products(conn: &Connection, limit: u32) -> Result<Vec<RankedProduct>, CheckinError> {
    Ok(top_ranked_products(conn, limit.min(MAX_TOP_PRODUCTS))?)
}

/// Total QoL points a patient has credited to one product.
pub fn patient_product_contribution(
    conn: &Connection,
    patient_id: &Uuid,
    product_id: &Uuid,
) -> Result<f64, CheckinError> {
    require_patient(conn, patient_id)?;
    require_product(conn, product_id)?;
    Ok(sum_patient_product_pct(conn, patient_id, product_id)?)
}

pub fn check_consistency(conn: &Connection) -> Result<AggregateConsistencyReport, CheckinError> {
    let report = check_aggregate_consistency(conn)?;
    if report.drift_detected {
        tracing::warn!(issues = report.issues.len(), "Product aggregates drifted from attributions");
    }
    Ok(report)
}
