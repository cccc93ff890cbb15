//! Product aggregate maintenance.
//!
//! Aggregates are recomputed from the full live attribution set on every
//! change instead of being adjusted incrementally, so edits and bulk
//! deletes can never leave a stale running total behind.

use std::collections::BTreeSet;

use rusqlite::Connection;
use uuid::Uuid;

use super::error::CheckinError;
use super::begin_write;
use crate::db::repository::{
    check_aggregate_consistency, compute_live_aggregate, now, upsert_aggregate, LiveAggregate,
};
use crate::models::ProductAggregateScore;

/// Tolerance for the avg-between-min-and-max sanity check.
const STAT_EPSILON: f64 = 1e-9;

/// Recompute and store one product's aggregate from its live attributions.
///
/// Runs on the caller's connection or transaction. A result that fails the
/// sanity checks is reported as `Consistency` and nothing is written.
pub fn refresh_product_aggregate(
    conn: &Connection,
    product_id: &Uuid,
) -> Result<ProductAggregateScore, CheckinError> {
    let live = compute_live_aggregate(conn, product_id)?;
    if let Err(reason) = verify_live_aggregate(&live) {
        tracing::error!(%product_id, ?live, reason, "Aggregate recomputation failed sanity check");
        return Err(CheckinError::Consistency(format!(
            "aggregate for product {product_id}: {reason}"
        )));
    }

    let score = ProductAggregateScore {
        product_id: *product_id,
        total_votes: live.count,
        avg_qol: live.avg,
        min_qol: live.min,
        max_qol: live.max,
        updated_at: now(),
    };
    upsert_aggregate(conn, &score)?;

    tracing::debug!(
        %product_id,
        total_votes = score.total_votes,
        avg_qol = ?score.avg_qol,
        "Refreshed product aggregate"
    );
    Ok(score)
}

/// Refresh each distinct product once, in id order.
pub fn refresh_products<I>(conn: &Connection, product_ids: I) -> Result<Vec<ProductAggregateScore>, CheckinError>
where
    I: IntoIterator<Item = Uuid>,
{
    let unique: BTreeSet<Uuid> = product_ids.into_iter().collect();
    unique
        .iter()
        .map(|id| refresh_product_aggregate(conn, id))
        .collect()
}

fn verify_live_aggregate(live: &LiveAggregate) -> Result<(), &'static str> {
    if live.count < 0 {
        return Err("negative vote count");
    }
    match (live.count, live.avg, live.min, live.max) {
        (0, None, None, None) => Ok(()),
        (0, _, _, _) => Err("statistics present without votes"),
        (_, Some(avg), Some(min), Some(max)) => {
            if !(avg.is_finite() && min.is_finite() && max.is_finite()) {
                Err("non-finite statistic")
            } else if min > max || avg < min - STAT_EPSILON || avg > max + STAT_EPSILON {
                Err("average outside min/max range")
            } else {
                Ok(())
            }
        }
        _ => Err("votes present without statistics"),
    }
}

/// Recompute every drifted or missing aggregate in one transaction.
///
/// Returns the number of products repaired.
pub fn repair_aggregates(conn: &Connection) -> Result<usize, CheckinError> {
    let tx = begin_write(conn)?;
    let report = check_aggregate_consistency(&tx)?;

    let mut targets = BTreeSet::new();
    for issue in &report.issues {
        if let Some(ref id) = issue.product_id {
            let product_id = Uuid::parse_str(id)
                .map_err(|e| CheckinError::Consistency(format!("bad product id '{id}': {e}")))?;
            targets.insert(product_id);
        }
    }

    let repaired = refresh_products(&tx, targets)?.len();
    tx.commit()?;

    if repaired > 0 {
        tracing::info!(repaired, "Repaired drifted product aggregates");
    }
    Ok(repaired)
}
