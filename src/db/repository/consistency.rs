use rusqlite::Connection;
use serde::Serialize;

use super::aggregate::{compute_live_aggregate, get_all_aggregates, products_missing_aggregate};
use crate::db::DatabaseError;
use crate::models::ProductAggregateScore;

/// A single consistency issue detected by the checker.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyIssue {
    pub category: String,
    pub severity: String,
    pub description: String,
    pub product_id: Option<String>,
}

/// Result of comparing cached product aggregates with their live attribution sets.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateConsistencyReport {
    pub issues: Vec<ConsistencyIssue>,
    pub aggregates_checked: i64,
    pub drift_detected: bool,
}

/// Run a full consistency check over `product_aggregate_scores`.
///
/// Detects:
/// - Cached aggregates whose statistics differ from the live attribution set
/// - Products with attributions but no cached aggregate row
pub fn check_aggregate_consistency(conn: &Connection) -> Result<AggregateConsistencyReport, DatabaseError> {
    let mut issues = Vec::new();

    // 1. Cached rows that drifted from their source
    let cached = get_all_aggregates(conn)?;
    for score in &cached {
        let live = compute_live_aggregate(conn, &score.product_id)?;
        let expected = ProductAggregateScore {
            product_id: score.product_id,
            total_votes: live.count,
            avg_qol: live.avg,
            min_qol: live.min,
            max_qol: live.max,
            updated_at: score.updated_at,
        };
        if !score.same_stats(&expected) {
            issues.push(ConsistencyIssue {
                category: "aggregate_drift".into(),
                severity: "high".into(),
                description: format!(
                    "Aggregate drifted: stored votes={}/avg={:?}, actual votes={}/avg={:?}",
                    score.total_votes, score.avg_qol, live.count, live.avg
                ),
                product_id: Some(score.product_id.to_string()),
            });
        }
    }

    // 2. Attributed products never aggregated
    for product_id in products_missing_aggregate(conn)? {
        issues.push(ConsistencyIssue {
            category: "missing_aggregate".into(),
            severity: "medium".into(),
            description: "Product has attributions but no aggregate row".into(),
            product_id: Some(product_id.to_string()),
        });
    }

    let drift_detected = !issues.is_empty();
    Ok(AggregateConsistencyReport {
        issues,
        aggregates_checked: cached.len() as i64,
        drift_detected,
    })
}
