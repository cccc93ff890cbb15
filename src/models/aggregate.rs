use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cached per-product statistics over all attributions with an `overall_pct`.
///
/// `avg_qol`/`min_qol`/`max_qol` are `None` when `total_votes == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregateScore {
    pub product_id: Uuid,
    pub total_votes: i64,
    pub avg_qol: Option<f64>,
    pub min_qol: Option<f64>,
    pub max_qol: Option<f64>,
    pub updated_at: NaiveDateTime,
}

impl ProductAggregateScore {
    /// Shape reported for a product nobody has credited yet.
    pub fn empty(product_id: Uuid, updated_at: NaiveDateTime) -> Self {
        Self {
            product_id,
            total_votes: 0,
            avg_qol: None,
            min_qol: None,
            max_qol: None,
            updated_at,
        }
    }

    /// True when the four statistics match, ignoring `updated_at`.
    pub fn same_stats(&self, other: &Self) -> bool {
        fn close(a: Option<f64>, b: Option<f64>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => (x - y).abs() <= 1e-9,
                _ => false,
            }
        }
        self.product_id == other.product_id
            && self.total_votes == other.total_votes
            && close(self.avg_qol, other.avg_qol)
            && close(self.min_qol, other.min_qol)
            && close(self.max_qol, other.max_qol)
    }
}

/// Live statistics over a product's attributions, including signed vote counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QolStats {
    pub product_id: Uuid,
    pub total_votes: i64,
    pub positive_votes: i64,
    pub negative_votes: i64,
    pub avg_qol: Option<f64>,
    pub min_qol: Option<f64>,
    pub max_qol: Option<f64>,
    /// Intensity-weighted mean: larger swings count for more.
    pub weighted_avg: Option<f64>,
}

/// Row of the product leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub product_id: Uuid,
    pub name: String,
    pub total_votes: i64,
    pub avg_qol: f64,
}
