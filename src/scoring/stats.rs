use uuid::Uuid;

use crate::models::QolStats;

/// Summarize a product's attribution values.
pub fn summarize_qol(product_id: Uuid, values: &[f64]) -> QolStats {
    if values.is_empty() {
        return QolStats {
            product_id,
            total_votes: 0,
            positive_votes: 0,
            negative_votes: 0,
            avg_qol: None,
            min_qol: None,
            max_qol: None,
            weighted_avg: None,
        };
    }

    let total = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let intensity: f64 = values.iter().map(|v| v.abs()).sum();
    let weighted_avg = (intensity > 0.0)
        .then(|| values.iter().map(|v| v * v.abs()).sum::<f64>() / intensity);

    QolStats {
        product_id,
        total_votes: values.len() as i64,
        positive_votes: values.iter().filter(|v| **v > 0.0).count() as i64,
        negative_votes: values.iter().filter(|v| **v < 0.0).count() as i64,
        avg_qol: Some(sum / total),
        min_qol: Some(min),
        max_qol: Some(max),
        weighted_avg,
    }
}
