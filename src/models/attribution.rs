use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Metric;

/// Credit for one product within one check-in's QoL change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessAttribution {
    pub id: Uuid,
    pub wellness_check_id: Uuid,
    pub product_id: Uuid,
    pub allocation_pct: f64,
    pub pain_pct: Option<f64>,
    pub mood_pct: Option<f64>,
    pub energy_pct: Option<f64>,
    pub clarity_pct: Option<f64>,
    pub appetite_pct: Option<f64>,
    pub sleep_pct: Option<f64>,
    pub derived_qol: Option<f64>,
    pub overall_pct: Option<f64>,
    pub created_at: NaiveDateTime,
}

impl WellnessAttribution {
    pub fn metric_pct(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pain => self.pain_pct,
            Metric::Mood => self.mood_pct,
            Metric::Energy => self.energy_pct,
            Metric::Clarity => self.clarity_pct,
            Metric::Appetite => self.appetite_pct,
            Metric::Sleep => self.sleep_pct,
        }
    }
}

/// Read-side shape returned by `get_attributions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionView {
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub allocation_pct: f64,
    pub overall_pct: Option<f64>,
    pub pain_pct: Option<f64>,
    pub mood_pct: Option<f64>,
    pub energy_pct: Option<f64>,
    pub clarity_pct: Option<f64>,
    pub appetite_pct: Option<f64>,
    pub sleep_pct: Option<f64>,
}
