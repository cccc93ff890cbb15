use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::sliders::Sliders;

/// One committed patient check-in.
///
/// `seq` is the storage row counter and breaks ties between check-ins
/// that share a `checkin_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessCheck {
    pub id: Uuid,
    pub seq: i64,
    pub patient_id: Uuid,
    pub checkin_date: NaiveDateTime,
    pub sliders: Sliders,
    pub cannabis_pct: f64,
    pub overall_qol: f64,
    pub pct_change_qol: Option<f64>,
}
