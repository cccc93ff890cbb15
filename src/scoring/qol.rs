use crate::models::enums::Metric;
use crate::models::{Sliders, SLIDER_MAX};

/// Largest possible oriented slider total (every dimension at its best).
pub const MAX_ORIENTED_TOTAL: i32 = Metric::ALL.len() as i32 * SLIDER_MAX as i32;

/// Sum of the six readings with pain inverted, in 6..=60.
pub fn oriented_total(sliders: &Sliders) -> i32 {
    Metric::ALL.iter().map(|m| sliders.oriented(*m)).sum()
}

/// Overall quality-of-life score on a 0-100 scale, rounded to an integer.
///
/// All six dimensions weigh equally. For readings in 1..=10 the result is
/// in 10..=100.
pub fn compute_qol(sliders: &Sliders) -> u8 {
    let total = oriented_total(sliders);
    // total * 100 / 60 never lands on .5, so half-up integer rounding is exact.
    ((total * 100 + MAX_ORIENTED_TOTAL / 2) / MAX_ORIENTED_TOTAL) as u8
}

/// Percent change against the previous score; `None` without a usable baseline.
pub fn pct_change(current: f64, previous: Option<f64>) -> Option<f64> {
    match previous {
        Some(prev) if prev != 0.0 => Some((current - prev) / prev * 100.0),
        _ => None,
    }
}
