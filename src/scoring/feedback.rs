//! Plain-language comparison of a check-in with the one before it.

use serde::{Deserialize, Serialize};

use crate::models::enums::Metric;
use crate::models::Sliders;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub metric: Metric,
    pub previous: u8,
    pub current: u8,
    /// Percent change on the "higher is better" scale, one decimal.
    pub pct_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinFeedback {
    pub baseline: bool,
    /// Overall QoL percent change, one decimal. `None` for a baseline.
    pub overall_change: Option<f64>,
    pub metric_changes: Vec<MetricChange>,
    pub highlights: Vec<String>,
    pub paragraph: String,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Build feedback for `current` against `previous`.
///
/// `pct_change_qol` is the stored overall change; metrics moving by more than
/// `highlight_threshold` percent are called out.
pub fn build_feedback(
    current: &Sliders,
    previous: Option<&Sliders>,
    pct_change_qol: Option<f64>,
    highlight_threshold: f64,
) -> CheckinFeedback {
    let Some(previous) = previous else {
        return CheckinFeedback {
            baseline: true,
            overall_change: None,
            metric_changes: Vec::new(),
            highlights: Vec::new(),
            paragraph: "Baseline recorded. Future check-ins will be compared against this one.".into(),
        };
    };

    let metric_changes: Vec<MetricChange> = Metric::ALL
        .iter()
        .map(|m| {
            // Oriented values are always >= 1, so the division is safe.
            let before = f64::from(previous.oriented(*m));
            let after = f64::from(current.oriented(*m));
            MetricChange {
                metric: *m,
                previous: previous.get(*m),
                current: current.get(*m),
                pct_change: round1((after - before) / before * 100.0),
            }
        })
        .collect();

    let highlights: Vec<String> = metric_changes
        .iter()
        .filter_map(|c| {
            if c.pct_change > highlight_threshold {
                Some(format!("{} improved by {}%", c.metric.label(), c.pct_change))
            } else if c.pct_change < -highlight_threshold {
                Some(format!("{} declined by {}%", c.metric.label(), c.pct_change.abs()))
            } else {
                None
            }
        })
        .collect();

    let overall_change = pct_change_qol.map(round1);
    let mut paragraph = match overall_change {
        Some(change) if change > 0.0 => {
            format!("Your overall quality of life is up {change}% since your last check-in.")
        }
        Some(change) if change < 0.0 => format!(
            "Your overall quality of life is down {}% since your last check-in.",
            change.abs()
        ),
        _ => "Your overall quality of life is steady since your last check-in.".to_string(),
    };
    if !highlights.is_empty() {
        paragraph.push_str(&format!(" Highlights: {}.", highlights.join("; ")));
    }

    CheckinFeedback {
        baseline: false,
        overall_change,
        metric_changes,
        highlights,
        paragraph,
    }
}
