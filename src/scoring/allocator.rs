//! Splits a check-in's QoL change across the products the patient credits.
//!
//! The patient first says what share of the change came from product use at
//! all (`cannabis_pct`), then how that share divides among products
//! (`allocation_pct`, summing to 100). Each product's `overall_pct` is the
//! resulting QoL-point contribution; the per-metric fields break that figure
//! down by each metric's share of the slider movement.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::qol::compute_qol;
use crate::models::enums::Metric;
use crate::models::Sliders;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Product allocations must total 100% (got {total:.2}%)")]
    TotalOutOfRange { total: f64 },

    #[error("Allocation for product {product_id} must be a finite, non-negative percentage (got {value})")]
    InvalidShare { product_id: Uuid, value: f64 },

    #[error("Product {0} appears more than once in the allocation list")]
    DuplicateProduct(Uuid),

    #[error("cannabis_pct must be between 0 and 100 (got {0})")]
    CannabisPctOutOfRange(f64),
}

/// One entry of the patient's allocation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAllocation {
    pub product_id: Uuid,
    pub allocation_pct: f64,
}

/// Per-metric movement on the "higher is better" scale (pain inverted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricDeltas {
    pub pain: i32,
    pub mood: i32,
    pub energy: i32,
    pub clarity: i32,
    pub appetite: i32,
    pub sleep: i32,
}

impl MetricDeltas {
    pub fn between(current: &Sliders, previous: &Sliders) -> Self {
        let d = |m: Metric| current.oriented(m) - previous.oriented(m);
        Self {
            pain: d(Metric::Pain),
            mood: d(Metric::Mood),
            energy: d(Metric::Energy),
            clarity: d(Metric::Clarity),
            appetite: d(Metric::Appetite),
            sleep: d(Metric::Sleep),
        }
    }

    pub fn get(&self, metric: Metric) -> i32 {
        match metric {
            Metric::Pain => self.pain,
            Metric::Mood => self.mood,
            Metric::Energy => self.energy,
            Metric::Clarity => self.clarity,
            Metric::Appetite => self.appetite,
            Metric::Sleep => self.sleep,
        }
    }

    pub fn total(&self) -> i32 {
        Metric::ALL.iter().map(|m| self.get(*m)).sum()
    }
}

/// Credit computed for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCredit {
    pub product_id: Uuid,
    pub allocation_pct: f64,
    pub overall_pct: f64,
    pub pain_pct: Option<f64>,
    pub mood_pct: Option<f64>,
    pub energy_pct: Option<f64>,
    pub clarity_pct: Option<f64>,
    pub appetite_pct: Option<f64>,
    pub sleep_pct: Option<f64>,
}

impl ProductCredit {
    /// Same scale as `overall_pct` by construction.
    pub fn derived_qol(&self) -> f64 {
        self.overall_pct
    }
}

/// Full result of one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub total_qol_delta: f64,
    pub cannabis_contribution: f64,
    pub metric_deltas: MetricDeltas,
    pub credits: Vec<ProductCredit>,
}

pub fn validate_cannabis_pct(cannabis_pct: f64) -> Result<(), AllocationError> {
    if !cannabis_pct.is_finite() || !(0.0..=100.0).contains(&cannabis_pct) {
        return Err(AllocationError::CannabisPctOutOfRange(cannabis_pct));
    }
    Ok(())
}

/// Reject malformed allocation lists. An empty list is valid (nothing to credit).
pub fn validate_allocations(products: &[ProductAllocation], tolerance: f64) -> Result<(), AllocationError> {
    if products.is_empty() {
        return Ok(());
    }

    let mut seen = HashSet::with_capacity(products.len());
    for p in products {
        if !p.allocation_pct.is_finite() || p.allocation_pct < 0.0 {
            return Err(AllocationError::InvalidShare {
                product_id: p.product_id,
                value: p.allocation_pct,
            });
        }
        if !seen.insert(p.product_id) {
            return Err(AllocationError::DuplicateProduct(p.product_id));
        }
    }

    let total: f64 = products.iter().map(|p| p.allocation_pct).sum();
    // Small epsilon so a total of exactly 99.9 or 100.1 is accepted.
    if (total - 100.0).abs() > tolerance + 1e-9 {
        return Err(AllocationError::TotalOutOfRange { total });
    }
    Ok(())
}

/// Compute every product's credit for a check-in.
///
/// Without a previous check-in the delta is 0, so every credit is 0 and
/// the per-metric breakdown is absent.
pub fn allocate(
    current: &Sliders,
    previous: Option<&Sliders>,
    products: &[ProductAllocation],
    cannabis_pct: f64,
    tolerance: f64,
) -> Result<AllocationPlan, AllocationError> {
    validate_cannabis_pct(cannabis_pct)?;
    validate_allocations(products, tolerance)?;

    let (total_qol_delta, metric_deltas) = match previous {
        Some(prev) => (
            f64::from(compute_qol(current)) - f64::from(compute_qol(prev)),
            MetricDeltas::between(current, prev),
        ),
        None => (0.0, MetricDeltas::default()),
    };
    let cannabis_contribution = total_qol_delta * (cannabis_pct / 100.0);
    let movement = metric_deltas.total();

    let credits = products
        .iter()
        .map(|p| {
            let overall_pct = cannabis_contribution * (p.allocation_pct / 100.0);
            let share = |m: Metric| {
                (movement != 0).then(|| overall_pct * f64::from(metric_deltas.get(m)) / f64::from(movement))
            };
            ProductCredit {
                product_id: p.product_id,
                allocation_pct: p.allocation_pct,
                overall_pct,
                pain_pct: share(Metric::Pain),
                mood_pct: share(Metric::Mood),
                energy_pct: share(Metric::Energy),
                clarity_pct: share(Metric::Clarity),
                appetite_pct: share(Metric::Appetite),
                sleep_pct: share(Metric::Sleep),
            }
        })
        .collect();

    Ok(AllocationPlan {
        total_qol_delta,
        cannabis_contribution,
        metric_deltas,
        credits,
    })
}
