//! Check-in submission.
//!
//! Sequence, all inside one write transaction:
//! 1. normalize sliders
//! 2. resolve the patient's previous check-in
//! 3. score the check-in and store it
//! 4. replace (or recompute) its product attributions
//! 5. refresh the aggregate of every product touched
//!
//! Any failure drops the transaction, which rolls everything back.

use std::collections::BTreeSet;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::refresh_products;
use super::begin_write;
use super::error::CheckinError;
use crate::config::EngineConfig;
use crate::db::repository::{
    delete_attributions_for_checkin, get_attributions_for_checkin, get_checkin, get_latest_checkin,
    get_patient, get_previous_checkin, insert_attribution, insert_checkin, now, product_exists,
    update_attribution_scores, update_checkin_scores,
};
use crate::models::{RawSliders, WellnessAttribution, WellnessCheck};
use crate::scoring::{
    allocate, compute_qol, normalize_sliders, pct_change, validate_allocations,
    validate_cannabis_pct, AllocationPlan, ProductAllocation, ProductCredit,
};

/// A patient's check-in as submitted by the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinSubmission {
    pub patient_id: Uuid,
    /// Set to revise the patient's latest check-in instead of creating one.
    #[serde(default)]
    pub checkin_id: Option<Uuid>,
    #[serde(default)]
    pub sliders: RawSliders,
    #[serde(default)]
    pub products_changed: bool,
    #[serde(default)]
    pub cannabis_pct: f64,
    #[serde(default)]
    pub products: Vec<ProductAllocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOverall {
    pub product_id: Uuid,
    pub overall_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinOutcome {
    pub checkin_id: Uuid,
    pub overall_qol: f64,
    pub pct_change_qol: Option<f64>,
    pub total_qol_delta: f64,
    pub cannabis_contribution: f64,
    pub per_product_overall_pct: Vec<ProductOverall>,
}

/// Submit (or revise) a check-in. Nothing is persisted unless every step succeeds.
pub fn submit_checkin(
    conn: &Connection,
    config: &EngineConfig,
    submission: &CheckinSubmission,
) -> Result<CheckinOutcome, CheckinError> {
    validate_cannabis_pct(submission.cannabis_pct)?;
    if submission.products_changed {
        validate_allocations(&submission.products, config.allocation_tolerance)?;
    }

    let tx = begin_write(conn)?;
    match submit_in_transaction(&tx, config, submission) {
        Ok(outcome) => {
            tx.commit()?;
            tracing::info!(
                checkin_id = %outcome.checkin_id,
                patient_id = %submission.patient_id,
                overall_qol = outcome.overall_qol,
                attributions = outcome.per_product_overall_pct.len(),
                "Check-in committed"
            );
            Ok(outcome)
        }
        Err(err) => {
            tracing::warn!(
                patient_id = %submission.patient_id,
                error = %err,
                "Check-in rolled back"
            );
            Err(err)
        }
    }
}

fn submit_in_transaction(
    conn: &Connection,
    config: &EngineConfig,
    submission: &CheckinSubmission,
) -> Result<CheckinOutcome, CheckinError> {
    let sliders = normalize_sliders(&submission.sliders, config);

    if get_patient(conn, &submission.patient_id)?.is_none() {
        return Err(CheckinError::not_found("Patient", submission.patient_id));
    }
    if submission.products_changed {
        for p in &submission.products {
            if !product_exists(conn, &p.product_id)? {
                return Err(CheckinError::not_found("Product", p.product_id));
            }
        }
    }

    let (mut checkin, previous, is_new) = match submission.checkin_id {
        Some(id) => {
            let (existing, previous) = resolve_revision(conn, submission.patient_id, id)?;
            (existing, previous, false)
        }
        None => {
            let latest = get_latest_checkin(conn, &submission.patient_id)?;
            // Never date a new check-in before the latest one, even if the clock moved back.
            let stamp = now();
            let checkin_date = latest.as_ref().map_or(stamp, |l| l.checkin_date.max(stamp));
            let checkin = WellnessCheck {
                id: Uuid::new_v4(),
                seq: 0,
                patient_id: submission.patient_id,
                checkin_date,
                sliders,
                cannabis_pct: submission.cannabis_pct,
                overall_qol: 0.0,
                pct_change_qol: None,
            };
            (checkin, latest, true)
        }
    };

    checkin.sliders = sliders;
    checkin.cannabis_pct = submission.cannabis_pct;
    checkin.overall_qol = f64::from(compute_qol(&sliders));
    checkin.pct_change_qol = pct_change(checkin.overall_qol, previous.as_ref().map(|p| p.overall_qol));

    if is_new {
        checkin.seq = insert_checkin(conn, &checkin)?;
    } else {
        update_checkin_scores(conn, &checkin)?;
    }

    let existing = if is_new {
        Vec::new()
    } else {
        get_attributions_for_checkin(conn, &checkin.id)?
    };

    // Baseline check-ins have nothing to attribute.
    let allocations: Vec<ProductAllocation> = if submission.products_changed {
        if previous.is_some() {
            submission.products.clone()
        } else {
            Vec::new()
        }
    } else {
        existing
            .iter()
            .map(|a| ProductAllocation {
                product_id: a.product_id,
                allocation_pct: a.allocation_pct,
            })
            .collect()
    };

    let plan = allocate(
        &checkin.sliders,
        previous.as_ref().map(|p| &p.sliders),
        &allocations,
        checkin.cannabis_pct,
        config.allocation_tolerance,
    )?;

    let mut touched: BTreeSet<Uuid> = BTreeSet::new();
    if submission.products_changed {
        touched.extend(delete_attributions_for_checkin(conn, &checkin.id)?);
        let created = now();
        for credit in &plan.credits {
            insert_attribution(conn, &attribution_from_credit(checkin.id, credit, created))?;
            touched.insert(credit.product_id);
        }
        tracing::debug!(
            checkin_id = %checkin.id,
            removed = existing.len(),
            added = plan.credits.len(),
            "Replaced check-in attributions"
        );
    } else {
        for (row, credit) in existing.iter().zip(&plan.credits) {
            let mut updated = attribution_from_credit(checkin.id, credit, row.created_at);
            updated.id = row.id;
            update_attribution_scores(conn, &updated)?;
            touched.insert(row.product_id);
        }
    }

    refresh_products(conn, touched)?;

    Ok(outcome_for(&checkin, &plan))
}

/// Load a check-in for revision. Only the patient's latest check-in may be
/// revised, since later check-ins are scored against it.
fn resolve_revision(
    conn: &Connection,
    patient_id: Uuid,
    checkin_id: Uuid,
) -> Result<(WellnessCheck, Option<WellnessCheck>), CheckinError> {
    let existing = get_checkin(conn, &checkin_id)?
        .filter(|c| c.patient_id == patient_id)
        .ok_or_else(|| CheckinError::not_found("WellnessCheck", checkin_id))?;

    let latest = get_latest_checkin(conn, &patient_id)?;
    if latest.as_ref().map(|l| l.id) != Some(existing.id) {
        return Err(CheckinError::Validation(
            "Only the most recent check-in can be revised".into(),
        ));
    }

    let previous = get_previous_checkin(conn, &existing)?;
    Ok((existing, previous))
}

fn attribution_from_credit(
    checkin_id: Uuid,
    credit: &ProductCredit,
    created_at: chrono::NaiveDateTime,
) -> WellnessAttribution {
    WellnessAttribution {
        id: Uuid::new_v4(),
        wellness_check_id: checkin_id,
        product_id: credit.product_id,
        allocation_pct: credit.allocation_pct,
        pain_pct: credit.pain_pct,
        mood_pct: credit.mood_pct,
        energy_pct: credit.energy_pct,
        clarity_pct: credit.clarity_pct,
        appetite_pct: credit.appetite_pct,
        sleep_pct: credit.sleep_pct,
        derived_qol: Some(credit.derived_qol()),
        overall_pct: Some(credit.overall_pct),
        created_at,
    }
}

fn outcome_for(checkin: &WellnessCheck, plan: &AllocationPlan) -> CheckinOutcome {
    CheckinOutcome {
        checkin_id: checkin.id,
        overall_qol: checkin.overall_qol,
        pct_change_qol: checkin.pct_change_qol,
        total_qol_delta: plan.total_qol_delta,
        cannabis_contribution: plan.cannabis_contribution,
        per_product_overall_pct: plan
            .credits
            .iter()
            .map(|c| ProductOverall {
                product_id: c.product_id,
                overall_pct: c.overall_pct,
            })
            .collect(),
    }
}
