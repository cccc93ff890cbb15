use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{AttributionView, WellnessAttribution};

const ATTRIBUTION_COLUMNS: &str = "id, wellness_check_id, product_id, allocation_pct,
     pain_pct, mood_pct, energy_pct, clarity_pct, appetite_pct, sleep_pct,
     derived_qol, overall_pct, created_at";

type AttributionRow = (
    String, String, String, f64,
    Option<f64>, Option<f64>, Option<f64>, Option<f64>, Option<f64>, Option<f64>,
    Option<f64>, Option<f64>, String,
);

fn read_attribution_row(row: &Row<'_>) -> rusqlite::Result<AttributionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
    ))
}

fn attribution_from_row(row: AttributionRow) -> Result<WellnessAttribution, DatabaseError> {
    let (
        id, check_id, product_id, allocation_pct,
        pain_pct, mood_pct, energy_pct, clarity_pct, appetite_pct, sleep_pct,
        derived_qol, overall_pct, created_at,
    ) = row;
    Ok(WellnessAttribution {
        id: parse_uuid(&id)?,
        wellness_check_id: parse_uuid(&check_id)?,
        product_id: parse_uuid(&product_id)?,
        allocation_pct,
        pain_pct,
        mood_pct,
        energy_pct,
        clarity_pct,
        appetite_pct,
        sleep_pct,
        derived_qol,
        overall_pct,
        created_at: parse_datetime(&created_at)?,
    })
}

pub fn insert_attribution(conn: &Connection, a: &WellnessAttribution) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO wellness_attributions (id, wellness_check_id, product_id, allocation_pct,
         pain_pct, mood_pct, energy_pct, clarity_pct, appetite_pct, sleep_pct,
         derived_qol, overall_pct, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            a.id.to_string(),
            a.wellness_check_id.to_string(),
            a.product_id.to_string(),
            a.allocation_pct,
            a.pain_pct,
            a.mood_pct,
            a.energy_pct,
            a.clarity_pct,
            a.appetite_pct,
            a.sleep_pct,
            a.derived_qol,
            a.overall_pct,
            format_datetime(&a.created_at),
        ],
    )?;
    Ok(())
}

/// Rewrites the derived fields of an existing attribution.
pub fn update_attribution_scores(conn: &Connection, a: &WellnessAttribution) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE wellness_attributions SET
         pain_pct = ?1, mood_pct = ?2, energy_pct = ?3, clarity_pct = ?4,
         appetite_pct = ?5, sleep_pct = ?6, derived_qol = ?7, overall_pct = ?8
         WHERE id = ?9",
        params![
            a.pain_pct,
            a.mood_pct,
            a.energy_pct,
            a.clarity_pct,
            a.appetite_pct,
            a.sleep_pct,
            a.derived_qol,
            a.overall_pct,
            a.id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "WellnessAttribution".into(),
            id: a.id.to_string(),
        });
    }
    Ok(())
}

/// Deletes every attribution of a check-in. Returns the product ids that lost a row.
pub fn delete_attributions_for_checkin(
    conn: &Connection,
    checkin_id: &Uuid,
) -> Result<Vec<Uuid>, DatabaseError> {
    let product_ids = product_ids_for_checkin(conn, checkin_id)?;
    conn.execute(
        "DELETE FROM wellness_attributions WHERE wellness_check_id = ?1",
        params![checkin_id.to_string()],
    )?;
    Ok(product_ids)
}

pub fn product_ids_for_checkin(conn: &Connection, checkin_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT product_id FROM wellness_attributions WHERE wellness_check_id = ?1 ORDER BY product_id",
    )?;
    let rows = stmt.query_map(params![checkin_id.to_string()], |row| row.get::<_, String>(0))?;
    let mut ids = Vec::new();
    for row in rows {
        ids.push(parse_uuid(&row?)?);
    }
    Ok(ids)
}

/// Distinct products credited anywhere in a patient's history.
pub fn product_ids_for_patient(conn: &Connection, patient_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT wa.product_id
         FROM wellness_attributions wa
         JOIN wellness_checks wc ON wc.id = wa.wellness_check_id
         WHERE wc.patient_id = ?1
         ORDER BY wa.product_id",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| row.get::<_, String>(0))?;
    let mut ids = Vec::new();
    for row in rows {
        ids.push(parse_uuid(&row?)?);
    }
    Ok(ids)
}

pub fn get_attributions_for_checkin(
    conn: &Connection,
    checkin_id: &Uuid,
) -> Result<Vec<WellnessAttribution>, DatabaseError> {
    let sql = format!(
        "SELECT {ATTRIBUTION_COLUMNS} FROM wellness_attributions
         WHERE wellness_check_id = ?1
         ORDER BY created_at, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![checkin_id.to_string()], read_attribution_row)?;

    let mut attributions = Vec::new();
    for row in rows {
        attributions.push(attribution_from_row(row?)?);
    }
    Ok(attributions)
}

/// Attribution breakdown for a check-in joined with product names.
pub fn fetch_attribution_views(
    conn: &Connection,
    checkin_id: &Uuid,
) -> Result<Vec<AttributionView>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT wa.product_id, p.name, wa.allocation_pct, wa.overall_pct,
                wa.pain_pct, wa.mood_pct, wa.energy_pct, wa.clarity_pct,
                wa.appetite_pct, wa.sleep_pct
         FROM wellness_attributions wa
         LEFT JOIN products p ON p.id = wa.product_id
         WHERE wa.wellness_check_id = ?1
         ORDER BY wa.allocation_pct DESC, wa.product_id",
    )?;
    let rows = stmt.query_map(params![checkin_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, f64>(2)?,
            [
                row.get::<_, Option<f64>>(3)?,
                row.get::<_, Option<f64>>(4)?,
                row.get::<_, Option<f64>>(5)?,
                row.get::<_, Option<f64>>(6)?,
                row.get::<_, Option<f64>>(7)?,
                row.get::<_, Option<f64>>(8)?,
                row.get::<_, Option<f64>>(9)?,
            ],
        ))
    })?;

    let mut views = Vec::new();
    for row in rows {
        let (product_id, product_name, allocation_pct, pcts) = row?;
        let [overall_pct, pain_pct, mood_pct, energy_pct, clarity_pct, appetite_pct, sleep_pct] = pcts;
        views.push(AttributionView {
            product_id: parse_uuid(&product_id)?,
            product_name,
            allocation_pct,
            overall_pct,
            pain_pct,
            mood_pct,
            energy_pct,
            clarity_pct,
            appetite_pct,
            sleep_pct,
        });
    }
    Ok(views)
}

/// Every non-null `overall_pct` credited to a product.
pub fn overall_pct_values_for_product(conn: &Connection, product_id: &Uuid) -> Result<Vec<f64>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT overall_pct FROM wellness_attributions
         WHERE product_id = ?1 AND overall_pct IS NOT NULL",
    )?;
    let rows = stmt.query_map(params![product_id.to_string()], |row| row.get::<_, f64>(0))?;
    let mut values = Vec::new();
    for row in rows {
        values.push(row?);
    }
    Ok(values)
}

/// Sum of a patient's `overall_pct` credited to one product.
pub fn sum_patient_product_pct(
    conn: &Connection,
    patient_id: &Uuid,
    product_id: &Uuid,
) -> Result<f64, DatabaseError> {
    let total: Option<f64> = conn.query_row(
        "SELECT SUM(wa.overall_pct)
         FROM wellness_attributions wa
         JOIN wellness_checks wc ON wc.id = wa.wellness_check_id
         WHERE wc.patient_id = ?1 AND wa.product_id = ?2 AND wa.overall_pct IS NOT NULL",
        params![patient_id.to_string(), product_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(total.unwrap_or(0.0))
}

pub fn count_attributions(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM wellness_attributions", [], |row| row.get(0))?;
    Ok(count)
}
