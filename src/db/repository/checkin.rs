use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Sliders, WellnessCheck};

const CHECKIN_COLUMNS: &str = "seq, id, patient_id, checkin_date,
     pain_level, mood_level, energy_level, clarity_level, appetite_level, sleep_level,
     cannabis_pct, overall_qol, pct_change_qol";

type CheckinRow = (
    i64, String, String, String,
    u8, u8, u8, u8, u8, u8,
    f64, f64, Option<f64>,
);

fn read_checkin_row(row: &Row<'_>) -> rusqlite::Result<CheckinRow> {
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

fn checkin_from_row(row: CheckinRow) -> Result<WellnessCheck, DatabaseError> {
    let (
        seq, id, patient_id, checkin_date,
        pain, mood, energy, clarity, appetite, sleep,
        cannabis_pct, overall_qol, pct_change_qol,
    ) = row;
    Ok(WellnessCheck {
        id: parse_uuid(&id)?,
        seq,
        patient_id: parse_uuid(&patient_id)?,
        checkin_date: parse_datetime(&checkin_date)?,
        sliders: Sliders { pain, mood, energy, clarity, appetite, sleep },
        cannabis_pct,
        overall_qol,
        pct_change_qol,
    })
}

/// Inserts a check-in and returns its storage sequence number.
pub fn insert_checkin(conn: &Connection, checkin: &WellnessCheck) -> Result<i64, DatabaseError> {
    let s = &checkin.sliders;
    conn.execute(
        "INSERT INTO wellness_checks (id, patient_id, checkin_date,
         pain_level, mood_level, energy_level, clarity_level, appetite_level, sleep_level,
         cannabis_pct, overall_qol, pct_change_qol)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            checkin.id.to_string(),
            checkin.patient_id.to_string(),
            format_datetime(&checkin.checkin_date),
            s.pain,
            s.mood,
            s.energy,
            s.clarity,
            s.appetite,
            s.sleep,
            checkin.cannabis_pct,
            checkin.overall_qol,
            checkin.pct_change_qol,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites the sliders and derived fields of an existing check-in.
pub fn update_checkin_scores(conn: &Connection, checkin: &WellnessCheck) -> Result<(), DatabaseError> {
    let s = &checkin.sliders;
    let updated = conn.execute(
        "UPDATE wellness_checks SET
         pain_level = ?1, mood_level = ?2, energy_level = ?3,
         clarity_level = ?4, appetite_level = ?5, sleep_level = ?6,
         cannabis_pct = ?7, overall_qol = ?8, pct_change_qol = ?9
         WHERE id = ?10",
        params![
            s.pain,
            s.mood,
            s.energy,
            s.clarity,
            s.appetite,
            s.sleep,
            checkin.cannabis_pct,
            checkin.overall_qol,
            checkin.pct_change_qol,
            checkin.id.to_string(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "WellnessCheck".into(),
            id: checkin.id.to_string(),
        });
    }
    Ok(())
}

pub fn get_checkin(conn: &Connection, id: &Uuid) -> Result<Option<WellnessCheck>, DatabaseError> {
    let sql = format!("SELECT {CHECKIN_COLUMNS} FROM wellness_checks WHERE id = ?1");
    conn.query_row(&sql, params![id.to_string()], read_checkin_row)
        .optional()?
        .map(checkin_from_row)
        .transpose()
}

/// The patient's check-in immediately before `checkin` in (checkin_date, seq) order.
pub fn get_previous_checkin(
    conn: &Connection,
    checkin: &WellnessCheck,
) -> Result<Option<WellnessCheck>, DatabaseError> {
    let sql = format!(
        "SELECT {CHECKIN_COLUMNS} FROM wellness_checks
         WHERE patient_id = ?1
           AND (checkin_date < ?2 OR (checkin_date = ?2 AND seq < ?3))
         ORDER BY checkin_date DESC, seq DESC
         LIMIT 1"
    );
    conn.query_row(
        &sql,
        params![
            checkin.patient_id.to_string(),
            format_datetime(&checkin.checkin_date),
            checkin.seq,
        ],
        read_checkin_row,
    )
    .optional()?
    .map(checkin_from_row)
    .transpose()
}

/// The patient's most recent check-in, if any.
pub fn get_latest_checkin(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<WellnessCheck>, DatabaseError> {
    let sql = format!(
        "SELECT {CHECKIN_COLUMNS} FROM wellness_checks
         WHERE patient_id = ?1
         ORDER BY checkin_date DESC, seq DESC
         LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id.to_string()], read_checkin_row)
        .optional()?
        .map(checkin_from_row)
        .transpose()
}

/// All check-ins for a patient, oldest first.
pub fn get_checkins_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<WellnessCheck>, DatabaseError> {
    let sql = format!(
        "SELECT {CHECKIN_COLUMNS} FROM wellness_checks
         WHERE patient_id = ?1
         ORDER BY checkin_date ASC, seq ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id.to_string()], read_checkin_row)?;

    let mut checkins = Vec::new();
    for row in rows {
        checkins.push(checkin_from_row(row?)?);
    }
    Ok(checkins)
}

pub fn count_checkins(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM wellness_checks", [], |row| row.get(0))?;
    Ok(count)
}
