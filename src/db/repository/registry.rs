use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Patient, Product};

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, pseudonym, created_at) VALUES (?1, ?2, ?3)",
        params![
            patient.id.to_string(),
            patient.pseudonym,
            format_datetime(&patient.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, pseudonym, created_at FROM patients WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, pseudonym, created_at)| {
        Ok(Patient {
            id: parse_uuid(&id)?,
            pseudonym,
            created_at: parse_datetime(&created_at)?,
        })
    })
    .transpose()
}

/// Deletes the patient row; check-ins and attributions go with it via cascade.
pub fn delete_patient_row(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM patients WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn insert_product(conn: &Connection, product: &Product) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO products (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![
            product.id.to_string(),
            product.name,
            format_datetime(&product.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_product(conn: &Connection, id: &Uuid) -> Result<Option<Product>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, created_at FROM products WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, name, created_at)| {
        Ok(Product {
            id: parse_uuid(&id)?,
            name,
            created_at: parse_datetime(&created_at)?,
        })
    })
    .transpose()
}

pub fn product_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM products WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
