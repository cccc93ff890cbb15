use rusqlite::Connection;
use uuid::Uuid;

use super::aggregates::refresh_products;
use super::begin_write;
use super::error::CheckinError;
use crate::db::repository::{
    delete_patient_row, get_patient, insert_patient, insert_product, now, product_ids_for_patient,
};
use crate::models::{Patient, Product};

const MAX_NAME_LEN: usize = 200;

fn validate_name(field: &str, value: &str) -> Result<String, CheckinError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CheckinError::Validation(format!("{field} is required")));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(CheckinError::Validation(format!(
            "{field} must be {MAX_NAME_LEN} characters or fewer"
        )));
    }
    Ok(trimmed.to_string())
}

/// Register a pseudonymous patient so check-ins can reference it.
pub fn register_patient(conn: &Connection, pseudonym: &str) -> Result<Patient, CheckinError> {
    let patient = Patient {
        id: Uuid::new_v4(),
        pseudonym: validate_name("Pseudonym", pseudonym)?,
        created_at: now(),
    };
    insert_patient(conn, &patient)?;
    tracing::info!(patient_id = %patient.id, "Registered patient");
    Ok(patient)
}

pub fn register_product(conn: &Connection, name: &str) -> Result<Product, CheckinError> {
    let product = Product {
        id: Uuid::new_v4(),
        name: validate_name("Product name", name)?,
        created_at: now(),
    };
    insert_product(conn, &product)?;
    tracing::info!(product_id = %product.id, name = %product.name, "Registered product");
    Ok(product)
}

/// Delete a patient with their whole check-in history.
///
/// The cascade removes attributions, so every product the patient ever
/// credited is re-aggregated inside the same transaction. Returns the number
/// of aggregates refreshed.
pub fn delete_patient(conn: &Connection, patient_id: &Uuid) -> Result<usize, CheckinError> {
    let tx = begin_write(conn)?;
    if get_patient(&tx, patient_id)?.is_none() {
        return Err(CheckinError::not_found("Patient", patient_id));
    }

    let credited = product_ids_for_patient(&tx, patient_id)?;
    delete_patient_row(&tx, patient_id)?;
    let refreshed = refresh_products(&tx, credited)?.len();
    tx.commit()?;

    tracing::info!(%patient_id, refreshed, "Deleted patient and refreshed aggregates");
    Ok(refreshed)
}
