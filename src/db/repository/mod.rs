//! Repository layer: entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, so callers decide whether
//! they run inside a transaction.

mod aggregate;
mod attribution;
mod checkin;
mod consistency;
mod registry;

use chrono::{NaiveDateTime, Timelike};
use uuid::Uuid;

use super::DatabaseError;

pub use aggregate::*;
pub use attribution::*;
pub use checkin::*;
pub use consistency::*;
pub use registry::*;

/// Storage format for timestamps. Fixed-width so text order matches time order.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn format_datetime(ts: &NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid timestamp '{s}': {e}")))
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// Current UTC time at storage precision (microseconds).
pub(crate) fn now() -> NaiveDateTime {
    let ts = chrono::Utc::now().naive_utc();
    ts.with_nanosecond(ts.nanosecond() / 1_000 * 1_000).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{
        Patient, Product, ProductAggregateScore, Sliders, WellnessAttribution, WellnessCheck, SLIDER_MAX, SLIDER_MIN,
    };
    use rusqlite::Connection;

    fn make_patient(conn: &Connection) -> Patient {
        let patient = Patient { id: Uuid::new_v4(), pseudonym: "P-1".into(), created_at: now() };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    fn make_product(conn: &Connection, name: &str) -> Product {
        let product = Product { id: Uuid::new_v4(), name: name.into(), created_at: now() };
        insert_product(conn, &product).unwrap();
        product
    }

    fn make_checkin(conn: &Connection, patient_id: Uuid, checkin_date: NaiveDateTime, qol: f64) -> WellnessCheck {
        let mut checkin = WellnessCheck {
            id: Uuid::new_v4(),
            seq: 0,
            patient_id,
            checkin_date,
            sliders: Sliders { pain: 5, mood: 5, energy: 5, clarity: 5, appetite: 5, sleep: 5 },
            cannabis_pct: 50.0,
            overall_qol: qol,
            pct_change_qol: None,
        };
        checkin.seq = insert_checkin(conn, &checkin).unwrap();
        checkin
    }

    fn make_attribution(conn: &Connection, checkin_id: Uuid, product_id: Uuid, overall: f64) -> WellnessAttribution {
        let a = WellnessAttribution {
            derived_qol: Some(overall),
            overall_pct: Some(overall),
            ..make_attribution_template(checkin_id, product_id)
        };
        insert_attribution(conn, &a).unwrap();
        a
    }

    fn date(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn datetime_roundtrip_keeps_microseconds() {
        let ts = date("2025-03-01 08:30:00") + chrono::Duration::microseconds(123_456);
        assert_eq!(parse_datetime(&format_datetime(&ts)).unwrap(), ts);
        assert_eq!(parse_datetime("2025-03-01 08:30:00").unwrap(), date("2025-03-01 08:30:00"));
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn registry_roundtrip() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let product = make_product(&conn, "Alpha");

        assert_eq!(get_patient(&conn, &patient.id).unwrap(), Some(patient));
        assert_eq!(get_product(&conn, &product.id).unwrap(), Some(product.clone()));
        assert!(product_exists(&conn, &product.id).unwrap());
        assert!(!product_exists(&conn, &Uuid::new_v4()).unwrap());
        assert!(get_product(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn checkin_roundtrip() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let checkin = make_checkin(&conn, patient.id, date("2025-03-01 08:00:00"), 50.0);

        let loaded = get_checkin(&conn, &checkin.id).unwrap().unwrap();
        assert_eq!(loaded, checkin);
        assert!(get_checkin(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn previous_uses_date_then_sequence() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let same = date("2025-03-02 09:00:00");
        let first = make_checkin(&conn, patient.id, date("2025-03-01 09:00:00"), 30.0);
        let second = make_checkin(&conn, patient.id, same, 40.0);
        let third = make_checkin(&conn, patient.id, same, 50.0);

        assert!(get_previous_checkin(&conn, &first).unwrap().is_none());
        assert_eq!(get_previous_checkin(&conn, &second).unwrap().unwrap().id, first.id);
        assert_eq!(get_previous_checkin(&conn, &third).unwrap().unwrap().id, second.id);
        assert_eq!(get_latest_checkin(&conn, &patient.id).unwrap().unwrap().id, third.id);

        let ids: Vec<Uuid> = get_checkins_for_patient(&conn, &patient.id)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn previous_ignores_other_patients() {
        let conn = open_memory_database().unwrap();
        let alice = make_patient(&conn);
        let bob = make_patient(&conn);
        make_checkin(&conn, alice.id, date("2025-03-01 09:00:00"), 30.0);
        let bobs = make_checkin(&conn, bob.id, date("2025-03-02 09:00:00"), 30.0);
        assert!(get_previous_checkin(&conn, &bobs).unwrap().is_none());
    }

    #[test]
    fn slider_check_constraint_matches_bounds() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let checkin = |pain: u8| WellnessCheck {
            id: Uuid::new_v4(),
            seq: 0,
            patient_id: patient.id,
            checkin_date: now(),
            sliders: Sliders { pain, mood: 5, energy: 5, clarity: 5, appetite: 5, sleep: 5 },
            cannabis_pct: 0.0,
            overall_qol: 50.0,
            pct_change_qol: None,
        };
        assert!(insert_checkin(&conn, &checkin(SLIDER_MAX + 1)).is_err());
        assert!(insert_checkin(&conn, &checkin(SLIDER_MIN - 1)).is_err());
        assert!(insert_checkin(&conn, &checkin(SLIDER_MAX)).is_ok());
        assert!(insert_checkin(&conn, &checkin(SLIDER_MIN)).is_ok());
    }

    #[test]
    fn duplicate_product_in_checkin_rejected() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let product = make_product(&conn, "Alpha");
        let checkin = make_checkin(&conn, patient.id, now(), 50.0);
        make_attribution(&conn, checkin.id, product.id, 5.0);

        let dup = make_attribution_template(checkin.id, product.id);
        assert!(insert_attribution(&conn, &dup).is_err());
    }

    fn make_attribution_template(checkin_id: Uuid, product_id: Uuid) -> WellnessAttribution {
        WellnessAttribution {
            id: Uuid::new_v4(),
            wellness_check_id: checkin_id,
            product_id,
            allocation_pct: 100.0,
            pain_pct: None,
            mood_pct: None,
            energy_pct: None,
            clarity_pct: None,
            appetite_pct: None,
            sleep_pct: None,
            derived_qol: None,
            overall_pct: None,
            created_at: now(),
        }
    }

    #[test]
    fn credited_product_cannot_be_deleted() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let product = make_product(&conn, "Alpha");
        let checkin = make_checkin(&conn, patient.id, now(), 50.0);
        make_attribution(&conn, checkin.id, product.id, 5.0);

        let result = conn.execute("DELETE FROM products WHERE id = ?1", [product.id.to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn deleting_patient_cascades() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let product = make_product(&conn, "Alpha");
        let checkin = make_checkin(&conn, patient.id, now(), 50.0);
        make_attribution(&conn, checkin.id, product.id, 5.0);

        assert_eq!(product_ids_for_patient(&conn, &patient.id).unwrap(), vec![product.id]);
        delete_patient_row(&conn, &patient.id).unwrap();
        assert_eq!(count_checkins(&conn).unwrap(), 0);
        assert_eq!(count_attributions(&conn).unwrap(), 0);
        assert!(matches!(
            delete_patient_row(&conn, &patient.id),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_attributions_reports_products() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let a = make_product(&conn, "Alpha");
        let b = make_product(&conn, "Beta");
        let checkin = make_checkin(&conn, patient.id, now(), 50.0);
        make_attribution(&conn, checkin.id, a.id, 5.0);
        make_attribution(&conn, checkin.id, b.id, 3.0);

        let mut removed = delete_attributions_for_checkin(&conn, &checkin.id).unwrap();
        removed.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(removed, expected);
        assert!(get_attributions_for_checkin(&conn, &checkin.id).unwrap().is_empty());
    }

    #[test]
    fn live_aggregate_skips_null_overall() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let product = make_product(&conn, "Alpha");
        let c1 = make_checkin(&conn, patient.id, date("2025-03-01 09:00:00"), 50.0);
        let c2 = make_checkin(&conn, patient.id, date("2025-03-02 09:00:00"), 50.0);
        let c3 = make_checkin(&conn, patient.id, date("2025-03-03 09:00:00"), 50.0);
        make_attribution(&conn, c1.id, product.id, -4.0);
        make_attribution(&conn, c2.id, product.id, 10.0);
        insert_attribution(&conn, &make_attribution_template(c3.id, product.id)).unwrap();

        let live = compute_live_aggregate(&conn, &product.id).unwrap();
        assert_eq!(live.count, 2);
        assert_eq!(live.avg, Some(3.0));
        assert_eq!(live.min, Some(-4.0));
        assert_eq!(live.max, Some(10.0));
        assert_eq!(overall_pct_values_for_product(&conn, &product.id).unwrap().len(), 2);
        assert_eq!(sum_patient_product_pct(&conn, &patient.id, &product.id).unwrap(), 6.0);
    }

    #[test]
    fn upsert_replaces_aggregate() {
        let conn = open_memory_database().unwrap();
        let product = make_product(&conn, "Alpha");
        let mut score = ProductAggregateScore::empty(product.id, now());
        upsert_aggregate(&conn, &score).unwrap();

        score.total_votes = 3;
        score.avg_qol = Some(2.0);
        score.min_qol = Some(1.0);
        score.max_qol = Some(3.0);
        upsert_aggregate(&conn, &score).unwrap();

        let stored = get_aggregate(&conn, &product.id).unwrap().unwrap();
        assert!(stored.same_stats(&score));
        assert_eq!(get_all_aggregates(&conn).unwrap().len(), 1);
    }

    #[test]
    fn consistency_flags_drift_and_missing_rows() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn);
        let drifted = make_product(&conn, "Alpha");
        let missing = make_product(&conn, "Beta");
        let checkin = make_checkin(&conn, patient.id, now(), 50.0);
        make_attribution(&conn, checkin.id, drifted.id, 5.0);
        make_attribution(&conn, checkin.id, missing.id, 5.0);
        upsert_aggregate(&conn, &ProductAggregateScore::empty(drifted.id, now())).unwrap();

        let report = check_aggregate_consistency(&conn).unwrap();
        assert!(report.drift_detected);
        assert_eq!(report.aggregates_checked, 1);
        let categories: Vec<&str> = report.issues.iter().map(|i| i.category.as_str()).collect();
        assert!(categories.contains(&"aggregate_drift"));
        assert!(categories.contains(&"missing_aggregate"));
        assert_eq!(products_missing_aggregate(&conn).unwrap(), vec![missing.id]);
    }

    #[test]
    fn ranking_orders_by_average_then_votes() {
        let conn = open_memory_database().unwrap();
        let a = make_product(&conn, "Alpha");
        let b = make_product(&conn, "Beta");
        let c = make_product(&conn, "Gamma");
        let score = |id: Uuid, votes: i64, avg: Option<f64>| ProductAggregateScore {
            product_id: id,
            total_votes: votes,
            avg_qol: avg,
            min_qol: avg,
            max_qol: avg,
            updated_at: now(),
        };
        upsert_aggregate(&conn, &score(a.id, 1, Some(4.0))).unwrap();
        upsert_aggregate(&conn, &score(b.id, 3, Some(4.0))).unwrap();
        upsert_aggregate(&conn, &score(c.id, 0, None)).unwrap();

        let ranked = top_ranked_products(&conn, 10).unwrap();
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }
}
