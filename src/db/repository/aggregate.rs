use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{ProductAggregateScore, RankedProduct};

/// Raw aggregate functions over a product's live attribution set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveAggregate {
    pub count: i64,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// COUNT/AVG/MIN/MAX of `overall_pct` for one product, skipping NULLs.
pub fn compute_live_aggregate(conn: &Connection, product_id: &Uuid) -> Result<LiveAggregate, DatabaseError> {
    let aggregate = conn.query_row(
        "SELECT COUNT(overall_pct), AVG(overall_pct), MIN(overall_pct), MAX(overall_pct)
         FROM wellness_attributions
         WHERE product_id = ?1 AND overall_pct IS NOT NULL",
        params![product_id.to_string()],
        |row| {
            Ok(LiveAggregate {
                count: row.get(0)?,
                avg: row.get(1)?,
                min: row.get(2)?,
                max: row.get(3)?,
            })
        },
    )?;
    Ok(aggregate)
}

/// Insert or replace the single cached aggregate row for a product.
pub fn upsert_aggregate(conn: &Connection, score: &ProductAggregateScore) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO product_aggregate_scores
         (product_id, total_votes, avg_qol, min_qol, max_qol, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(product_id) DO UPDATE SET
           total_votes = excluded.total_votes,
           avg_qol = excluded.avg_qol,
           min_qol = excluded.min_qol,
           max_qol = excluded.max_qol,
           updated_at = excluded.updated_at",
        params![
            score.product_id.to_string(),
            score.total_votes,
            score.avg_qol,
            score.min_qol,
            score.max_qol,
            format_datetime(&score.updated_at),
        ],
    )?;
    Ok(())
}

type AggregateRow = (String, i64, Option<f64>, Option<f64>, Option<f64>, String);

fn aggregate_from_row(row: AggregateRow) -> Result<ProductAggregateScore, DatabaseError> {
    let (product_id, total_votes, avg_qol, min_qol, max_qol, updated_at) = row;
    Ok(ProductAggregateScore {
        product_id: parse_uuid(&product_id)?,
        total_votes,
        avg_qol,
        min_qol,
        max_qol,
        updated_at: parse_datetime(&updated_at)?,
    })
}

pub fn get_aggregate(conn: &Connection, product_id: &Uuid) -> Result<Option<ProductAggregateScore>, DatabaseError> {
    conn.query_row(
        "SELECT product_id, total_votes, avg_qol, min_qol, max_qol, updated_at
         FROM product_aggregate_scores WHERE product_id = ?1",
        params![product_id.to_string()],
        |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        },
    )
    .optional()?
    .map(aggregate_from_row)
    .transpose()
}

pub fn get_all_aggregates(conn: &Connection) -> Result<Vec<ProductAggregateScore>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT product_id, total_votes, avg_qol, min_qol, max_qol, updated_at
         FROM product_aggregate_scores ORDER BY product_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    })?;

    let mut aggregates = Vec::new();
    for row in rows {
        aggregates.push(aggregate_from_row(row?)?);
    }
    Ok(aggregates)
}

/// Products with attributions but no cached aggregate row.
pub fn products_missing_aggregate(conn: &Connection) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT wa.product_id FROM wellness_attributions wa
         WHERE NOT EXISTS (
           SELECT 1 FROM product_aggregate_scores pas WHERE pas.product_id = wa.product_id
         )
         ORDER BY wa.product_id",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut ids = Vec::new();
    for row in rows {
        ids.push(parse_uuid(&row?)?);
    }
    Ok(ids)
}

/// Products ranked by cached average QoL contribution, best first.
pub fn top_ranked_products(conn: &Connection, limit: u32) -> Result<Vec<RankedProduct>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, pas.total_votes, pas.avg_qol
         FROM product_aggregate_scores pas
         JOIN products p ON p.id = pas.product_id
         WHERE pas.total_votes > 0 AND pas.avg_qol IS NOT NULL
         ORDER BY pas.avg_qol DESC, pas.total_votes DESC, p.name ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, f64>(3)?,
        ))
    })?;

    let mut ranked = Vec::new();
    for row in rows {
        let (id, name, total_votes, avg_qol) = row?;
        ranked.push(RankedProduct {
            product_id: parse_uuid(&id)?,
            name,
            total_votes,
            avg_qol,
        });
    }
    Ok(ranked)
}
