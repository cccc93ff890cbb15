//! Product endpoints: registration, cached aggregate, live stats, ranking.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_id, AppContext};
use crate::checkins;
use crate::models::{Product, ProductAggregateScore, QolStats, RankedProduct};

const DEFAULT_TOP_LIMIT: u32 = 10;

#[derive(Deserialize)]
pub struct RegisterProductRequest {
    pub name: String,
}

/// `POST /api/products`
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = ctx
        .run(move |conn, _| Ok(checkins::register_product(conn, &req.name)?))
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products/:id/aggregate`
pub async fn aggregate(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ProductAggregateScore>, ApiError> {
    let product_id = parse_id(&id, "product")?;
    let score = ctx
        .run(move |conn, _| Ok(checkins::get_product_aggregate(conn, &product_id)?))
        .await?;
    Ok(Json(score))
}

/// `GET /api/products/:id/stats`
pub async fn stats(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<QolStats>, ApiError> {
    let product_id = parse_id(&id, "product")?;
    let stats = ctx
        .run(move |conn, _| Ok(checkins::product_qol_stats(conn, &product_id)?))
        .await?;
    Ok(Json(stats))
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<u32>,
}

/// `GET /api/products/top?limit=N`
pub async fn top(
    State(ctx): State<AppContext>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<RankedProduct>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be at least 1".into()));
    }
    let ranked = ctx
        .run(move |conn, _| Ok(checkins::top_products(conn, limit)?))
        .await?;
    Ok(Json(ranked))
}
